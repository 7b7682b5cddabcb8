use crate::cli::actions::Action;
use anyhow::{Context, Result};

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one::<String>("dsn")
            .cloned()
            .context("missing required argument: --dsn")?,
        frontend_base_url: matches
            .get_one::<String>("frontend-base-url")
            .cloned()
            .context("missing required argument: --frontend-base-url")?,
        reset_ttl_hours: matches
            .get_one::<i64>("reset-ttl-hours")
            .copied()
            .unwrap_or(24),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn server_action_from_matches() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "konto",
            "--dsn",
            "postgres://user@localhost:5432/konto",
            "--frontend-base-url",
            "https://accounts.example",
            "--reset-ttl-hours",
            "12",
        ]);

        let Action::Server {
            port,
            dsn,
            frontend_base_url,
            reset_ttl_hours,
        } = handler(&matches)?;

        assert_eq!(port, 8080);
        assert_eq!(dsn, "postgres://user@localhost:5432/konto");
        assert_eq!(frontend_base_url, "https://accounts.example");
        assert_eq!(reset_ttl_hours, 12);
        Ok(())
    }
}
