use crate::api;
use crate::api::handlers::auth::AuthConfig;
use crate::cli::actions::Action;
use anyhow::Result;
use url::Url;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            frontend_base_url,
            reset_ttl_hours,
        } => {
            // Fail early on an unparseable DSN instead of at pool setup
            let dsn = Url::parse(&dsn)?;

            let auth_config =
                AuthConfig::new(frontend_base_url).with_reset_ttl_hours(reset_ttl_hours);

            api::new(port, dsn.to_string(), auth_config).await?;
        }
    }

    Ok(())
}
