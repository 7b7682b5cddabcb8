//! Shared configuration and state for the account flows.

use crate::api::mailer::Mailer;
use std::sync::Arc;

const DEFAULT_RESET_TTL_HOURS: i64 = 24;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    frontend_base_url: String,
    reset_ttl_hours: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(frontend_base_url: String) -> Self {
        Self {
            frontend_base_url,
            reset_ttl_hours: DEFAULT_RESET_TTL_HOURS,
        }
    }

    #[must_use]
    pub fn with_reset_ttl_hours(mut self, hours: i64) -> Self {
        self.reset_ttl_hours = hours.max(1);
        self
    }

    #[must_use]
    pub fn frontend_base_url(&self) -> &str {
        &self.frontend_base_url
    }

    #[must_use]
    pub fn reset_ttl_hours(&self) -> i64 {
        self.reset_ttl_hours
    }
}

pub struct AuthState {
    config: AuthConfig,
    mailer: Arc<dyn Mailer>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self { config, mailer }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::AuthConfig;

    #[test]
    fn config_defaults_to_24_hour_ttl() {
        let config = AuthConfig::new("https://konto.dev".to_string());
        assert_eq!(config.frontend_base_url(), "https://konto.dev");
        assert_eq!(config.reset_ttl_hours(), 24);
    }

    #[test]
    fn config_ttl_override_clamps_to_one_hour() {
        let config = AuthConfig::new("https://konto.dev".to_string()).with_reset_ttl_hours(48);
        assert_eq!(config.reset_ttl_hours(), 48);

        let config = AuthConfig::new("https://konto.dev".to_string()).with_reset_ttl_hours(0);
        assert_eq!(config.reset_ttl_hours(), 1);
    }
}
