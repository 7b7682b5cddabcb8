//! Outbound notification gateway.
//!
//! The account flows persist their entities first and only then hand a fully
//! built message to a `Mailer`. Delivery failure is surfaced to the caller as
//! a transport error but never rolls back what was already written: "record
//! created, mail not sent" is a valid terminal state, recoverable through the
//! resend-activation endpoint or a fresh forgot-password request.
//!
//! The default sender for local dev is `LogMailer`, which logs the link and
//! returns `Ok(())`. Real transports (SMTP, API) implement the same trait.

use anyhow::Result;
use tracing::info;

#[derive(Clone, Debug)]
pub struct ActivationMail {
    pub email: String,
    pub activate_url: String,
}

#[derive(Clone, Debug)]
pub struct ResetPassMail {
    pub email: String,
    pub reset_url: String,
}

/// Mail delivery abstraction consumed by the account flows.
pub trait Mailer: Send + Sync {
    /// Deliver an activation link or return an error to the triggering caller.
    fn send_activation_mail(&self, mail: &ActivationMail) -> Result<()>;

    /// Deliver a password-reset link or return an error to the triggering caller.
    fn send_reset_pass_mail(&self, mail: &ResetPassMail) -> Result<()>;
}

/// Local dev mailer that logs the payload instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send_activation_mail(&self, mail: &ActivationMail) -> Result<()> {
        info!(
            to_email = %mail.email,
            activate_url = %mail.activate_url,
            "activation mail send stub"
        );
        Ok(())
    }

    fn send_reset_pass_mail(&self, mail: &ResetPassMail) -> Result<()> {
        info!(
            to_email = %mail.email,
            reset_url = %mail.reset_url,
            "reset mail send stub"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ActivationMail, LogMailer, Mailer, ResetPassMail};

    #[test]
    fn log_mailer_accepts_activation_mail() {
        let mail = ActivationMail {
            email: "alice@example.com".to_string(),
            activate_url: "https://konto.dev/activate?token=t".to_string(),
        };
        assert!(LogMailer.send_activation_mail(&mail).is_ok());
    }

    #[test]
    fn log_mailer_accepts_reset_mail() {
        let mail = ResetPassMail {
            email: "alice@example.com".to_string(),
            reset_url: "https://konto.dev/reset-password?token=t".to_string(),
        };
        assert!(LogMailer.send_reset_pass_mail(&mail).is_ok());
    }
}
