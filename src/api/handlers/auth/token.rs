//! Token and password-hash derivation.
//!
//! Tokens are derived, never stored: each is a hash over a server-held,
//! per-entity secret concatenated with the email. Both derivers are pure and
//! reproducible across calls; unguessability rests entirely on the secret
//! staying server-side.

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use url::form_urlencoded;
use uuid::Uuid;

/// Token proving possession of an activation link for an account.
#[must_use]
pub(super) fn derive_activation_token(salt: &str, email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(email.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Token proving possession of a reset link for one ledger record.
#[must_use]
pub(super) fn derive_reset_token(record_id: &Uuid, email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record_id.to_string().as_bytes());
    hasher.update(email.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Stable one-way hash of (salt, password). The same pair always produces the
/// same hash, so authentication is a recompute-and-compare.
#[must_use]
pub(super) fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Per-user salt, minted once at registration. Never rotated afterwards:
/// activation tokens are derived from it and must survive password changes.
pub(super) fn generate_salt() -> Result<String> {
    let mut bytes = [0u8; 16];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate salt")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Build the frontend activation link included in outbound mail.
pub(super) fn build_activation_url(frontend_base_url: &str, email: &str, token: &str) -> String {
    build_link(frontend_base_url, "activate", email, token)
}

/// Build the frontend reset link included in outbound mail.
pub(super) fn build_reset_url(frontend_base_url: &str, email: &str, token: &str) -> String {
    build_link(frontend_base_url, "reset-password", email, token)
}

fn build_link(frontend_base_url: &str, page: &str, email: &str, token: &str) -> String {
    let base = frontend_base_url.trim_end_matches('/');
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("email", email)
        .append_pair("token", token)
        .finish();
    format!("{base}/{page}?{query}")
}
