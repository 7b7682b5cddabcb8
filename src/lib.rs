//! # Konto (Account Security & Token Workflows)
//!
//! `konto` owns the account lifecycle for a community site: registration with
//! email activation, login checks, password changes, and forgot/reset-password
//! backed by an append-only ledger of single-use reset requests.
//!
//! ## Tokens
//!
//! Activation and reset tokens are *derived*, not stored: each is a SHA-256
//! digest over a server-held, per-entity secret (the user's salt, or the reset
//! record's id) concatenated with the email. Possession of a link proves the
//! server minted it; nothing token-shaped ever lands in the database.
//!
//! ## Account state
//!
//! `activated`, `blocked`, and `verified` are independent booleans. Activation
//! is one-way and guarded by a compare-and-set update so concurrent replays of
//! a correct link stay idempotent. The admin toggles are involutions: applying
//! one twice restores the original state.
//!
//! ## Reset ledger
//!
//! Reset requests are append-only; only the most recent record per email is
//! actionable, records are single-use, and they expire logically 24 hours
//! after creation. Expiry is checked at read time; nothing sweeps the table.

pub mod api;
pub mod cli;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
