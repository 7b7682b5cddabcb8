//! Database helpers for accounts and the password-reset ledger.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

const CREATED_AT_UTC: &str =
    r#"to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"')"#;

/// Outcome when attempting to create a new account.
#[derive(Debug)]
pub(super) enum RegisterOutcome {
    Created(Uuid),
    Conflict,
}

/// Outcome of the combined consume-record-and-set-password update.
#[derive(Debug)]
pub(super) enum ResetPasswordOutcome {
    Applied,
    AlreadyUsed,
    UserMissing,
}

#[derive(Clone, Debug)]
pub(super) struct UserRecord {
    pub(super) id: Uuid,
    pub(super) email: String,
    pub(super) password_hash: String,
    pub(super) salt: String,
    pub(super) activated: bool,
    pub(super) blocked: bool,
    pub(super) verified: bool,
    pub(super) created_at: String,
}

/// One row of the reset ledger. `expired` is computed at read time against
/// the configured TTL; the row itself is never deleted.
#[derive(Clone, Debug)]
pub(super) struct ResetRecord {
    pub(super) id: Uuid,
    pub(super) email: String,
    pub(super) available: bool,
    pub(super) expired: bool,
    pub(super) created_at: String,
}

fn user_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        salt: row.get("salt"),
        activated: row.get("activated"),
        blocked: row.get("blocked"),
        verified: row.get("verified"),
        created_at: row.get("created_at"),
    }
}

pub(super) async fn lookup_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRecord>> {
    let query = format!(
        "SELECT id, email, password_hash, salt, activated, blocked, verified, \
         {CREATED_AT_UTC} AS created_at FROM users WHERE email = $1"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by email")?;

    Ok(row.as_ref().map(user_from_row))
}

pub(super) async fn lookup_user_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRecord>> {
    let query = format!(
        "SELECT id, email, password_hash, salt, activated, blocked, verified, \
         {CREATED_AT_UTC} AS created_at FROM users WHERE id = $1"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup user by id")?;

    Ok(row.as_ref().map(user_from_row))
}

pub(super) async fn insert_user(
    pool: &PgPool,
    email: &str,
    password_hash: &str,
    salt: &str,
) -> Result<RegisterOutcome> {
    let query = r"
        INSERT INTO users (email, password_hash, salt)
        VALUES ($1, $2, $3)
        RETURNING id
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(email)
        .bind(password_hash)
        .bind(salt)
        .fetch_one(pool)
        .instrument(span)
        .await;

    match row {
        Ok(row) => Ok(RegisterOutcome::Created(row.get("id"))),
        Err(err) if is_unique_violation(&err) => Ok(RegisterOutcome::Conflict),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

/// Compare-and-set activation: flips the flag only if it is still unset, so
/// concurrent replays of a correct link resolve to exactly one success.
pub(super) async fn mark_activated(pool: &PgPool, user_id: Uuid) -> Result<bool> {
    let query = r"
        UPDATE users
        SET activated = TRUE,
            updated_at = NOW()
        WHERE id = $1
          AND NOT activated
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to mark user activated")?;

    Ok(result.rows_affected() > 0)
}

/// Unconditional flip; applying twice restores the original value.
pub(super) async fn toggle_blocked(pool: &PgPool, user_id: Uuid) -> Result<Option<bool>> {
    let query = r"
        UPDATE users
        SET blocked = NOT blocked,
            updated_at = NOW()
        WHERE id = $1
        RETURNING blocked
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to toggle blocked flag")?;

    Ok(row.map(|row| row.get("blocked")))
}

pub(super) async fn toggle_verified(pool: &PgPool, user_id: Uuid) -> Result<Option<bool>> {
    let query = r"
        UPDATE users
        SET verified = NOT verified,
            updated_at = NOW()
        WHERE id = $1
        RETURNING verified
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let row = sqlx::query(query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to toggle verified flag")?;

    Ok(row.map(|row| row.get("verified")))
}

pub(super) async fn update_password(
    pool: &PgPool,
    user_id: Uuid,
    password_hash: &str,
) -> Result<bool> {
    let query = r"
        UPDATE users
        SET password_hash = $2,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let result = sqlx::query(query)
        .bind(user_id)
        .bind(password_hash)
        .execute(pool)
        .instrument(span)
        .await
        .context("failed to update password")?;

    Ok(result.rows_affected() > 0)
}

/// Append a reset request to the ledger. No user-existence check here: the
/// ledger accepts requests for any address.
pub(super) async fn insert_reset_request(pool: &PgPool, email: &str) -> Result<ResetRecord> {
    let query = format!(
        "INSERT INTO password_resets (email) VALUES ($1) \
         RETURNING id, email, available, {CREATED_AT_UTC} AS created_at"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "INSERT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(email)
        .fetch_one(pool)
        .instrument(span)
        .await
        .context("failed to insert reset request")?;

    // A freshly created record cannot be expired yet.
    Ok(ResetRecord {
        id: row.get("id"),
        email: row.get("email"),
        available: row.get("available"),
        expired: false,
        created_at: row.get("created_at"),
    })
}

/// Fetch the only actionable record for an email: the most recent one.
/// Older records stay stored but are never consulted.
pub(super) async fn latest_reset_by_email(
    pool: &PgPool,
    email: &str,
    ttl_hours: i64,
) -> Result<Option<ResetRecord>> {
    let query = format!(
        "SELECT id, email, available, \
         created_at <= NOW() - ($2 * INTERVAL '1 hour') AS expired, \
         {CREATED_AT_UTC} AS created_at \
         FROM password_resets \
         WHERE email = $1 \
         ORDER BY created_at DESC \
         LIMIT 1"
    );
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "SELECT",
        db.statement = query.as_str()
    );
    let row = sqlx::query(&query)
        .bind(email)
        .bind(ttl_hours)
        .fetch_optional(pool)
        .instrument(span)
        .await
        .context("failed to lookup latest reset request")?;

    Ok(row.map(|row| ResetRecord {
        id: row.get("id"),
        email: row.get("email"),
        available: row.get("available"),
        expired: row.get("expired"),
        created_at: row.get("created_at"),
    }))
}

/// Consume the reset record and overwrite the password in one transaction.
/// The availability flip is a compare-and-set: a record that lost the race
/// reports `AlreadyUsed` and the password write never happens.
pub(super) async fn consume_reset_and_update_password(
    pool: &PgPool,
    reset_id: Uuid,
    user_id: Uuid,
    password_hash: &str,
) -> Result<ResetPasswordOutcome> {
    let mut tx = pool.begin().await.context("begin reset transaction")?;

    let query = r"
        UPDATE password_resets
        SET available = FALSE
        WHERE id = $1
          AND available
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let consumed = sqlx::query(query)
        .bind(reset_id)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to consume reset request")?;

    if consumed.rows_affected() == 0 {
        let _ = tx.rollback().await;
        return Ok(ResetPasswordOutcome::AlreadyUsed);
    }

    let query = r"
        UPDATE users
        SET password_hash = $2,
            updated_at = NOW()
        WHERE id = $1
    ";
    let span = tracing::info_span!(
        "db.query",
        db.system = "postgresql",
        db.operation = "UPDATE",
        db.statement = query
    );
    let updated = sqlx::query(query)
        .bind(user_id)
        .bind(password_hash)
        .execute(&mut *tx)
        .instrument(span)
        .await
        .context("failed to overwrite password")?;

    if updated.rows_affected() == 0 {
        let _ = tx.rollback().await;
        return Ok(ResetPasswordOutcome::UserMissing);
    }

    tx.commit().await.context("commit reset transaction")?;

    Ok(ResetPasswordOutcome::Applied)
}
