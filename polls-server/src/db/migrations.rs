//! Schema migrations
//!
//! Idempotent `CREATE ... IF NOT EXISTS` statements, run at startup and by
//! `polls migrate`. Constraint names matter: the repos map unique violations
//! back to [`UniqueKey`](crate::store::UniqueKey) by name.

use sqlx::PgPool;

pub const USERS_USERNAME_KEY: &str = "users_username_key";
pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const VOTES_POLL_USER_KEY: &str = "votes_poll_id_user_id_key";

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        username TEXT NOT NULL,
        email TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'user',
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT users_username_key UNIQUE (username),
        CONSTRAINT users_email_key UNIQUE (email)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS polls (
        id BIGSERIAL PRIMARY KEY,
        question TEXT NOT NULL,
        created_by BIGINT NOT NULL REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        expires_at TIMESTAMPTZ NOT NULL,
        CONSTRAINT polls_expiry_after_creation CHECK (expires_at > created_at)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS polls_created_at_idx
        ON polls (created_at DESC, id DESC)
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS polls_created_by_idx ON polls (created_by)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS choices (
        id BIGSERIAL PRIMARY KEY,
        poll_id BIGINT NOT NULL REFERENCES polls(id) ON DELETE CASCADE,
        text TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS choices_poll_id_idx ON choices (poll_id)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS votes (
        id BIGSERIAL PRIMARY KEY,
        poll_id BIGINT NOT NULL REFERENCES polls(id) ON DELETE CASCADE,
        choice_id BIGINT NOT NULL REFERENCES choices(id) ON DELETE CASCADE,
        user_id BIGINT NOT NULL REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT votes_poll_id_user_id_key UNIQUE (poll_id, user_id)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS votes_user_id_idx ON votes (user_id)
    "#,
];

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    let mut tx = pool.begin().await?;
    for statement in STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    tracing::info!(statements = STATEMENTS.len(), "Migrations complete");
    Ok(())
}
