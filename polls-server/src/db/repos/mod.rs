//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Batched `= ANY($1)` lookups for page assembly (no N+1)
//! - Rely on unique constraints, translate conflicts (no check-then-insert)
//! - Transactions for multi-row inserts

pub mod users;
pub mod polls;
pub mod votes;

pub use users::UserRepo;
pub use polls::PollRepo;
pub use votes::VoteRepo;

use super::migrations::{USERS_EMAIL_KEY, USERS_USERNAME_KEY, VOTES_POLL_USER_KEY};
use crate::store::{StoreError, UniqueKey};

/// Translate a unique violation on a known constraint into a typed conflict.
/// Anything else passes through as a plain database error.
pub(crate) fn translate_conflict(err: sqlx::Error) -> StoreError {
    let key = err
        .as_database_error()
        .filter(|db| db.is_unique_violation())
        .and_then(|db| match db.constraint() {
            Some(USERS_USERNAME_KEY) => Some(UniqueKey::Username),
            Some(USERS_EMAIL_KEY) => Some(UniqueKey::Email),
            Some(VOTES_POLL_USER_KEY) => Some(UniqueKey::Vote),
            _ => None,
        });

    match key {
        Some(key) => StoreError::Conflict(key),
        None => StoreError::Sqlx(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_database_errors_pass_through() {
        let err = translate_conflict(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Sqlx(sqlx::Error::RowNotFound)));
    }
}
