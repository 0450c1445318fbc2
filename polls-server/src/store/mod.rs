//! Storage abstraction
//!
//! Services talk to a `Store`, never to sqlx directly. Two implementations:
//! - [`crate::db::PgStore`]: PostgreSQL via sqlx (production)
//! - [`MemoryStore`]: in-process maps (tests, `serve --ephemeral`)
//!
//! Both enforce the same uniqueness rules and report violations as
//! [`StoreError::Conflict`], so callers never inspect driver errors.

pub mod memory;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::{Page, PageRequest};

pub use memory::MemoryStore;

pub type UserId = i64;
pub type PollId = i64;
pub type ChoiceId = i64;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Account record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Account to insert
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Choice record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: ChoiceId,
    pub poll_id: PollId,
    pub text: String,
}

/// Poll record with its choices in creation order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Poll {
    pub id: PollId,
    pub question: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub choices: Vec<Choice>,
}

impl Poll {
    /// A poll is closed from its expiration instant onwards.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn has_choice(&self, choice_id: ChoiceId) -> bool {
        self.choices.iter().any(|c| c.id == choice_id)
    }
}

/// Poll to insert, choices in display order
#[derive(Debug, Clone)]
pub struct NewPoll {
    pub question: String,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub choices: Vec<String>,
}

/// Aggregated votes for one choice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceVoteCount {
    pub choice_id: ChoiceId,
    pub count: i64,
}

/// The choice a user picked in a poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub poll_id: PollId,
    pub choice_id: ChoiceId,
}

/// Unique constraints the store enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    Username,
    Email,
    /// One vote per (poll, user)
    Vote,
}

impl fmt::Display for UniqueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueKey::Username => f.write_str("username"),
            UniqueKey::Email => f.write_str("email"),
            UniqueKey::Vote => f.write_str("vote (poll, user)"),
        }
    }
}

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("duplicate {0}")]
    Conflict(UniqueKey),

    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Persistence operations needed by the services.
///
/// Every `*_in` method takes the full id set of a page and answers with one
/// round trip, so assembling a page never costs a query per row.
#[async_trait]
pub trait Store: Send + Sync {
    // Users

    /// Insert an account. Duplicate username or email yields `Conflict`.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Look up by username first, then email.
    async fn find_user_by_login(&self, username_or_email: &str)
        -> Result<Option<User>, StoreError>;

    /// Batched creator lookup; missing ids are simply absent from the result.
    async fn find_users_in(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError>;

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError>;

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError>;

    // Polls

    /// Insert a poll and its choices atomically.
    async fn create_poll(&self, poll: NewPoll) -> Result<Poll, StoreError>;

    async fn find_poll(&self, id: PollId) -> Result<Option<Poll>, StoreError>;

    /// All polls, newest first.
    async fn list_polls(&self, page: PageRequest) -> Result<Page<Poll>, StoreError>;

    /// Polls created by `user_id`, newest first.
    async fn list_polls_created_by(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Poll>, StoreError>;

    /// Polls `user_id` has voted on, newest poll first.
    async fn list_polls_voted_by(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Poll>, StoreError>;

    async fn count_polls_created_by(&self, user_id: UserId) -> Result<i64, StoreError>;

    // Votes

    /// Insert a vote. A second vote for the same (poll, user) yields
    /// `Conflict(UniqueKey::Vote)`.
    async fn insert_vote(
        &self,
        poll_id: PollId,
        choice_id: ChoiceId,
        user_id: UserId,
    ) -> Result<(), StoreError>;

    /// Vote counts grouped by choice over every poll in `poll_ids`. Choices
    /// with no votes are absent.
    async fn count_votes_in(&self, poll_ids: &[PollId]) -> Result<Vec<ChoiceVoteCount>, StoreError>;

    /// The choices `user_id` picked among `poll_ids`.
    async fn find_selections_in(
        &self,
        user_id: UserId,
        poll_ids: &[PollId],
    ) -> Result<Vec<Selection>, StoreError>;

    async fn count_votes_by(&self, user_id: UserId) -> Result<i64, StoreError>;
}
