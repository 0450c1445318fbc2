//! Database layer - connection pool, migrations and repositories
//!
//! # Design Principles
//!
//! - Connection pool with explicit limits
//! - Page assembly uses batched `ANY($1)` lookups - no N+1 queries
//! - Rely on DB constraints, handle conflicts - no check-then-insert
//! - Transactions for multi-step operations

pub mod pool;
pub mod migrations;
pub mod repos;

pub use pool::{create_pool, create_pool_with_options};
pub use repos::{PollRepo, UserRepo, VoteRepo};

use async_trait::async_trait;
use sqlx::PgPool;

use crate::models::{Page, PageRequest};
use crate::store::{
    ChoiceId, ChoiceVoteCount, NewPoll, NewUser, Poll, PollId, Selection, Store, StoreError, User,
    UserId,
};

/// [`Store`] backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        UserRepo::new(&self.pool).create(&user).await
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        UserRepo::new(&self.pool).get(id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        UserRepo::new(&self.pool).get_by_username(username).await
    }

    async fn find_user_by_login(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, StoreError> {
        UserRepo::new(&self.pool).get_by_login(username_or_email).await
    }

    async fn find_users_in(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        UserRepo::new(&self.pool).list_in(ids).await
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        UserRepo::new(&self.pool).username_exists(username).await
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        UserRepo::new(&self.pool).email_exists(email).await
    }

    async fn create_poll(&self, poll: NewPoll) -> Result<Poll, StoreError> {
        PollRepo::new(&self.pool).create(&poll).await
    }

    async fn find_poll(&self, id: PollId) -> Result<Option<Poll>, StoreError> {
        PollRepo::new(&self.pool).get(id).await
    }

    async fn list_polls(&self, page: PageRequest) -> Result<Page<Poll>, StoreError> {
        PollRepo::new(&self.pool).list(page).await
    }

    async fn list_polls_created_by(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Poll>, StoreError> {
        PollRepo::new(&self.pool).list_created_by(user_id, page).await
    }

    async fn list_polls_voted_by(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Poll>, StoreError> {
        PollRepo::new(&self.pool).list_voted_by(user_id, page).await
    }

    async fn count_polls_created_by(&self, user_id: UserId) -> Result<i64, StoreError> {
        PollRepo::new(&self.pool).count_created_by(user_id).await
    }

    async fn insert_vote(
        &self,
        poll_id: PollId,
        choice_id: ChoiceId,
        user_id: UserId,
    ) -> Result<(), StoreError> {
        VoteRepo::new(&self.pool).insert(poll_id, choice_id, user_id).await
    }

    async fn count_votes_in(&self, poll_ids: &[PollId]) -> Result<Vec<ChoiceVoteCount>, StoreError> {
        VoteRepo::new(&self.pool).count_in(poll_ids).await
    }

    async fn find_selections_in(
        &self,
        user_id: UserId,
        poll_ids: &[PollId],
    ) -> Result<Vec<Selection>, StoreError> {
        VoteRepo::new(&self.pool).selections_in(user_id, poll_ids).await
    }

    async fn count_votes_by(&self, user_id: UserId) -> Result<i64, StoreError> {
        VoteRepo::new(&self.pool).count_by(user_id).await
    }
}
