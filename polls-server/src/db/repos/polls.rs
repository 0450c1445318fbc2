//! Poll repository
//!
//! Handles poll CRUD with:
//! - Atomic creation with choices (transaction)
//! - Paginated listing, choices attached with one extra query per page

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::models::{Page, PageRequest};
use crate::store::{Choice, NewPoll, Poll, PollId, StoreError, UserId};

/// Poll row without its choices
#[derive(Debug, Clone, FromRow)]
struct PollRow {
    id: i64,
    question: String,
    created_by: i64,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
struct ChoiceRow {
    id: i64,
    poll_id: i64,
    text: String,
}

impl From<ChoiceRow> for Choice {
    fn from(row: ChoiceRow) -> Self {
        Self {
            id: row.id,
            poll_id: row.poll_id,
            text: row.text,
        }
    }
}

/// Poll repository
pub struct PollRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> PollRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create poll with its choices (atomic).
    ///
    /// Uses a transaction so the poll and every choice are created together
    /// or not at all.
    pub async fn create(&self, poll: &NewPoll) -> Result<Poll, StoreError> {
        let mut tx = self.pool.begin().await?;

        let row: PollRow = sqlx::query_as(
            r#"
            INSERT INTO polls (question, created_by, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, question, created_by, created_at, expires_at
            "#,
        )
        .bind(&poll.question)
        .bind(poll.created_by)
        .bind(poll.created_at)
        .bind(poll.expires_at)
        .fetch_one(&mut *tx)
        .await?;

        let mut choices = Vec::with_capacity(poll.choices.len());
        for text in &poll.choices {
            let choice: ChoiceRow = sqlx::query_as(
                r#"
                INSERT INTO choices (poll_id, text)
                VALUES ($1, $2)
                RETURNING id, poll_id, text
                "#,
            )
            .bind(row.id)
            .bind(text)
            .fetch_one(&mut *tx)
            .await?;
            choices.push(Choice::from(choice));
        }

        tx.commit().await?;

        Ok(Poll {
            id: row.id,
            question: row.question,
            created_by: row.created_by,
            created_at: row.created_at,
            expires_at: row.expires_at,
            choices,
        })
    }

    /// Get a single poll by ID with its choices.
    pub async fn get(&self, id: PollId) -> Result<Option<Poll>, StoreError> {
        let row: Option<PollRow> = sqlx::query_as(
            r#"
            SELECT id, question, created_by, created_at, expires_at
            FROM polls
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_choices(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// List all polls, newest first.
    pub async fn list(&self, page: PageRequest) -> Result<Page<Poll>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM polls")
            .fetch_one(self.pool)
            .await?;

        let rows: Vec<PollRow> = sqlx::query_as(
            r#"
            SELECT id, question, created_by, created_at, expires_at
            FROM polls
            ORDER BY created_at DESC, id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        Ok(Page {
            items: self.attach_choices(rows).await?,
            total,
        })
    }

    /// List polls created by one user, newest first.
    pub async fn list_created_by(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Poll>, StoreError> {
        let total = self.count_created_by(user_id).await?;

        let rows: Vec<PollRow> = sqlx::query_as(
            r#"
            SELECT id, question, created_by, created_at, expires_at
            FROM polls
            WHERE created_by = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        Ok(Page {
            items: self.attach_choices(rows).await?,
            total,
        })
    }

    /// List polls one user has voted on, newest poll first.
    pub async fn list_voted_by(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Poll>, StoreError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;

        let rows: Vec<PollRow> = sqlx::query_as(
            r#"
            SELECT p.id, p.question, p.created_by, p.created_at, p.expires_at
            FROM polls p
            JOIN votes v ON v.poll_id = p.id
            WHERE v.user_id = $1
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(i64::from(page.limit()))
        .bind(page.offset() as i64)
        .fetch_all(self.pool)
        .await?;

        Ok(Page {
            items: self.attach_choices(rows).await?,
            total,
        })
    }

    pub async fn count_created_by(&self, user_id: UserId) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM polls WHERE created_by = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Load choices for every row with a single query, preserving row order.
    async fn attach_choices(&self, rows: Vec<PollRow>) -> Result<Vec<Poll>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let choice_rows: Vec<ChoiceRow> = sqlx::query_as(
            r#"
            SELECT id, poll_id, text
            FROM choices
            WHERE poll_id = ANY($1)
            ORDER BY poll_id, id
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_poll: HashMap<PollId, Vec<Choice>> = HashMap::new();
        for choice in choice_rows {
            by_poll
                .entry(choice.poll_id)
                .or_default()
                .push(Choice::from(choice));
        }

        Ok(rows
            .into_iter()
            .map(|row| Poll {
                choices: by_poll.remove(&row.id).unwrap_or_default(),
                id: row.id,
                question: row.question,
                created_by: row.created_by,
                created_at: row.created_at,
                expires_at: row.expires_at,
            })
            .collect())
    }
}
