//! Vote repository
//!
//! The (poll_id, user_id) unique constraint is the only guard against double
//! voting; concurrent inserts race and the loser gets `Conflict(Vote)`.

use sqlx::{FromRow, PgPool};

use super::translate_conflict;
use crate::store::{ChoiceId, ChoiceVoteCount, PollId, Selection, StoreError, UserId};

#[derive(Debug, FromRow)]
struct CountRow {
    choice_id: i64,
    vote_count: i64,
}

#[derive(Debug, FromRow)]
struct SelectionRow {
    poll_id: i64,
    choice_id: i64,
}

/// Vote repository
pub struct VoteRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> VoteRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(
        &self,
        poll_id: PollId,
        choice_id: ChoiceId,
        user_id: UserId,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO votes (poll_id, choice_id, user_id) VALUES ($1, $2, $3)")
            .bind(poll_id)
            .bind(choice_id)
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(translate_conflict)?;
        Ok(())
    }

    /// One grouped query for every poll on a page.
    pub async fn count_in(&self, poll_ids: &[PollId]) -> Result<Vec<ChoiceVoteCount>, StoreError> {
        if poll_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<CountRow> = sqlx::query_as(
            r#"
            SELECT choice_id, COUNT(*) AS vote_count
            FROM votes
            WHERE poll_id = ANY($1)
            GROUP BY choice_id
            "#,
        )
        .bind(poll_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ChoiceVoteCount {
                choice_id: r.choice_id,
                count: r.vote_count,
            })
            .collect())
    }

    pub async fn selections_in(
        &self,
        user_id: UserId,
        poll_ids: &[PollId],
    ) -> Result<Vec<Selection>, StoreError> {
        if poll_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<SelectionRow> = sqlx::query_as(
            "SELECT poll_id, choice_id FROM votes WHERE user_id = $1 AND poll_id = ANY($2)",
        )
        .bind(user_id)
        .bind(poll_ids)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Selection {
                poll_id: r.poll_id,
                choice_id: r.choice_id,
            })
            .collect())
    }

    pub async fn count_by(&self, user_id: UserId) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM votes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
