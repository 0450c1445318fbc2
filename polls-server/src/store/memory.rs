//! In-memory store
//!
//! Keeps everything behind one mutex, so check-and-insert for the unique keys
//! is atomic exactly like the database constraints it stands in for.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::{
    Choice, ChoiceId, ChoiceVoteCount, NewPoll, NewUser, Poll, PollId, Selection, Store,
    StoreError, UniqueKey, User, UserId,
};
use crate::models::{Page, PageRequest};

#[derive(Debug, Clone, Copy)]
struct VoteRow {
    poll_id: PollId,
    choice_id: ChoiceId,
    user_id: UserId,
}

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<UserId, User>,
    polls: BTreeMap<PollId, Poll>,
    votes: Vec<VoteRow>,
    next_user_id: UserId,
    next_poll_id: PollId,
    next_choice_id: ChoiceId,
}

impl Inner {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    /// Newest first, ties broken by id so paging is stable.
    fn page_of<'a>(polls: impl Iterator<Item = &'a Poll>, page: PageRequest) -> Page<Poll> {
        let mut matching: Vec<&Poll> = polls.collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        Page { items, total }
    }
}

/// Store backed by process memory. Cheap to create; one per test.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut inner = self.lock();

        if inner.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(UniqueKey::Username));
        }
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(UniqueKey::Email));
        }

        let id = Inner::next_id(&mut inner.next_user_id);
        let record = User {
            id,
            name: user.name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        inner.users.insert(id, record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.lock().users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_user_by_login(
        &self,
        username_or_email: &str,
    ) -> Result<Option<User>, StoreError> {
        let inner = self.lock();
        let found = inner
            .users
            .values()
            .find(|u| u.username == username_or_email)
            .or_else(|| inner.users.values().find(|u| u.email == username_or_email))
            .cloned();
        Ok(found)
    }

    async fn find_users_in(&self, ids: &[UserId]) -> Result<Vec<User>, StoreError> {
        let inner = self.lock();
        let wanted: HashSet<_> = ids.iter().copied().collect();
        Ok(wanted
            .into_iter()
            .filter_map(|id| inner.users.get(&id).cloned())
            .collect())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, StoreError> {
        Ok(self.lock().users.values().any(|u| u.username == username))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, StoreError> {
        Ok(self.lock().users.values().any(|u| u.email == email))
    }

    async fn create_poll(&self, poll: NewPoll) -> Result<Poll, StoreError> {
        let mut inner = self.lock();

        let id = Inner::next_id(&mut inner.next_poll_id);
        let choices = poll
            .choices
            .into_iter()
            .map(|text| Choice {
                id: Inner::next_id(&mut inner.next_choice_id),
                poll_id: id,
                text,
            })
            .collect();

        let record = Poll {
            id,
            question: poll.question,
            created_by: poll.created_by,
            created_at: poll.created_at,
            expires_at: poll.expires_at,
            choices,
        };
        inner.polls.insert(id, record.clone());
        Ok(record)
    }

    async fn find_poll(&self, id: PollId) -> Result<Option<Poll>, StoreError> {
        Ok(self.lock().polls.get(&id).cloned())
    }

    async fn list_polls(&self, page: PageRequest) -> Result<Page<Poll>, StoreError> {
        let inner = self.lock();
        Ok(Inner::page_of(inner.polls.values(), page))
    }

    async fn list_polls_created_by(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Poll>, StoreError> {
        let inner = self.lock();
        let polls = inner.polls.values().filter(|p| p.created_by == user_id);
        Ok(Inner::page_of(polls, page))
    }

    async fn list_polls_voted_by(
        &self,
        user_id: UserId,
        page: PageRequest,
    ) -> Result<Page<Poll>, StoreError> {
        let inner = self.lock();
        let voted: HashSet<PollId> = inner
            .votes
            .iter()
            .filter(|v| v.user_id == user_id)
            .map(|v| v.poll_id)
            .collect();
        let polls = inner.polls.values().filter(|p| voted.contains(&p.id));
        Ok(Inner::page_of(polls, page))
    }

    async fn count_polls_created_by(&self, user_id: UserId) -> Result<i64, StoreError> {
        let inner = self.lock();
        Ok(inner.polls.values().filter(|p| p.created_by == user_id).count() as i64)
    }

    async fn insert_vote(
        &self,
        poll_id: PollId,
        choice_id: ChoiceId,
        user_id: UserId,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock();

        if inner
            .votes
            .iter()
            .any(|v| v.poll_id == poll_id && v.user_id == user_id)
        {
            return Err(StoreError::Conflict(UniqueKey::Vote));
        }

        inner.votes.push(VoteRow {
            poll_id,
            choice_id,
            user_id,
        });
        Ok(())
    }

    async fn count_votes_in(&self, poll_ids: &[PollId]) -> Result<Vec<ChoiceVoteCount>, StoreError> {
        let inner = self.lock();
        let wanted: HashSet<_> = poll_ids.iter().copied().collect();

        let mut counts: HashMap<ChoiceId, i64> = HashMap::new();
        for vote in inner.votes.iter().filter(|v| wanted.contains(&v.poll_id)) {
            *counts.entry(vote.choice_id).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(choice_id, count)| ChoiceVoteCount { choice_id, count })
            .collect())
    }

    async fn find_selections_in(
        &self,
        user_id: UserId,
        poll_ids: &[PollId],
    ) -> Result<Vec<Selection>, StoreError> {
        let inner = self.lock();
        let wanted: HashSet<_> = poll_ids.iter().copied().collect();
        Ok(inner
            .votes
            .iter()
            .filter(|v| v.user_id == user_id && wanted.contains(&v.poll_id))
            .map(|v| Selection {
                poll_id: v.poll_id,
                choice_id: v.choice_id,
            })
            .collect())
    }

    async fn count_votes_by(&self, user_id: UserId) -> Result<i64, StoreError> {
        let inner = self.lock();
        Ok(inner.votes.iter().filter(|v| v.user_id == user_id).count() as i64)
    }
}
