//! Poll listing, retrieval, creation and voting

use chrono::Utc;

use super::views::{assemble, PollView};
use crate::error::{ServiceError, ServiceResult};
use crate::models::{Page, PageRequest, PagedResponse, PollDraft};
use crate::store::{ChoiceId, NewPoll, Poll, PollId, Store, StoreError, UniqueKey, User, UserId};

/// Poll operations over any [`Store`]
pub struct PollService<'a> {
    store: &'a dyn Store,
}

impl<'a> PollService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// All polls, newest first, enriched for `requester`.
    pub async fn list(
        &self,
        requester: Option<UserId>,
        page: PageRequest,
    ) -> ServiceResult<PagedResponse<PollView>> {
        let polls = self.store.list_polls(page).await?;
        self.to_response(polls, requester, page).await
    }

    /// Polls created by `username`.
    pub async fn list_created_by(
        &self,
        username: &str,
        requester: Option<UserId>,
        page: PageRequest,
    ) -> ServiceResult<PagedResponse<PollView>> {
        let user = self.user_by_username(username).await?;
        let polls = self.store.list_polls_created_by(user.id, page).await?;
        self.to_response(polls, requester, page).await
    }

    /// Polls `username` has voted on.
    pub async fn list_voted_by(
        &self,
        username: &str,
        requester: Option<UserId>,
        page: PageRequest,
    ) -> ServiceResult<PagedResponse<PollView>> {
        let user = self.user_by_username(username).await?;
        let polls = self.store.list_polls_voted_by(user.id, page).await?;
        self.to_response(polls, requester, page).await
    }

    pub async fn get(&self, poll_id: PollId, requester: Option<UserId>) -> ServiceResult<PollView> {
        let poll = self.poll(poll_id).await?;
        self.view_of(poll, requester).await
    }

    /// Persist a validated draft. Expiration is measured from now.
    pub async fn create(&self, creator: UserId, draft: PollDraft) -> ServiceResult<Poll> {
        let created_at = Utc::now();
        let expires_at = created_at + draft.length.duration();

        let poll = self
            .store
            .create_poll(NewPoll {
                question: draft.question.as_str().to_owned(),
                created_by: creator,
                created_at,
                expires_at,
                choices: draft
                    .choices
                    .iter()
                    .map(|c| c.as_str().to_owned())
                    .collect(),
            })
            .await?;

        tracing::info!(poll_id = poll.id, creator, choices = poll.choices.len(), "poll created");
        Ok(poll)
    }

    /// Cast `user_id`'s vote. The poll must exist and be open, and the
    /// choice must belong to it; a second vote is refused by the store.
    pub async fn vote(
        &self,
        poll_id: PollId,
        choice_id: ChoiceId,
        user_id: UserId,
    ) -> ServiceResult<PollView> {
        let poll = self.poll(poll_id).await?;

        if poll.is_expired_at(Utc::now()) {
            return Err(ServiceError::PollClosed);
        }
        if !poll.has_choice(choice_id) {
            return Err(ServiceError::not_found("Choice", "id", choice_id));
        }

        match self.store.insert_vote(poll_id, choice_id, user_id).await {
            Ok(()) => {}
            Err(StoreError::Conflict(UniqueKey::Vote)) => {
                tracing::debug!(poll_id, user_id, "duplicate vote refused");
                return Err(ServiceError::AlreadyVoted);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(poll_id, choice_id, user_id, "vote cast");
        self.view_of(poll, Some(user_id)).await
    }

    async fn poll(&self, poll_id: PollId) -> ServiceResult<Poll> {
        self.store
            .find_poll(poll_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Poll", "id", poll_id))
    }

    async fn user_by_username(&self, username: &str) -> ServiceResult<User> {
        self.store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", "username", username))
    }

    async fn view_of(&self, poll: Poll, requester: Option<UserId>) -> ServiceResult<PollView> {
        let id = poll.id;
        assemble(self.store, vec![poll], requester)
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Poll", "id", id))
    }

    async fn to_response(
        &self,
        polls: Page<Poll>,
        requester: Option<UserId>,
        page: PageRequest,
    ) -> ServiceResult<PagedResponse<PollView>> {
        let content = assemble(self.store, polls.items, requester).await?;
        Ok(PagedResponse::new(content, polls.total, page))
    }
}
