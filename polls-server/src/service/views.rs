//! Enriched poll views and page assembly
//!
//! A page of polls is enriched with exactly three bulk lookups keyed by the
//! page's id set: vote counts, the requester's selections and the creators.
//! The mapping itself is pure and lives in [`enrich`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ServiceError, ServiceResult};
use crate::store::{
    ChoiceId, ChoiceVoteCount, Poll, PollId, Selection, Store, User, UserId,
};

/// Public identity of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub name: String,
}

impl From<&User> for UserSummary {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            username: u.username.clone(),
            name: u.name.clone(),
        }
    }
}

/// Public profile with activity counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
    pub poll_count: i64,
    pub vote_count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceView {
    pub id: ChoiceId,
    pub text: String,
    pub vote_count: i64,
}

/// A poll plus its tallies and the requester's own selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub id: PollId,
    pub question: String,
    pub choices: Vec<ChoiceView>,
    pub created_by: UserSummary,
    pub creation_date_time: DateTime<Utc>,
    pub expiration_date_time: DateTime<Utc>,
    pub is_expired: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_choice: Option<ChoiceId>,
    pub total_votes: i64,
}

/// Pure mapping from records to views.
///
/// A poll whose creator is missing from `creators` fails with NotFound;
/// that means a broken reference, not a normal runtime path.
pub fn enrich(
    polls: Vec<Poll>,
    counts: &[ChoiceVoteCount],
    selections: &[Selection],
    creators: &[User],
    now: DateTime<Utc>,
) -> ServiceResult<Vec<PollView>> {
    let counts: HashMap<ChoiceId, i64> = counts.iter().map(|c| (c.choice_id, c.count)).collect();
    let selected: HashMap<PollId, ChoiceId> =
        selections.iter().map(|s| (s.poll_id, s.choice_id)).collect();
    let creators: HashMap<UserId, &User> = creators.iter().map(|u| (u.id, u)).collect();

    polls
        .into_iter()
        .map(|poll| {
            let creator = creators
                .get(&poll.created_by)
                .ok_or_else(|| ServiceError::not_found("User", "id", poll.created_by))?;

            let is_expired = poll.is_expired_at(now);
            let choices: Vec<ChoiceView> = poll
                .choices
                .into_iter()
                .map(|c| ChoiceView {
                    vote_count: counts.get(&c.id).copied().unwrap_or(0),
                    id: c.id,
                    text: c.text,
                })
                .collect();
            let total_votes = choices.iter().map(|c| c.vote_count).sum();

            Ok(PollView {
                id: poll.id,
                question: poll.question,
                choices,
                created_by: UserSummary::from(*creator),
                creation_date_time: poll.created_at,
                expiration_date_time: poll.expires_at,
                is_expired,
                selected_choice: selected.get(&poll.id).copied(),
                total_votes,
            })
        })
        .collect()
}

/// Run the three bulk lookups for `polls` and map them to views.
pub async fn assemble(
    store: &dyn Store,
    polls: Vec<Poll>,
    requester: Option<UserId>,
) -> ServiceResult<Vec<PollView>> {
    if polls.is_empty() {
        return Ok(Vec::new());
    }

    let poll_ids: Vec<PollId> = polls.iter().map(|p| p.id).collect();
    let mut creator_ids: Vec<UserId> = polls.iter().map(|p| p.created_by).collect();
    creator_ids.sort_unstable();
    creator_ids.dedup();

    let counts = store.count_votes_in(&poll_ids).await?;
    let selections = match requester {
        Some(user_id) => store.find_selections_in(user_id, &poll_ids).await?,
        None => Vec::new(),
    };
    let creators = store.find_users_in(&creator_ids).await?;

    enrich(polls, &counts, &selections, &creators, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Choice, Role};
    use chrono::Duration;

    fn user(id: UserId) -> User {
        User {
            id,
            name: "Creator".into(),
            username: format!("creator{}", id),
            email: format!("creator{}@x.com", id),
            password_hash: String::new(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    fn poll(id: PollId, created_by: UserId, choices: &[(ChoiceId, &str)]) -> Poll {
        let now = Utc::now();
        Poll {
            id,
            question: "Which way up?".into(),
            created_by,
            created_at: now - Duration::hours(1),
            expires_at: now + Duration::hours(1),
            choices: choices
                .iter()
                .map(|(cid, text)| Choice {
                    id: *cid,
                    poll_id: id,
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn totals_and_selection() {
        let polls = vec![poll(1, 9, &[(10, "Ski Lift"), (11, "Elevator")])];
        let counts = [
            ChoiceVoteCount { choice_id: 10, count: 5 },
            ChoiceVoteCount { choice_id: 11, count: 6 },
        ];
        let selections = [Selection { poll_id: 1, choice_id: 10 }];

        let views = enrich(polls, &counts, &selections, &[user(9)], Utc::now()).unwrap();
        let view = &views[0];

        assert_eq!(view.total_votes, 11);
        assert_eq!(view.selected_choice, Some(10));
        assert_eq!(view.choices[0].vote_count, 5);
        assert_eq!(view.choices[1].vote_count, 6);
        assert_eq!(view.created_by.id, 9);
        assert!(!view.is_expired);
    }

    #[test]
    fn choices_without_votes_count_zero() {
        let polls = vec![poll(1, 9, &[(10, "A"), (11, "B")])];
        let views = enrich(polls, &[], &[], &[user(9)], Utc::now()).unwrap();

        assert_eq!(views[0].total_votes, 0);
        assert!(views[0].choices.iter().all(|c| c.vote_count == 0));
        assert_eq!(views[0].selected_choice, None);
    }

    #[test]
    fn selection_only_applies_to_its_poll() {
        let polls = vec![poll(1, 9, &[(10, "A")]), poll(2, 9, &[(20, "B")])];
        let selections = [Selection { poll_id: 2, choice_id: 20 }];

        let views = enrich(polls, &[], &selections, &[user(9)], Utc::now()).unwrap();
        assert_eq!(views[0].selected_choice, None);
        assert_eq!(views[1].selected_choice, Some(20));
    }

    #[test]
    fn missing_creator_is_not_found() {
        let polls = vec![poll(1, 9, &[(10, "A")])];
        let err = enrich(polls, &[], &[], &[], Utc::now()).unwrap_err();
        assert!(matches!(err, ServiceError::NotFound { resource: "User", .. }));
    }

    #[test]
    fn expired_flag_follows_now() {
        let polls = vec![poll(1, 9, &[(10, "A")])];
        let later = Utc::now() + Duration::hours(2);
        let views = enrich(polls, &[], &[], &[user(9)], later).unwrap();
        assert!(views[0].is_expired);
    }

    #[test]
    fn selected_choice_omitted_from_json() {
        let polls = vec![poll(1, 9, &[(10, "A")])];
        let views = enrich(polls, &[], &[], &[user(9)], Utc::now()).unwrap();
        let json = serde_json::to_value(&views[0]).unwrap();

        assert!(json.get("selectedChoice").is_none());
        assert_eq!(json["isExpired"], false);
        assert_eq!(json["totalVotes"], 0);
        assert_eq!(json["createdBy"]["username"], "creator9");
        assert!(json.get("creationDateTime").is_some());
    }
}
