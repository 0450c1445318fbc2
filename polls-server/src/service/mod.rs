//! Business logic between the HTTP handlers and the store

pub mod accounts;
pub mod polls;
pub mod views;

pub use accounts::{AccountService, SignUp};
pub use polls::PollService;
pub use views::{ChoiceView, PollView, UserProfile, UserSummary};
