//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod account;
pub mod poll;
pub mod pagination;

pub use validation::ValidationError;
pub use account::{DisplayName, Email, Password, Username};
pub use poll::{ChoiceText, PollDraft, PollLength, Question};
pub use pagination::{Page, PageLimits, PageRequest, PagedResponse, PaginationParams};
