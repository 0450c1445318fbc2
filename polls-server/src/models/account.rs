//! Account field validation
//!
//! Username, email, display name and password are validated once at the edge;
//! everything downstream works with these newtypes.

use once_cell::sync::Lazy;
use regex::Regex;

use super::validation::check_length;
use super::ValidationError;

const NAME_LEN: (usize, usize) = (4, 40);
const USERNAME_LEN: (usize, usize) = (3, 15);
const EMAIL_MAX_LEN: usize = 40;
const PASSWORD_LEN: (usize, usize) = (6, 20);

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_.-]+$").expect("invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("invalid email regex")
});

/// Validated login name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// # Example
    /// ```
    /// use polls_server::models::Username;
    ///
    /// assert!(Username::new("john_smith").is_ok());
    /// assert!(Username::new("jo").is_err());        // too short
    /// assert!(Username::new("john smith").is_err()); // space
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        check_length("username", s, USERNAME_LEN.0, USERNAME_LEN.1)?;

        if !USERNAME_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "username",
                reason: "may only contain letters, digits, '.', '_' and '-'",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Validated email address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        check_length("email", s, 1, EMAIL_MAX_LEN)?;

        if !EMAIL_RE.is_match(s) {
            return Err(ValidationError::InvalidFormat {
                field: "email",
                reason: "must be a valid email address",
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Validated display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayName(String);

impl DisplayName {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        check_length("name", s, NAME_LEN.0, NAME_LEN.1)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Plain-text password, only ever held long enough to hash it.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        check_length("password", s, PASSWORD_LEN.0, PASSWORD_LEN.1)?;
        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}
