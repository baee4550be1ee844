//! [`User`] definitions.

use std::str::FromStr;

use derive_more::{AsRef, Display, From, Into};

/// User account of a directory.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct User {
    /// ID of this [`User`].
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`].
    pub email: Email,
}

impl User {
    /// Checks whether the provided [`Token`] occurs in the [`Name`] or the
    /// [`Email`] of this [`User`], ignoring case.
    #[must_use]
    pub fn mentions(&self, token: &Token) -> bool {
        token.occurs_in(&self.name) || token.occurs_in(&self.email)
    }
}

/// ID of a [`User`].
///
/// Opaque to this service, e.g. `auth0|5f7c8ec7c33c6c004bbafe82`.
#[derive(
    AsRef, Clone, Debug, Display, Eq, From, Hash, Into, PartialEq,
)]
#[as_ref(str)]
#[from(&str, String)]
pub struct Id(String);

/// Display name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(&str, String)]
pub struct Name(String);

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(&str, String)]
pub struct Email(String);

/// Substring marking [`User`]s for deletion.
///
/// Always stored lowercased and never empty, so it cannot match every
/// [`User`] by accident.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] if the given `token` is not blank.
    #[must_use]
    pub fn new(token: impl AsRef<str>) -> Option<Self> {
        let token = token.as_ref().trim();
        (!token.is_empty()).then(|| Self(token.to_lowercase()))
    }

    /// Checks whether this [`Token`] occurs in the `haystack`, ignoring case.
    #[must_use]
    pub fn occurs_in(&self, haystack: impl AsRef<str>) -> bool {
        haystack.as_ref().to_lowercase().contains(&self.0)
    }
}

impl FromStr for Token {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("blank `Token`")
    }
}
