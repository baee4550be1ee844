//! [`Directory`]-related implementations.

#[cfg(feature = "auth0")]
pub mod auth0;

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "auth0")]
pub use self::auth0::Auth0;

/// User directory operation.
pub use common::Handler as Directory;

/// [`Directory`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "auth0")]
    /// [`Auth0`] error.
    Auth0(auth0::Error),
}
