//! [`Command`] definition.

pub mod delete_user;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::delete_user::DeleteUser;
