//! Infrastructure layer.

pub mod directory;

pub use self::directory::Directory;
#[cfg(feature = "auth0")]
pub use self::directory::{auth0, Auth0};
