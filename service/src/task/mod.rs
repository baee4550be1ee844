//! Background [`Task`]s definitions.

mod background;
pub mod purge_users;

pub use common::Handler as Task;

pub use self::{background::Background, purge_users::PurgeUsers};
