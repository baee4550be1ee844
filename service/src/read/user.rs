//! [`User`] read model definition.
//!
//! [`User`]: crate::domain::User

pub mod list {
    //! [`User`]s list definitions.

    use derive_more::{Display, From, Into};

    #[cfg(doc)]
    use crate::domain::User;

    /// Arguments selecting a page of [`User`]s.
    pub use common::pagination::Arguments as Selector;

    /// Page of [`User`]s.
    pub type Page = Vec<crate::domain::User>;

    /// Total count of active [`User`]s.
    #[derive(
        Clone, Copy, Debug, Default, Display, Eq, From, Hash, Into, PartialEq,
    )]
    pub struct TotalCount(u64);
}
