//! [`Query`] collection related to the multiple [`User`]s.

use common::operations::By;

#[cfg(doc)]
use crate::{domain::User, Query};
use crate::read::user::list;

use super::DirectoryQuery;

/// Queries a [`list::Page`] of [`User`]s.
pub type List = DirectoryQuery<By<list::Page, list::Selector>>;

/// Queries total count of active [`User`]s.
pub type TotalCount = DirectoryQuery<By<list::TotalCount, ()>>;
