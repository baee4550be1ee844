//! [`Query`] definition.

pub mod users;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{directory, Directory},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Directory`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DirectoryQuery<T>(T);

impl<W, B> DirectoryQuery<By<W, B>> {
    /// Creates a new [`DirectoryQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Dir, W, B> Query<DirectoryQuery<By<W, B>>> for Service<Dir>
where
    Dir: Directory<Select<By<W, B>>, Ok = W, Err = Traced<directory::Error>>,
{
    type Ok = W;
    type Err = Traced<directory::Error>;

    async fn execute(
        &self,
        DirectoryQuery(by): DirectoryQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.directory()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}
