//! [`Command`] for deleting a [`User`].

use common::operations::{By, Delete};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{directory, Directory},
    Service,
};

use super::Command;

/// [`Command`] for deleting a [`User`] from the [`Directory`].
#[derive(Clone, Debug, From)]
pub struct DeleteUser {
    /// ID of the [`User`] to be deleted.
    pub user_id: user::Id,
}

impl<Dir> Command<DeleteUser> for Service<Dir>
where
    Dir: Directory<
        Delete<By<User, user::Id>>,
        Ok = (),
        Err = Traced<directory::Error>,
    >,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteUser) -> Result<Self::Ok, Self::Err> {
        let DeleteUser { user_id } = cmd;

        self.directory()
            .execute(Delete(By::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`DeleteUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Directory`] error.
    #[display("`Directory` operation failed: {_0}")]
    Directory(directory::Error),
}
