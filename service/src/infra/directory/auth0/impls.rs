//! [`Directory`] implementations of [`Auth0`].

use common::operations::{By, Delete, Select};
use reqwest::Method;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{user, User},
    infra::{directory, Auth0, Directory},
    read::user::list::{Page, Selector, TotalCount},
};

use super::{Auth0User, Error};

impl Directory<Select<By<TotalCount, ()>>> for Auth0 {
    type Ok = TotalCount;
    type Err = Traced<directory::Error>;

    async fn execute(
        &self,
        _: Select<By<TotalCount, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let count: u64 = self
            .send(Method::GET, &["api", "v2", "stats", "active-users"], |r| r)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> directory::Error))?
            .json()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(count.into())
    }
}

impl Directory<Select<By<Page, Selector>>> for Auth0 {
    type Ok = Page;
    type Err = Traced<directory::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Page, Selector>>,
    ) -> Result<Self::Ok, Self::Err> {
        let Selector { page, per_page } = by.into_inner();
        log::debug!("listing Auth0 users: page {page}, {per_page} per page");

        let users: Vec<Auth0User> = self
            .send(Method::GET, &["api", "v2", "users"], |r| {
                r.query(&[
                    ("per_page", per_page.to_string()),
                    ("page", page.to_string()),
                    ("fields", "user_id,name,email".to_owned()),
                    ("include_fields", "true".to_owned()),
                ])
            })
            .await
            .map_err(tracerr::map_from_and_wrap!(=> directory::Error))?
            .json()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        users
            .into_iter()
            .map(User::try_from)
            .collect::<Result<_, _>>()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)
    }
}

impl Directory<Delete<By<User, user::Id>>> for Auth0 {
    type Ok = ();
    type Err = Traced<directory::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<User, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        log::debug!("deleting Auth0 user `{id}`");

        self.send(Method::DELETE, &["api", "v2", "users", id.as_ref()], |r| r)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> directory::Error))
            .map(drop)
    }
}
