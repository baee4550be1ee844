//! [`PurgeUsers`] [`Task`].

use std::{convert::Infallible, time};

use chrono::{DateTime, Utc};
use common::{
    operations::{By, Perform, Start},
    pagination,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    command::{delete_user, DeleteUser},
    domain::{user, User},
    infra::directory,
    query::{self, Query},
    read::user::list,
    Command, Service,
};

use super::Task;

pub use cron::Schedule;

/// Error of parsing a [`Schedule`].
pub type ScheduleError = cron::error::Error;

/// Configuration for [`PurgeUsers`] [`Task`].
#[derive(Clone, Debug)]
pub struct Config {
    /// [`Schedule`] of the runs.
    pub schedule: Schedule,

    /// Directory domain the [`Service`] is configured with.
    pub domain: String,

    /// Directory domain the runs are allowed to be performed against.
    pub expected_domain: String,

    /// [`user::Token`] marking [`User`]s for deletion.
    pub token: user::Token,

    /// [`user::Name`] of [`User`]s deleted without being announced.
    pub exempt_name: user::Name,

    /// Bounds of the paginated scan.
    pub limits: pagination::Limits,

    /// Pause after each countdown message.
    pub pause: time::Duration,
}

/// [`Task`] for deleting [`User`]s mentioning the configured
/// [`user::Token`].
#[derive(Clone, Debug)]
pub struct PurgeUsers<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<S> PurgeUsers<S> {
    /// Creates a new [`PurgeUsers`] [`Task`] for a single manual run.
    #[must_use]
    pub fn new(config: Config, service: S) -> Self {
        Self { config, service }
    }
}

impl<Dir> Task<Start<By<PurgeUsers<Self>, Config>>> for Service<Dir>
where
    PurgeUsers<Service<Dir>>:
        Task<Perform<()>, Ok = Summary, Err = Traced<ExecutionError>>,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<PurgeUsers<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let task = PurgeUsers::new(by.into_inner(), self.clone());
        log::info!(
            "`task::PurgeUsers` scheduled at `{}`",
            task.config.schedule,
        );

        while let Some(delay) = until_next(&task.config.schedule, Utc::now())
        {
            tokio::time::sleep(delay).await;

            log::info!("`task::PurgeUsers` triggered");
            match task.execute(Perform(())).await {
                Ok(summary) => {
                    log::info!("`task::PurgeUsers` completed: {summary}");
                }
                Err(e) if e.as_ref().is_skip() => {
                    log::warn!("`task::PurgeUsers` skipped: {e}");
                }
                Err(e) => log::error!("`task::PurgeUsers` failed: {e}"),
            }
        }

        log::warn!("`task::PurgeUsers` schedule has no upcoming runs");
        Ok(())
    }
}

impl<Dir> Task<Perform<()>> for PurgeUsers<Service<Dir>>
where
    Service<Dir>: Query<
            query::users::TotalCount,
            Ok = list::TotalCount,
            Err = Traced<directory::Error>,
        > + Query<
            query::users::List,
            Ok = list::Page,
            Err = Traced<directory::Error>,
        > + Command<
            DeleteUser,
            Ok = (),
            Err = Traced<delete_user::ExecutionError>,
        >,
{
    type Ok = Summary;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let Self { config, service } = self;

        let Ok(_running) = service.purge_lock().try_lock() else {
            return Err(tracerr::new!(E::AlreadyRunning));
        };

        if config.domain != config.expected_domain {
            return Err(tracerr::new!(E::DomainMismatch {
                expected: config.expected_domain.clone(),
                actual: config.domain.clone(),
            }));
        }

        let mut summary = Summary {
            initial_count: self.total_count().await?,
            ..Summary::default()
        };

        self.countdown().await;

        for selector in config.limits.pages(summary.initial_count.into()) {
            let users = service
                .execute(query::users::List::by(selector))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            summary.pages += 1;

            for user in users {
                summary.scanned += 1;

                match Verdict::of(&user, &config.token, &config.exempt_name) {
                    Verdict::Delete { announce } => {
                        if announce {
                            log::info!("Deleting: {}..", user.name);
                        }
                        service
                            .execute(DeleteUser {
                                user_id: user.id.clone(),
                            })
                            .await
                            .map_err(tracerr::map_from_and_wrap!(=> E))?;
                        summary.deleted.push(user.id);
                    }
                    Verdict::Keep => {
                        log::info!("Not deleting: {}..", user.name);
                        summary.kept += 1;
                    }
                }
            }
        }

        summary.final_count = self.total_count().await?;
        log::info!("Done!");

        Ok(summary)
    }
}

impl<Dir> PurgeUsers<Service<Dir>>
where
    Service<Dir>: Query<
        query::users::TotalCount,
        Ok = list::TotalCount,
        Err = Traced<directory::Error>,
    >,
{
    /// Fetches and logs the total count of active [`User`]s.
    async fn total_count(
        &self,
    ) -> Result<list::TotalCount, Traced<ExecutionError>> {
        let count = self
            .service
            .execute(query::users::TotalCount::by(()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        log::info!("Total user count on this tenant: {count}");
        Ok(count)
    }
}

impl<S> PurgeUsers<S> {
    /// Warns about the upcoming deletion, pausing after each message.
    ///
    /// There is no way to interrupt it.
    async fn countdown(&self) {
        let Config {
            domain,
            token,
            pause,
            ..
        } = &self.config;

        let messages = [
            format!(
                "This will delete potentially many users in the Auth0 domain \
                 named '{domain}'.",
            ),
            format!(
                "Any user containing \"{token}\" either in the name, or \
                 email, will be deleted.",
            ),
            "Starting in...".to_owned(),
            "...3...".to_owned(),
            "...2...".to_owned(),
            "...1...".to_owned(),
        ];
        for msg in messages {
            log::warn!("{msg}");
            tokio::time::sleep(*pause).await;
        }
        log::warn!("Starting the purge...");
    }
}

/// Returns the time left until the next run of the provided [`Schedule`]
/// after `now`, if any.
fn until_next(
    schedule: &Schedule,
    now: DateTime<Utc>,
) -> Option<time::Duration> {
    let next = schedule.after(&now).next()?;
    Some((next - now).to_std().unwrap_or(time::Duration::ZERO))
}

/// Decision about a single [`User`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Verdict {
    /// [`User`] is to be deleted.
    Delete {
        /// Indicator whether the deletion should be logged.
        announce: bool,
    },

    /// [`User`] is to be kept.
    Keep,
}

impl Verdict {
    /// Decides about the provided [`User`].
    ///
    /// A [`User`] named exactly as `exempt` is still deleted, only silently.
    #[must_use]
    pub fn of(user: &User, token: &user::Token, exempt: &user::Name) -> Self {
        if user.mentions(token) {
            Self::Delete {
                announce: user.name != *exempt,
            }
        } else {
            Self::Keep
        }
    }
}

/// Result of a single [`PurgeUsers`] run.
#[derive(Clone, Debug, Default, Display, Eq, PartialEq)]
#[display(
    "deleted {} and kept {kept} of {scanned} users on {pages} pages, \
     active users {initial_count} -> {final_count}",
    deleted.len()
)]
pub struct Summary {
    /// Count of active [`User`]s before the run.
    pub initial_count: list::TotalCount,

    /// Count of active [`User`]s after the run.
    pub final_count: list::TotalCount,

    /// Number of scanned pages.
    pub pages: u32,

    /// Number of scanned [`User`]s.
    pub scanned: u64,

    /// IDs of deleted [`User`]s, in order of deletion.
    pub deleted: Vec<user::Id>,

    /// Number of kept [`User`]s.
    pub kept: u64,
}

/// Error of [`PurgeUsers`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Directory`] error.
    ///
    /// [`Directory`]: crate::infra::Directory
    #[display("`Directory` operation failed: {_0}")]
    Directory(directory::Error),

    /// [`DeleteUser`] [`Command`] error.
    #[display("`DeleteUser` failed: {_0}")]
    DeleteUser(delete_user::ExecutionError),

    /// Configured domain is not the expected one.
    #[display(
        "configured domain `{actual}` is not the expected `{expected}`, \
         be sure the Auth0 environment variables are set up correctly"
    )]
    #[from(ignore)]
    DomainMismatch {
        /// Expected domain.
        expected: String,

        /// Configured domain.
        actual: String,
    },

    /// Another run is in progress.
    #[display("another run is in progress")]
    #[from(ignore)]
    AlreadyRunning,
}

impl ExecutionError {
    /// Indicates whether this [`ExecutionError`] means the run was skipped
    /// without touching the directory, rather than failed.
    #[must_use]
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::DomainMismatch { .. } | Self::AlreadyRunning)
    }
}
