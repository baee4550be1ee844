//! Service contains the business logic of purging users from a directory.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use std::sync::Arc;

use common::operations::{By, Start};
use derive_more::{Debug, Error};
use tokio::sync::Mutex;

#[cfg(doc)]
use infra::Directory;

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [`task::PurgeUsers`] configuration.
    pub purge_users: task::purge_users::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Dir> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Directory`] of this [`Service`].
    directory: Dir,

    /// Lock held while a [`task::PurgeUsers`] run is in progress.
    #[debug(skip)]
    purge_lock: Arc<Mutex<()>>,
}

impl<Dir> Service<Dir> {
    /// Creates a new [`Service`] with the provided parameters, without
    /// starting any background [`Task`]s.
    #[must_use]
    pub fn new(config: Config, directory: Dir) -> Self {
        Self {
            config,
            directory,
            purge_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Creates a new [`Service`] with the provided parameters, and spawns its
    /// scheduled [`Task`]s into the returned [`task::Background`].
    pub fn with_background(
        config: Config,
        directory: Dir,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<task::PurgeUsers<Self>, task::purge_users::Config>,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Self::new(config, directory);

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().purge_users.clone())))
                .await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Directory`] of this [`Service`].
    #[must_use]
    pub fn directory(&self) -> &Dir {
        &self.directory
    }

    /// Returns the lock guarding [`task::PurgeUsers`] runs against overlap.
    pub(crate) fn purge_lock(&self) -> &Mutex<()> {
        &self.purge_lock
    }
}
