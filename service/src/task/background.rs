//! Background environment for running [`Task`]s.

use std::{
    error::Error,
    future::{Future, IntoFuture},
    iter,
};

use futures::{
    future::{self, LocalBoxFuture},
    FutureExt as _, TryFutureExt as _,
};
use tokio::task;

#[cfg(doc)]
use crate::Task;

/// Type-erased error of a [`Task`] spawned into a [`Background`].
type BoxError = Box<dyn Error + 'static>;

/// Background environment for running long-lived [`Task`]s on the current
/// thread.
///
/// Resolves once all the spawned [`Task`]s complete, or as soon as any of
/// them fails.
#[derive(Debug, Default)]
pub struct Background {
    /// Local set of tasks.
    set: task::LocalSet,

    /// Handles of spawned tasks.
    handles: Vec<task::JoinHandle<Result<(), BoxError>>>,
}

impl Background {
    /// Spawns a new [`Task`] inside the [`Background`] environment.
    pub fn spawn<F, E>(&mut self, future: F)
    where
        F: Future<Output = Result<(), E>> + 'static,
        E: Error + 'static,
    {
        self.handles.push(
            self.set
                .spawn_local(future.map_err(|e| BoxError::from(Box::new(e)))),
        );
    }

    /// Returns the number of [`Task`]s spawned into this [`Background`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Indicates whether no [`Task`]s were spawned into this [`Background`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl IntoFuture for Background {
    type Output = Result<(), BoxError>;
    type IntoFuture = LocalBoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let Self { set, handles } = self;
        let joined = handles.into_iter().map(|h| {
            h.map(|r| match r {
                Ok(res) => res,
                Err(e) => Err(BoxError::from(Box::new(e))),
            })
            .boxed_local()
        });
        future::try_join_all(iter::once(set.map(Ok).boxed_local()).chain(joined))
            .map_ok(drop)
            .boxed_local()
    }
}

#[cfg(test)]
mod spec {
    use std::{convert::Infallible, fmt, future::IntoFuture as _};

    use super::Background;

    #[derive(Debug)]
    struct Failure;

    impl fmt::Display for Failure {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "failure")
        }
    }

    impl std::error::Error for Failure {}

    #[tokio::test]
    async fn resolves_when_all_complete() {
        let mut bg = Background::default();
        assert!(bg.is_empty());

        bg.spawn(async { Ok::<_, Infallible>(()) });
        bg.spawn(async { Ok::<_, Infallible>(()) });
        assert_eq!(bg.len(), 2);

        bg.into_future().await.unwrap();
    }

    #[tokio::test]
    async fn fails_when_any_fails() {
        let mut bg = Background::default();
        bg.spawn(async { Ok::<_, Infallible>(()) });
        bg.spawn(async { Err::<(), _>(Failure) });

        let err = bg.into_future().await.unwrap_err();
        assert_eq!(err.to_string(), "failure");
    }
}
