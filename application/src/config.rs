//! [`Config`]-related definitions.

use std::{env, time};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use derive_more::{Debug, Display, Error, From};
use secrecy::SecretString;
use serde::Deserialize;
use service::{
    domain::user,
    task::purge_users::{self, ScheduleError},
};
use smart_default::SmartDefault;
use url::Url;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory configuration.
    pub directory: Directory,

    /// Service configuration.
    pub service: Service,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the `CONF`-prefixed environment variables (if any);
    /// - overriding directory credentials with the `AUTH0_DOMAIN`,
    ///   `AUTH0_CLIENT_ID` and `AUTH0_CLIENT_SECRET` environment variables
    ///   (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .set_override_option(
                "directory.domain",
                env::var("AUTH0_DOMAIN").ok(),
            )?
            .set_override_option(
                "directory.client_id",
                env::var("AUTH0_CLIENT_ID").ok(),
            )?
            .set_override_option(
                "directory.client_secret",
                env::var("AUTH0_CLIENT_SECRET").ok(),
            )?
            .build()?
            .try_deserialize()
    }
}

/// Auth0 directory configuration.
#[derive(Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Directory {
    /// Domain of the Auth0 tenant.
    pub domain: String,

    /// ID of the machine-to-machine application.
    pub client_id: String,

    /// Secret of the machine-to-machine application.
    #[debug(skip)]
    pub client_secret: String,

    /// Base URL to use instead of `https://{domain}/`.
    pub endpoint: Option<Url>,

    /// Timeout of a single HTTP request.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Directory> for service::infra::auth0::Config {
    fn from(value: Directory) -> Self {
        let Directory {
            domain,
            client_id,
            client_secret,
            endpoint,
            timeout,
        } = value;

        Self {
            domain,
            client_id,
            client_secret: SecretString::from(client_secret),
            endpoint,
            timeout,
        }
    }
}

/// Service configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Service tasks configuration.
    pub tasks: Tasks,
}

impl Service {
    /// Converts this [`Service`] configuration into a [`service::Config`]
    /// for the directory with the provided `domain`.
    ///
    /// # Errors
    ///
    /// If any of the task settings is invalid.
    pub fn into_config(
        self,
        domain: impl Into<String>,
    ) -> Result<service::Config, InvalidConfig> {
        let Self {
            tasks: Tasks { purge_users: task },
        } = self;
        let PurgeUsers {
            schedule,
            expected_domain,
            token,
            exempt_name,
            per_page,
            max_pages,
            pause,
        } = task;

        Ok(service::Config {
            purge_users: purge_users::Config {
                schedule: schedule.parse()?,
                domain: domain.into(),
                expected_domain,
                token: user::Token::new(token)
                    .ok_or(InvalidConfig::BlankToken)?,
                exempt_name: exempt_name.into(),
                limits: common::pagination::Limits {
                    per_page,
                    max_pages,
                },
                pause,
            },
        })
    }
}

/// Service tasks configuration.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Tasks {
    /// `PurgeUsers` task configuration.
    pub purge_users: PurgeUsers,
}

/// `PurgeUsers` task configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct PurgeUsers {
    /// [Cron expression] of the runs, with seconds.
    ///
    /// [Cron expression]: https://docs.rs/cron
    #[default("0 0 * * * *".to_owned())]
    pub schedule: String,

    /// Directory domain the runs are allowed to be performed against.
    #[default("obiecre-dev.auth0.com".to_owned())]
    pub expected_domain: String,

    /// Token marking users for deletion.
    #[default("pongo".to_owned())]
    pub token: String,

    /// Name of users deleted without being announced.
    #[default("Pongo Rule".to_owned())]
    pub exempt_name: String,

    /// Number of users requested per page.
    #[default(100)]
    pub per_page: u32,

    /// Maximum number of pages scanned per run.
    #[default(9)]
    pub max_pages: u32,

    /// Pause after each countdown message.
    #[default(time::Duration::from_secs(1))]
    #[serde(with = "humantime_serde")]
    pub pause: time::Duration,
}

/// Error of converting configuration into a [`service::Config`].
#[derive(Debug, Display, Error, From)]
pub enum InvalidConfig {
    /// `service.tasks.purge_users.schedule` is not a valid cron expression.
    #[display("invalid `service.tasks.purge_users.schedule`: {_0}")]
    Schedule(ScheduleError),

    /// `service.tasks.purge_users.token` is blank.
    #[display("`service.tasks.purge_users.token` must not be blank")]
    #[from(ignore)]
    BlankToken,
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use config::{File, FileFormat};
    use service::domain::user;

    use super::{Config, InvalidConfig};

    fn parse(toml: &str) -> Config {
        config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults() {
        let conf = parse("").service.into_config("a.auth0.com").unwrap();
        let purge = conf.purge_users;

        assert_eq!(purge.schedule.to_string(), "0 0 * * * *");
        assert_eq!(purge.domain, "a.auth0.com");
        assert_eq!(purge.expected_domain, "obiecre-dev.auth0.com");
        assert_eq!(purge.token, user::Token::new("pongo").unwrap());
        assert_eq!(purge.exempt_name, user::Name::from("Pongo Rule"));
        assert_eq!(purge.limits.per_page, 100);
        assert_eq!(purge.limits.max_pages, 9);
        assert_eq!(purge.pause, Duration::from_secs(1));
    }

    #[test]
    fn overrides() {
        let conf = parse(
            r#"
            [directory]
            domain = "tenant.auth0.com"
            client_id = "id"
            client_secret = "secret"
            endpoint = "http://127.0.0.1:8080/"
            timeout = "5s"

            [service.tasks.purge_users]
            schedule = "0 */15 * * * *"
            token = "Test"
            max_pages = 2
            pause = "0s"

            [log]
            level = "DEBUG"
            "#,
        );

        assert_eq!(conf.directory.domain, "tenant.auth0.com");
        assert_eq!(conf.directory.client_secret, "secret");
        assert_eq!(
            conf.directory.endpoint.as_ref().map(url::Url::as_str),
            Some("http://127.0.0.1:8080/"),
        );
        assert_eq!(conf.directory.timeout, Duration::from_secs(5));
        assert_eq!(
            tracing::Level::from(conf.log.level),
            tracing::Level::DEBUG,
        );

        let purge = conf
            .service
            .into_config(conf.directory.domain)
            .unwrap()
            .purge_users;
        assert_eq!(purge.schedule.to_string(), "0 */15 * * * *");
        assert_eq!(purge.token, user::Token::new("test").unwrap());
        assert_eq!(purge.limits.max_pages, 2);
        assert_eq!(purge.limits.per_page, 100);
        assert_eq!(purge.pause, Duration::ZERO);
    }

    #[test]
    fn secret_is_not_debug_printed() {
        let conf = parse(
            r#"
            [directory]
            client_secret = "very-secret"
            "#,
        );

        assert!(!format!("{:?}", conf.directory).contains("very-secret"));
    }

    #[test]
    fn rejects_blank_token() {
        let conf = parse(
            r#"
            [service.tasks.purge_users]
            token = "  "
            "#,
        );

        assert!(matches!(
            conf.service.into_config("a.auth0.com"),
            Err(InvalidConfig::BlankToken),
        ));
    }

    #[test]
    fn rejects_invalid_schedule() {
        let conf = parse(
            r#"
            [service.tasks.purge_users]
            schedule = "every hour"
            "#,
        );

        assert!(matches!(
            conf.service.into_config("a.auth0.com"),
            Err(InvalidConfig::Schedule(_)),
        ));
    }
}
