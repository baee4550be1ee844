//! [Auth0 Management API] [`Directory`] implementation.
//!
//! [Auth0 Management API]: https://auth0.com/docs/api/management/v2

mod impls;

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use derive_more::{Debug, Display, Error as StdError, From};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracerr::Traced;
use tracing as log;
use url::Url;

use crate::{
    domain::{user, User},
    infra::directory,
};
#[cfg(doc)]
use crate::infra::Directory;

pub use url::ParseError;

/// Period before the actual expiration when an access token is considered
/// expired already.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// [`Auth0`] client configuration.
#[derive(Debug)]
pub struct Config {
    /// Domain of the Auth0 tenant (e.g. `example.eu.auth0.com`).
    pub domain: String,

    /// ID of the machine-to-machine application.
    pub client_id: String,

    /// Secret of the machine-to-machine application.
    pub client_secret: SecretString,

    /// Base URL to use instead of `https://{domain}/`.
    pub endpoint: Option<Url>,

    /// Timeout of a single HTTP request.
    pub timeout: Duration,
}

/// Auth0 Management API [`Directory`] client.
#[derive(Clone, Debug)]
pub struct Auth0 {
    /// HTTP client performing requests.
    http: reqwest::Client,

    /// Base URL overriding the one of the Auth0 tenant, if any.
    endpoint: Option<Url>,

    /// [`Credentials`] to obtain an [`AccessToken`] with.
    credentials: Arc<Credentials>,

    /// Cached [`AccessToken`], if any.
    token: Arc<RwLock<Option<AccessToken>>>,
}

impl Auth0 {
    /// Creates a new [`Auth0`] client with the provided [`Config`].
    ///
    /// No requests are performed and the domain is not checked until the
    /// client is used.
    ///
    /// # Errors
    ///
    /// If the HTTP client cannot be built.
    pub fn new(conf: Config) -> Result<Self, Traced<directory::Error>> {
        let Config {
            domain,
            client_id,
            client_secret,
            endpoint,
            timeout,
        } = conf;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        Ok(Self {
            http,
            endpoint,
            credentials: Arc::new(Credentials {
                domain,
                client_id,
                client_secret,
            }),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Returns the Auth0 tenant domain this client is configured for.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.credentials.domain
    }

    /// Builds a URL of the provided path `segments` relative to the
    /// endpoint, which defaults to `https://{domain}/`.
    fn url(&self, segments: &[&str]) -> Result<Url, Traced<Error>> {
        let mut url = match &self.endpoint {
            Some(url) => url.clone(),
            None => Url::parse(&format!("https://{}/", self.domain()))
                .map_err(tracerr::from_and_wrap!(=> Error))?,
        };
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                tracerr::new!(Error::InvalidEndpoint(
                    ParseError::RelativeUrlWithCannotBeABaseBase
                ))
            })?;
            _ = path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Returns a valid access token, requesting a new one if the cached one
    /// is missing or expired.
    async fn access_token(&self) -> Result<String, Traced<Error>> {
        if let Some(token) =
            self.token.read().await.as_ref().filter(|t| !t.is_expired())
        {
            return Ok(token.value.clone());
        }

        let mut token = self.token.write().await;
        if let Some(token) = token.as_ref().filter(|t| !t.is_expired()) {
            return Ok(token.value.clone());
        }

        let fresh = self.request_token().await.map_err(tracerr::wrap!())?;
        let value = fresh.value.clone();
        *token = Some(fresh);
        Ok(value)
    }

    /// Requests a new [`AccessToken`] via the client credentials grant.
    async fn request_token(&self) -> Result<AccessToken, Traced<Error>> {
        let Credentials {
            domain,
            client_id,
            client_secret,
        } = &*self.credentials;
        let audience = format!("https://{domain}/api/v2/");

        log::debug!("requesting Auth0 Management API access token");

        let response = self
            .http
            .post(self.url(&["oauth", "token"])?)
            .json(&TokenRequest {
                grant_type: "client_credentials",
                client_id,
                client_secret: client_secret.expose_secret(),
                audience: &audience,
            })
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        let TokenResponse {
            access_token,
            expires_in,
        } = ensure_success(response)
            .await
            .map_err(tracerr::wrap!())?
            .json()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        Ok(AccessToken {
            value: access_token,
            expires_at: Instant::now()
                + Duration::from_secs(expires_in)
                    .saturating_sub(TOKEN_EXPIRY_MARGIN),
        })
    }

    /// Sends an authorized request to the provided path `segments`, letting
    /// `build` adjust it, and checks the response to be successful.
    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response, Traced<Error>> {
        let token = self.access_token().await.map_err(tracerr::wrap!())?;
        let request = self
            .http
            .request(method, self.url(segments)?)
            .bearer_auth(token);

        let response = build(request)
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        ensure_success(response).await.map_err(tracerr::wrap!())
    }
}

/// Credentials of a machine-to-machine application.
#[derive(Debug)]
struct Credentials {
    /// Domain of the Auth0 tenant.
    domain: String,

    /// ID of the application.
    client_id: String,

    /// Secret of the application.
    client_secret: SecretString,
}

/// Management API access token.
#[derive(Debug)]
struct AccessToken {
    /// Bearer value of this [`AccessToken`].
    #[debug(skip)]
    value: String,

    /// Moment when this [`AccessToken`] should be refreshed.
    expires_at: Instant,
}

impl AccessToken {
    /// Indicates whether this [`AccessToken`] should be refreshed.
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// Body of a client credentials grant request.
#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
}

/// Body of a client credentials grant response.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

/// Body of an Auth0 error response.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,

    #[serde(default)]
    message: Option<String>,
}

/// Checks the provided [`Response`] to have a successful status, turning it
/// into an [`Error::Status`] otherwise.
async fn ensure_success(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| "no details".to_owned());
    Err(Error::Status { status, message })
}

/// [`User`] as represented by the Auth0 Management API.
#[derive(Deserialize)]
struct Auth0User {
    user_id: String,

    #[serde(default)]
    name: Option<String>,

    #[serde(default)]
    email: Option<String>,
}

impl TryFrom<Auth0User> for User {
    type Error = Error;

    fn try_from(value: Auth0User) -> Result<Self, Self::Error> {
        let Auth0User {
            user_id,
            name,
            email,
        } = value;
        let id = user::Id::from(user_id);

        let Some(name) = name else {
            return Err(Error::MalformedUser { id, field: "name" });
        };
        let Some(email) = email else {
            return Err(Error::MalformedUser { id, field: "email" });
        };

        Ok(User {
            id,
            name: name.into(),
            email: email.into(),
        })
    }
}

/// [`Auth0`] [`Directory`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// HTTP request failed to be performed or its response failed to be
    /// decoded.
    #[display("HTTP request failed: {_0}")]
    Request(reqwest::Error),

    /// Auth0 responded with an unsuccessful status.
    #[display("Auth0 responded with `{status}`: {message}")]
    #[from(ignore)]
    Status {
        /// HTTP status of the response.
        status: StatusCode,

        /// Error message reported by Auth0.
        message: String,
    },

    /// [`User`] record lacks a required field.
    #[display("`User(id: {id})` has no `{field}`")]
    #[from(ignore)]
    MalformedUser {
        /// ID of the malformed [`User`].
        id: user::Id,

        /// Name of the missing field.
        field: &'static str,
    },

    /// Endpoint URL is invalid.
    #[display("invalid endpoint URL: {_0}")]
    InvalidEndpoint(ParseError),
}
