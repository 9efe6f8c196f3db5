//! REST client for the marketplace backend's user, message, listing and auth
//! endpoints.
//!
//! Every request carries `Authorization: Bearer <token>` when a session is
//! stored. A 403 always maps to [`ApiError::Forbidden`]; other failures carry
//! the server's text where the endpoint provides one, else a fixed message.

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::common::{Message, Post};
use crate::error::ApiError;
use crate::storage::AuthSession;

/// The three calls the messaging view depends on.
#[async_trait]
pub trait MessagingApi: Send + Sync {
    async fn check_user_exists(&self, username: &str) -> Result<bool, ApiError>;

    /// Full history between two users, in the order the server returns it.
    async fn messages_between(&self, user_a: &str, user_b: &str)
    -> Result<Vec<Message>, ApiError>;

    /// The server assigns `id` and `timestamp` of the returned message.
    async fn send_message(&self, from: &str, to: &str, content: &str)
    -> Result<Message, ApiError>;
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub college: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: watch::Receiver<Option<AuthSession>>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: watch::Receiver<Option<AuthSession>>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Exchange credentials for a session via `POST /auth/login`.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthSession, ApiError> {
        let url = self.endpoint(&["auth", "login"])?;
        let response = self
            .client
            .post(url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;
        let response = check_status(response, "Failed to sign in", true).await?;
        let body: TokenResponse = response.json().await?;
        Ok(AuthSession {
            username: username.to_string(),
            token: body.token,
        })
    }

    /// Create an account via `POST /auth/register` and return its session.
    pub async fn register(&self, registration: &Registration) -> Result<AuthSession, ApiError> {
        let url = self.endpoint(&["auth", "register"])?;
        let response = self.client.post(url).json(registration).send().await?;
        let response = check_status(response, "Failed to register", true).await?;
        let body: TokenResponse = response.json().await?;
        Ok(AuthSession {
            username: registration.username.clone(),
            token: body.token,
        })
    }

    /// Every listing, as `GET /posts` returns them.
    pub async fn posts(&self) -> Result<Vec<Post>, ApiError> {
        let url = self.endpoint(&["posts"])?;
        let response = self.authorized(self.client.get(url)).send().await?;
        let response = check_status(response, "Failed to fetch posts", false).await?;
        Ok(response.json().await?)
    }

    /// One listing via `GET /posts/{id}`; `None` when the server answers 404.
    pub async fn post(&self, id: i64) -> Result<Option<Post>, ApiError> {
        let id = id.to_string();
        let url = self.endpoint(&["posts", id.as_str()])?;
        let response = self.authorized(self.client.get(url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = check_status(response, "Failed to fetch post", false).await?;
        Ok(Some(response.json().await?))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.borrow().as_ref() {
            Some(session) => builder.bearer_auth(&session.token),
            None => builder,
        }
    }
}

#[async_trait]
impl MessagingApi for ApiClient {
    async fn check_user_exists(&self, username: &str) -> Result<bool, ApiError> {
        let url = self.endpoint(&["users", "exists", username])?;
        let response = self.authorized(self.client.get(url)).send().await?;
        let response = check_status(response, "Failed to check user existence", false).await?;
        Ok(response.json().await?)
    }

    async fn messages_between(
        &self,
        user_a: &str,
        user_b: &str,
    ) -> Result<Vec<Message>, ApiError> {
        let url = self.endpoint(&["messages", "between"])?;
        let request = self
            .client
            .get(url)
            .query(&[("username1", user_a), ("username2", user_b)]);
        let response = self.authorized(request).send().await?;
        let response = check_status(response, "Failed to fetch messages", false).await?;
        Ok(response.json().await?)
    }

    async fn send_message(&self, from: &str, to: &str, content: &str) -> Result<Message, ApiError> {
        let url = self.endpoint(&["messages", "send"])?;
        let request = self
            .client
            .post(url)
            .query(&[("fromUsername", from), ("toUsername", to)])
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(content.to_string());
        let response = self.authorized(request).send().await?;
        let response = check_status(response, "Failed to send message", true).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(
    response: Response,
    fallback: &str,
    use_server_text: bool,
) -> Result<Response, ApiError> {
    let status = response.status();
    if status == StatusCode::FORBIDDEN {
        return Err(ApiError::Forbidden);
    }
    if status.is_success() {
        return Ok(response);
    }

    let body = if use_server_text {
        response.text().await.unwrap_or_default()
    } else {
        String::new()
    };
    let message = if body.trim().is_empty() {
        fallback.to_string()
    } else {
        body
    };
    log::debug!("Request failed with {status}: {message}");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}
