//! Arbilo REST API client.

use super::converter;
use super::models::*;
use crate::auth::{RecordId, UserProfile};
use crate::config::ApiConfig;
use crate::dashboard::ArbitrageSource;
use crate::error::{Error, Result};
use crate::state::{ArbiPairRow, ArbiTrackRow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

/// Builder for creating an API client.
pub struct ApiClientBuilder {
    config: ApiConfig,
}

impl ApiClientBuilder {
    /// Create a new builder with default config.
    pub fn new() -> Self {
        Self {
            config: ApiConfig::default(),
        }
    }

    /// Set the API configuration.
    pub fn config(mut self, config: ApiConfig) -> Self {
        self.config = config;
        self
    }

    /// Point the client at an explicit base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Build the API client.
    pub fn build(self) -> Result<ApiClient> {
        ApiClient::new(&self.config)
    }
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// HTTP client for every endpoint the terminal uses.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("arbilo/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[inline]
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a response to an error unless it succeeded.
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized);
        }

        let text = response.text().await.unwrap_or_default();
        Err(Error::status(status.as_u16(), error_message(status, &text)))
    }

    async fn send_value(&self, request: RequestBuilder) -> Result<Value> {
        let response = Self::check(request.send().await?).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let value = self.send_value(request).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T> {
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }

    // --- Dashboard ---

    /// `GET /api/arbitrage`.
    pub async fn fetch_pairs(&self, token: &str) -> Result<Vec<ArbiPairRow>> {
        debug!("GET /api/arbitrage");
        let value = self
            .send_value(self.http.get(self.url("/api/arbitrage")).bearer_auth(token))
            .await?;
        Ok(converter::parse_pairs(value))
    }

    /// `GET /api/arbitrage/arbitrack`.
    pub async fn fetch_track(&self, token: &str) -> Result<Vec<ArbiTrackRow>> {
        debug!("GET /api/arbitrage/arbitrack");
        let value = self
            .send_value(
                self.http
                    .get(self.url("/api/arbitrage/arbitrack"))
                    .bearer_auth(token),
            )
            .await?;
        Ok(converter::parse_track(value))
    }

    // --- Auth ---

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/api/auth/login", None, &body).await
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<ApiMessage> {
        self.post("/api/auth/signup", None, request).await
    }

    pub async fn forgot_password(&self, email: &str) -> Result<ApiMessage> {
        let body = ForgotPasswordRequest {
            email: email.to_string(),
        };
        self.post("/api/auth/forgot-password", None, &body).await
    }

    pub async fn reset_password(&self, reset_token: &str, new_password: &str) -> Result<ApiMessage> {
        let body = ResetPasswordRequest {
            token: reset_token.to_string(),
            new_password: new_password.to_string(),
        };
        self.post("/api/auth/reset-password", None, &body).await
    }

    pub async fn change_password(
        &self,
        token: &str,
        request: &ChangePasswordRequest,
    ) -> Result<ApiMessage> {
        self.post("/api/auth/change-password", Some(token), request)
            .await
    }

    pub async fn update_name(&self, token: &str, name: &str) -> Result<ApiMessage> {
        let body = UpdateNameRequest {
            name: name.to_string(),
        };
        self.post("/api/auth/update-name", Some(token), &body).await
    }

    // --- Blog ---

    pub async fn list_blogs(&self) -> Result<Vec<BlogPost>> {
        let value = self.send_value(self.http.get(self.url("/api/blogs"))).await?;
        Ok(converter::parse_list(value, &["blogs", "results", "data"]))
    }

    pub async fn get_blog(&self, id: &RecordId) -> Result<BlogPost> {
        self.send(self.http.get(self.url(&format!("/api/blogs/{}", id))))
            .await
    }

    pub async fn create_blog(&self, admin_token: &str, post: &BlogInput) -> Result<BlogPost> {
        self.post("/api/blogs", Some(admin_token), post).await
    }

    pub async fn update_blog(
        &self,
        admin_token: &str,
        id: &RecordId,
        post: &BlogInput,
    ) -> Result<BlogPost> {
        let request = self
            .http
            .put(self.url(&format!("/api/blogs/{}", id)))
            .bearer_auth(admin_token)
            .json(post);
        self.send(request).await
    }

    pub async fn delete_blog(&self, admin_token: &str, id: &RecordId) -> Result<()> {
        let request = self
            .http
            .delete(self.url(&format!("/api/blogs/{}", id)))
            .bearer_auth(admin_token);
        self.send_value(request).await.map(|_| ())
    }

    pub async fn like_blog(&self, id: &RecordId) -> Result<ApiMessage> {
        self.post(&format!("/api/blogs/{}/like", id), None, &Value::Null)
            .await
    }

    pub async fn share_blog(&self, id: &RecordId) -> Result<ApiMessage> {
        self.post(&format!("/api/blogs/{}/share", id), None, &Value::Null)
            .await
    }

    pub async fn comment_blog(&self, id: &RecordId, comment: &BlogComment) -> Result<ApiMessage> {
        self.post(&format!("/api/blogs/{}/comment", id), None, comment)
            .await
    }

    pub async fn blog_comments(&self, id: &RecordId) -> Result<Vec<BlogComment>> {
        let value = self
            .send_value(self.http.get(self.url(&format!("/api/blogs/{}/comments", id))))
            .await?;
        Ok(converter::parse_list(value, &["comments", "results", "data"]))
    }

    // --- Admin ---

    /// `GET /api/admin/users`.
    pub async fn list_users(&self, admin_token: &str) -> Result<Vec<UserProfile>> {
        let value = self
            .send_value(
                self.http
                    .get(self.url("/api/admin/users"))
                    .bearer_auth(admin_token),
            )
            .await?;
        Ok(converter::parse_list(value, &["users", "results", "data"]))
    }

    /// `PUT /api/admin/users/:id/toggle-active`.
    pub async fn toggle_user_active(&self, admin_token: &str, id: &RecordId) -> Result<ApiMessage> {
        let request = self
            .http
            .put(self.url(&format!("/api/admin/users/{}/toggle-active", id)))
            .bearer_auth(admin_token);
        self.send(request).await
    }

    pub async fn update_subscription(
        &self,
        admin_token: &str,
        update: &SubscriptionUpdate,
    ) -> Result<ApiMessage> {
        self.post("/api/admin/update-subscription", Some(admin_token), update)
            .await
    }

    // --- Newsletter ---

    pub async fn subscribe_newsletter(&self, email: &str) -> Result<ApiMessage> {
        let body = NewsletterEmail {
            email: email.to_string(),
        };
        self.post("/api/newsletter/subscribe", None, &body).await
    }

    pub async fn unsubscribe_newsletter(&self, email: &str) -> Result<ApiMessage> {
        let body = NewsletterEmail {
            email: email.to_string(),
        };
        self.post("/api/newsletter/unsubscribe", None, &body).await
    }

    pub async fn list_subscribers(&self, admin_token: &str) -> Result<Vec<Subscriber>> {
        let value = self
            .send_value(
                self.http
                    .get(self.url("/api/newsletter/subscribers"))
                    .bearer_auth(admin_token),
            )
            .await?;
        Ok(converter::parse_list(
            value,
            &["subscribers", "results", "data"],
        ))
    }

    pub async fn toggle_subscriber(&self, admin_token: &str, id: &RecordId) -> Result<ApiMessage> {
        let request = self
            .http
            .patch(self.url(&format!("/api/newsletter/subscribers/{}/toggle", id)))
            .bearer_auth(admin_token);
        self.send(request).await
    }

    pub async fn send_newsletter(
        &self,
        admin_token: &str,
        issue: &NewsletterIssue,
    ) -> Result<ApiMessage> {
        self.post("/api/newsletter/send", Some(admin_token), issue)
            .await
    }

    /// Upload an image for use in a newsletter, as `multipart/form-data`.
    pub async fn upload_newsletter_image(
        &self,
        admin_token: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedImage> {
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);
        let request = self
            .http
            .post(self.url("/api/newsletter/upload-image"))
            .bearer_auth(admin_token)
            .multipart(form);
        self.send(request).await
    }
}

#[async_trait]
impl ArbitrageSource for ApiClient {
    async fn fetch_pairs(&self, token: &str) -> Result<Vec<ArbiPairRow>> {
        ApiClient::fetch_pairs(self, token).await
    }

    async fn fetch_track(&self, token: &str) -> Result<Vec<ArbiTrackRow>> {
        ApiClient::fetch_track(self, token).await
    }
}

/// Human-readable message from an error body.
fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body)
        && let Some(message) = ["message", "error"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
    {
        return message.to_string();
    }

    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        body.chars().take(200).collect()
    }
}
