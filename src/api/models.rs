//! Request and response bodies for the Arbilo REST API.

use crate::auth::{RecordId, UserProfile};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Credentials for `/api/auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: UserProfile,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateNameRequest {
    pub name: String,
}

/// Generic acknowledgement returned by mutating endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiMessage {
    pub message: Option<String>,
    pub user: Option<UserProfile>,
}

/// A blog post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogPost {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub image_url: Option<String>,
    pub likes: u64,
    pub shares: u64,
    pub created_at: Option<DateTime<Utc>>,
}

/// Fields an admin sends to create or update a post.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogInput {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// A reader comment on a post.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlogComment {
    pub name: String,
    #[serde(alias = "content")]
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Subscription change for a user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionUpdate {
    pub user_id: RecordId,
    pub subscription_status: String,
}

/// A newsletter subscriber.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Subscriber {
    #[serde(alias = "_id")]
    pub id: RecordId,
    pub email: String,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsletterEmail {
    pub email: String,
}

/// A newsletter issue to send.
#[derive(Debug, Clone, Serialize)]
pub struct NewsletterIssue {
    pub subject: String,
    pub content: String,
}

/// Where an uploaded image can be referenced from.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    #[serde(alias = "imageUrl")]
    pub url: String,
}
