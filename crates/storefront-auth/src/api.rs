//! Auth API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use storefront_commerce::ids::UserId;
use storefront_fetch::{encode_component, FetchClient};

use crate::error::AuthError;
use crate::user::UserRecord;

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Token and user from a successful login or signup.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthSuccess {
    pub token: String,
    pub user: UserRecord,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    data: Option<UserRecord>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Availability {
    available: bool,
}

/// Backend auth endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthSuccess, AuthError>;

    async fn signup(&self, request: &SignupRequest) -> Result<AuthSuccess, AuthError>;

    async fn profile(&self, user_id: &UserId) -> Result<UserRecord, AuthError>;

    /// Whether no account uses `email` yet.
    async fn check_email(&self, email: &str) -> Result<bool, AuthError>;

    /// Whether `username` is free.
    async fn check_username(&self, username: &str) -> Result<bool, AuthError>;
}

/// [`AuthApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAuthApi {
    client: FetchClient,
}

impl HttpAuthApi {
    pub fn new(client: FetchClient) -> Self {
        Self { client }
    }

    /// Post credentials and read the token out of the reply.
    ///
    /// Error statuses usually carry `{success: false, message}`; that message
    /// is what the shopper sees.
    async fn exchange<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<AuthSuccess, AuthError> {
        let response = self.client.post(path).json(body)?.send().await?;
        let ok_status = response.is_success();

        match response.json::<AuthResponse>() {
            Ok(reply) if reply.success.unwrap_or(ok_status) && ok_status => {
                let token = reply
                    .token
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| AuthError::InvalidResponse("missing token".to_string()))?;
                let user = reply
                    .data
                    .ok_or_else(|| AuthError::InvalidResponse("missing user".to_string()))?;
                Ok(AuthSuccess { token, user })
            }
            Ok(reply) => Err(AuthError::Rejected(reply.message.unwrap_or_else(|| {
                format!("Request failed with status {}", response.status)
            }))),
            Err(e) => match response.error_for_status() {
                Err(http) => Err(http.into()),
                Ok(_) => Err(e.into()),
            },
        }
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, request: &LoginRequest) -> Result<AuthSuccess, AuthError> {
        self.exchange("/auth/login", request).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthSuccess, AuthError> {
        self.exchange("/auth/signup", request).await
    }

    async fn profile(&self, user_id: &UserId) -> Result<UserRecord, AuthError> {
        let url = format!("/auth/profile/{}", encode_component(user_id.as_str()));
        let reply: AuthResponse = self.client.get(url).send_json().await?;
        if reply.success == Some(false) {
            return Err(AuthError::Rejected(
                reply.message.unwrap_or_else(|| "Could not load profile".to_string()),
            ));
        }
        reply
            .data
            .ok_or_else(|| AuthError::InvalidResponse("missing user".to_string()))
    }

    async fn check_email(&self, email: &str) -> Result<bool, AuthError> {
        let url = format!("/auth/check-email/{}", encode_component(email.trim()));
        let reply: Availability = self.client.get(url).send_json().await?;
        Ok(reply.available)
    }

    async fn check_username(&self, username: &str) -> Result<bool, AuthError> {
        let url = format!("/auth/check-username/{}", encode_component(username.trim()));
        let reply: Availability = self.client.get(url).send_json().await?;
        Ok(reply.available)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use storefront_fetch::mock::MockTransport;
    use storefront_fetch::Method;

    fn api(mock: &Arc<MockTransport>) -> HttpAuthApi {
        HttpAuthApi::new(FetchClient::with_transport(mock.clone()).with_base_url("http://api.test"))
    }

    fn login() -> LoginRequest {
        LoginRequest {
            email: "ann@shop.io".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Post,
            "/auth/login",
            200,
            json!({"success": true, "token": "jwt", "data": {"userId": "u1", "username": "ann", "role": "admin"}}),
        );

        let success = api(&mock).login(&login()).await.unwrap();
        assert_eq!(success.token, "jwt");
        assert_eq!(success.user.username, "ann");
    }

    #[tokio::test]
    async fn test_error_status_surfaces_server_message() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(
            Method::Post,
            "/auth/login",
            401,
            json!({"success": false, "message": "Invalid email or password"}),
        );

        let err = api(&mock).login(&login()).await.unwrap_err();
        assert!(err.is_auth_failure());
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[tokio::test]
    async fn test_success_without_token_is_invalid() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Post, "/auth/signup", 200, json!({"success": true}));

        let request = SignupRequest {
            username: "ann".to_string(),
            email: "ann@shop.io".to_string(),
            password: "secret1".to_string(),
        };
        let err = api(&mock).signup(&request).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_availability_checks_encode_path() {
        let mock = Arc::new(MockTransport::new());
        mock.respond(Method::Get, "/auth/check-email/ann%40shop.io", 200, json!({"available": false}));
        mock.respond(Method::Get, "/auth/check-username/ann", 200, json!({"available": true}));

        let api = api(&mock);
        assert!(!api.check_email("ann@shop.io").await.unwrap());
        assert!(api.check_username(" ann ").await.unwrap());
    }
}
