//! Login, signup and logout.

use std::collections::BTreeMap;
use std::sync::Arc;

use storefront_commerce::cart::{AddToCartReport, CartFlow};
use storefront_commerce::ids::UserId;
use storefront_events::{AppEvent, EventBus, LoginNotice};

use crate::api::{AuthApi, AuthSuccess, LoginRequest, SignupRequest};
use crate::error::AuthError;
use crate::pending::PendingCart;
use crate::session::SessionStore;
use crate::user::{Role, UserRecord};
use crate::validation::{LoginForm, SignupForm};

/// Where to send a user after authenticating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectPolicy {
    role_redirects: BTreeMap<String, String>,
    default_redirect: String,
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        let mut role_redirects = BTreeMap::new();
        role_redirects.insert(Role::Admin.as_str().to_string(), "/admin".to_string());
        role_redirects.insert(Role::Seller.as_str().to_string(), "/seller/dashboard".to_string());
        Self {
            role_redirects,
            default_redirect: "/".to_string(),
        }
    }
}

impl RedirectPolicy {
    /// Build a policy from a role name to path map.
    pub fn new(role_redirects: BTreeMap<String, String>, default_redirect: impl Into<String>) -> Self {
        Self {
            role_redirects,
            default_redirect: default_redirect.into(),
        }
    }

    /// Role destination first, then the page the user came from, then the
    /// default. Only same-site paths are honoured for `return_to`.
    pub fn resolve(&self, role: Role, return_to: Option<&str>) -> String {
        if let Some(path) = self.role_redirects.get(role.as_str()) {
            return path.clone();
        }
        match return_to.map(str::trim) {
            Some(path) if path.starts_with('/') && !path.starts_with("//") => path.to_string(),
            _ => self.default_redirect.clone(),
        }
    }
}

/// Result of a successful login or signup.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthOutcome {
    pub user: UserRecord,
    pub redirect: String,
    /// Report for the pending cart item, when one was replayed successfully.
    pub replayed: Option<AddToCartReport>,
}

/// Drives the auth forms.
pub struct AuthFlow {
    api: Arc<dyn AuthApi>,
    session: SessionStore,
    pending: PendingCart,
    cart: Arc<CartFlow>,
    events: EventBus,
    redirects: RedirectPolicy,
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow")
            .field("redirects", &self.redirects)
            .finish_non_exhaustive()
    }
}

impl AuthFlow {
    pub fn new(
        api: Arc<dyn AuthApi>,
        session: SessionStore,
        pending: PendingCart,
        cart: Arc<CartFlow>,
        events: EventBus,
    ) -> Self {
        Self {
            api,
            session,
            pending,
            cart,
            events,
            redirects: RedirectPolicy::default(),
        }
    }

    pub fn with_redirects(mut self, redirects: RedirectPolicy) -> Self {
        self.redirects = redirects;
        self
    }

    /// Session persistence used by this flow.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// The stored user, if logged in.
    pub fn current_user(&self) -> Option<UserRecord> {
        self.session.session().map(|s| s.user)
    }

    /// Validate, log in and finish the session.
    pub async fn login(&self, form: &LoginForm, return_to: Option<&str>) -> Result<AuthOutcome, AuthError> {
        form.validate()?;
        let request = LoginRequest {
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };
        let success = self.report(self.api.login(&request).await)?;
        let greeting = format!("Welcome back, {}!", success.user.username);
        Ok(self.complete(success, &greeting, return_to).await)
    }

    /// Validate, create the account and finish the session.
    pub async fn signup(&self, form: &SignupForm, return_to: Option<&str>) -> Result<AuthOutcome, AuthError> {
        form.validate()?;
        let request = SignupRequest {
            username: form.username.trim().to_string(),
            email: form.email.trim().to_string(),
            password: form.password.clone(),
        };
        let success = self.report(self.api.signup(&request).await)?;
        let greeting = format!("Account created! Welcome, {}!", success.user.username);
        Ok(self.complete(success, &greeting, return_to).await)
    }

    /// Clear the session and tell the rest of the app.
    pub fn logout(&self) {
        self.session.clear();
        self.events.publish(AppEvent::UserLoggedOut);
        self.events.info("You have been logged out");
        tracing::info!("logged out");
    }

    pub async fn check_email_available(&self, email: &str) -> Result<bool, AuthError> {
        self.api.check_email(email).await
    }

    pub async fn check_username_available(&self, username: &str) -> Result<bool, AuthError> {
        self.api.check_username(username).await
    }

    /// Fetch a user's profile.
    pub async fn profile(&self, user_id: &UserId) -> Result<UserRecord, AuthError> {
        self.api.profile(user_id).await
    }

    fn report(&self, result: Result<AuthSuccess, AuthError>) -> Result<AuthSuccess, AuthError> {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "authentication failed");
            self.events.error(e.user_message());
        }
        result
    }

    async fn complete(&self, success: AuthSuccess, greeting: &str, return_to: Option<&str>) -> AuthOutcome {
        let AuthSuccess { token, user } = success;

        if let Err(e) = self.session.save(&token, &user) {
            tracing::warn!(error = %e, "failed to persist session");
        }
        tracing::info!(user_id = %user.user_id, role = %user.role, "authenticated");

        self.events.publish(AppEvent::UserLoggedIn(LoginNotice {
            user_id: user.user_id.to_string(),
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
        }));
        self.events.success(greeting);

        let replayed = self.replay_pending(&user).await;
        let redirect = self.redirects.resolve(user.role, return_to);

        AuthOutcome {
            user,
            redirect,
            replayed,
        }
    }

    /// Add the item stashed before login. Failures never fail the login.
    async fn replay_pending(&self, user: &UserRecord) -> Option<AddToCartReport> {
        let item = self.pending.take()?;
        let max = self.cart.default_max_quantity();
        let quantity = item.quantity.clamp(1, max);
        if quantity != item.quantity {
            tracing::warn!(product_id = %item.product_id, stored = item.quantity, max, "pending quantity out of range, clamped");
        }
        tracing::debug!(product_id = %item.product_id, quantity, "replaying pending cart item");
        match self
            .cart
            .add_units(&item.product_id, item.size.as_deref(), quantity, Some(&user.user_id))
            .await
        {
            Ok(report) => Some(report),
            Err(e) => {
                tracing::warn!(product_id = %item.product_id, error = %e, "pending cart item not added");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_redirects() {
        let policy = RedirectPolicy::default();
        assert_eq!(policy.resolve(Role::Admin, Some("/cart")), "/admin");
        assert_eq!(policy.resolve(Role::Seller, None), "/seller/dashboard");
        assert_eq!(policy.resolve(Role::Customer, Some("/product/12")), "/product/12");
        assert_eq!(policy.resolve(Role::Customer, None), "/");
    }

    #[test]
    fn test_offsite_return_is_ignored() {
        let policy = RedirectPolicy::default();
        assert_eq!(policy.resolve(Role::Customer, Some("https://evil.test")), "/");
        assert_eq!(policy.resolve(Role::Customer, Some("//evil.test")), "/");
    }

    #[test]
    fn test_custom_policy() {
        let mut map = BTreeMap::new();
        map.insert("admin".to_string(), "/backoffice".to_string());
        let policy = RedirectPolicy::new(map, "/home");
        assert_eq!(policy.resolve(Role::Admin, None), "/backoffice");
        assert_eq!(policy.resolve(Role::Seller, None), "/home");
    }
}
