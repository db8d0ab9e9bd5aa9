//! Authentication for the storefront client.
//!
//! Provides form validation, the login/signup flow, session persistence and
//! the pending cart item replayed after login.

mod api;
mod error;
mod flow;
mod pending;
mod session;
mod user;
pub mod validation;

pub use api::{AuthApi, AuthSuccess, HttpAuthApi, LoginRequest, SignupRequest};
pub use error::AuthError;
pub use flow::{AuthFlow, AuthOutcome, RedirectPolicy};
pub use pending::{PendingCart, PendingCartItem};
pub use session::{Session, SessionStore};
pub use user::{Role, UserRecord};
pub use validation::{FieldErrors, LoginForm, SignupForm};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AuthError, AuthFlow, AuthOutcome, HttpAuthApi, LoginForm, PendingCartItem, Role,
        SessionStore, SignupForm, UserRecord,
    };
}
