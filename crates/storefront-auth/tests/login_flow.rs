//! Login and signup against a scripted backend.

use std::sync::Arc;

use serde_json::json;
use storefront_auth::prelude::*;
use storefront_auth::{PendingCart, SignupForm};
use storefront_commerce::cart::{CartFlow, HttpCartApi};
use storefront_commerce::ids::ProductId;
use storefront_events::{AppEvent, EventBus};
use storefront_fetch::mock::MockTransport;
use storefront_fetch::{FetchClient, Method};
use storefront_store::{keys, KeyValueStore, MemoryStore, TypedStore};

struct Harness {
    mock: Arc<MockTransport>,
    backend: Arc<MemoryStore>,
    events: EventBus,
    flow: AuthFlow,
}

fn harness() -> Harness {
    let mock = Arc::new(MockTransport::new());
    let backend = Arc::new(MemoryStore::new());
    let store = TypedStore::new(backend.clone());
    let events = EventBus::default();

    let sessions = SessionStore::new(store.clone());
    let client = FetchClient::with_transport(mock.clone())
        .with_base_url("http://api.test")
        .with_token_provider(Arc::new(sessions.clone()));
    let cart = Arc::new(CartFlow::new(
        Arc::new(HttpCartApi::new(client.clone())),
        events.clone(),
    ));
    let flow = AuthFlow::new(
        Arc::new(HttpAuthApi::new(client)),
        sessions,
        PendingCart::new(store),
        cart,
        events.clone(),
    );

    Harness {
        mock,
        backend,
        events,
        flow,
    }
}

fn login_ok(mock: &MockTransport, role: &str) {
    mock.respond(
        Method::Post,
        "/auth/login",
        200,
        json!({
            "success": true,
            "token": "jwt-123",
            "data": {"userId": "u1", "username": "ann", "email": "ann@shop.io", "role": role}
        }),
    );
}

#[tokio::test]
async fn test_invalid_form_makes_no_request() {
    let h = harness();
    let err = h
        .flow
        .login(&LoginForm::new("foo@bar", "123"), None)
        .await
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(err.field_errors().unwrap().len(), 2);
    assert!(h.mock.requests().is_empty());
}

#[tokio::test]
async fn test_login_persists_session_and_announces() {
    let h = harness();
    login_ok(&h.mock, "admin");
    let mut rx = h.events.subscribe();

    let outcome = h
        .flow
        .login(&LoginForm::new(" ann@shop.io ", "secret1"), Some("/cart"))
        .await
        .unwrap();

    assert_eq!(outcome.redirect, "/admin");
    assert_eq!(outcome.user.role, Role::Admin);
    assert!(outcome.replayed.is_none());

    assert_eq!(h.backend.get(keys::AUTH_TOKEN).unwrap().as_deref(), Some("jwt-123"));
    assert_eq!(h.backend.get(keys::IS_LOGGED_IN).unwrap().as_deref(), Some("true"));
    assert_eq!(h.flow.current_user().unwrap().username, "ann");

    let sent = h.mock.last(Method::Post, "/auth/login").unwrap();
    assert_eq!(sent.body_json().unwrap()["email"], "ann@shop.io");

    match rx.recv().await.unwrap() {
        AppEvent::UserLoggedIn(notice) => {
            assert_eq!(notice.user_id, "u1");
            assert_eq!(notice.role, "admin");
        }
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_pending_item_replayed_with_session_token() {
    let h = harness();
    login_ok(&h.mock, "user");
    h.mock.respond(Method::Post, "/cart/add", 200, json!({"success": true}));
    h.backend
        .set(keys::PENDING_CART_ITEM, r#"{"productId":"42","quantity":2}"#)
        .unwrap();

    let outcome = h
        .flow
        .login(&LoginForm::new("ann@shop.io", "secret1"), Some("/product/42"))
        .await
        .unwrap();

    assert_eq!(outcome.redirect, "/product/42");
    let report = outcome.replayed.unwrap();
    assert_eq!((report.added, report.requested), (2, 2));
    assert_eq!(h.mock.count(Method::Post, "/cart/add"), 2);

    let add = h.mock.last(Method::Post, "/cart/add").unwrap();
    assert_eq!(add.header_value("authorization"), Some("Bearer jwt-123"));
    assert_eq!(add.body_json().unwrap()["userId"], "u1");
    assert!(h.backend.get(keys::PENDING_CART_ITEM).unwrap().is_none());
}

#[tokio::test]
async fn test_stored_quantity_is_capped_on_replay() {
    let h = harness();
    login_ok(&h.mock, "user");
    h.mock.respond(Method::Post, "/cart/add", 200, json!({"success": true}));
    h.backend
        .set(keys::PENDING_CART_ITEM, r#"{"productId":"42","quantity":500}"#)
        .unwrap();

    let outcome = h
        .flow
        .login(&LoginForm::new("ann@shop.io", "secret1"), None)
        .await
        .unwrap();

    let report = outcome.replayed.unwrap();
    assert_eq!((report.added, report.requested), (10, 10));
    assert_eq!(h.mock.count(Method::Post, "/cart/add"), 10);
}

#[tokio::test]
async fn test_failed_replay_does_not_fail_login() {
    let h = harness();
    login_ok(&h.mock, "seller");
    h.mock.respond(
        Method::Post,
        "/cart/add",
        200,
        json!({"success": false, "message": "Out of stock"}),
    );
    h.backend.set(keys::PENDING_CART_ITEM, "42").unwrap();

    let outcome = h
        .flow
        .login(&LoginForm::new("ann@shop.io", "secret1"), None)
        .await
        .unwrap();

    assert_eq!(outcome.redirect, "/seller/dashboard");
    assert!(outcome.replayed.is_none());
    assert!(h.flow.session().is_logged_in());
    assert!(h.backend.get(keys::PENDING_CART_ITEM).unwrap().is_none());
}

#[tokio::test]
async fn test_rejected_login_keeps_logged_out() {
    let h = harness();
    h.mock.respond(
        Method::Post,
        "/auth/login",
        400,
        json!({"success": false, "message": "Invalid credentials"}),
    );

    let err = h
        .flow
        .login(&LoginForm::new("ann@shop.io", "wrongpw"), None)
        .await
        .unwrap_err();

    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(h.flow.current_user().is_none());
}

#[tokio::test]
async fn test_signup_then_logout() {
    let h = harness();
    h.mock.respond(
        Method::Post,
        "/auth/signup",
        201,
        json!({"success": true, "token": "new", "data": {"userId": "u5", "username": "bob", "role": "user"}}),
    );
    let form = SignupForm::new(" bob ", "bob@shop.io", "secret1")
        .with_confirmation("secret1")
        .with_terms_accepted(true);

    let outcome = h.flow.signup(&form, None).await.unwrap();
    assert_eq!(outcome.redirect, "/");
    let sent = h.mock.last(Method::Post, "/auth/signup").unwrap();
    assert_eq!(
        sent.body_json().unwrap(),
        json!({"username": "bob", "email": "bob@shop.io", "password": "secret1"})
    );

    let mut rx = h.events.subscribe();
    h.flow.logout();
    assert!(!h.flow.session().is_logged_in());
    assert!(h.backend.keys().unwrap().is_empty());
    assert_eq!(rx.recv().await.unwrap(), AppEvent::UserLoggedOut);
}

#[tokio::test]
async fn test_stashed_item_round_trips_through_store() {
    let h = harness();
    let pending = PendingCart::new(TypedStore::new(h.backend.clone()));
    pending
        .stash(&PendingCartItem::new(ProductId::new("9"), 1))
        .unwrap();
    assert_eq!(pending.take().unwrap().product_id, ProductId::new("9"));
}
