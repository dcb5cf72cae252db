use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use chrono::Duration;
use serde_json::Value;
use tower::ServiceExt;

use atelier_api::{
    auth::{AuthService, CurrentUser, Role},
    config::AppConfig,
    handlers,
    services::{OrderLifecycleService, Permissive, TransitionPolicy},
    store::{InMemoryOrderStore, OrderStore},
    AppState,
};

/// Test harness: full router over a fresh in-memory store, no event loop.
pub struct TestApp {
    router: Router,
    token: String,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(Arc::new(Permissive))
    }

    pub fn with_policy(policy: Arc<dyn TransitionPolicy>) -> Self {
        let cfg = AppConfig::default();
        let store: Arc<dyn OrderStore> = Arc::new(InMemoryOrderStore::new());
        let orders = OrderLifecycleService::new(store.clone(), None, policy);
        let auth = Arc::new(AuthService::new(&cfg.jwt_secret));

        let token = auth
            .issue_token(
                &CurrentUser {
                    id: "staff-1".into(),
                    email: "staff@atelier.test".into(),
                    role: Role::Admin,
                },
                Duration::hours(1),
            )
            .expect("issue test token");

        let state = AppState {
            orders,
            store,
            auth,
            config: cfg,
        };

        Self {
            router: handlers::router(state),
            token,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        self.send(method, uri, body, false).await
    }

    pub async fn request_authenticated(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> Response<Body> {
        self.send(method, uri, body, true).await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        authenticated: bool,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if authenticated {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("build request");

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("route request")
    }
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("parse response body")
}
