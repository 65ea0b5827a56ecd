// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, Response, header};
use cashcard::application::CashCardService;
use cashcard::auth::{UserStore, basic_header};
use cashcard::domain::{CashCard, Principal, parse_cents};
use cashcard::http::{AppState, router};
use tempfile::TempDir;
use tower::ServiceExt;

pub const SARAH: (&str, &str) = ("sarah1", "abc123");
pub const KUMAR: (&str, &str) = ("kumar2", "xyz789");
pub const HANK: (&str, &str) = ("hank-owns-no-cards", "qrs456");

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(CashCardService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = CashCardService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Users mirroring the course fixtures: two card owners and one user without the role
pub fn test_users() -> UserStore {
    UserStore::from_entries(&[
        "sarah1:abc123:card-owner",
        "kumar2:xyz789:card-owner",
        "hank-owns-no-cards:qrs456:non-owner",
    ])
    .unwrap()
}

/// Helper to create the HTTP router over a fresh database
pub async fn test_app() -> Result<(Router, CashCardService, TempDir)> {
    let (service, temp_dir) = test_service().await?;
    let app = router(AppState::new(service.clone(), test_users()));
    Ok((app, service, temp_dir))
}

pub fn principal(user: (&str, &str)) -> Principal {
    Principal::card_owner(user.0)
}

pub fn cents(amount: &str) -> i64 {
    parse_cents(amount).unwrap()
}

/// Test fixture: standard card setup
pub struct StandardCards;

impl StandardCards {
    /// sarah1 owns 123.45, 1.00 and 150.00; kumar2 owns 200.00
    pub async fn create(service: &CashCardService) -> Result<Vec<CashCard>> {
        let mut cards = Vec::new();
        for (owner, amount) in [
            (SARAH, "123.45"),
            (SARAH, "1.00"),
            (SARAH, "150.00"),
            (KUMAR, "200.00"),
        ] {
            cards.push(
                service
                    .create_cash_card(Some(cents(amount)), &principal(owner))
                    .await?,
            );
        }
        Ok(cards)
    }
}

/// Build a request, optionally authenticated and with a JSON body
pub fn request(
    method: Method,
    uri: &str,
    user: Option<(&str, &str)>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some((name, password)) = user {
        builder = builder.header(header::AUTHORIZATION, basic_header(name, password));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
