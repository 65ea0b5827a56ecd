use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{StatusCode, header::LOCATION},
    response::IntoResponse,
};
use serde::Deserialize;

use crate::application::AppError;
use crate::domain::{CashCard, CashCardId, Cents, cents_from_decimal};

use super::{AppState, CardOwner, query::page_request_from_params};

/// Body of create and update requests.
///
/// Only `amount` is read; an `id` or `owner` sent by the client is ignored.
#[derive(Debug, Deserialize)]
pub struct CashCardRequest {
    #[serde(default)]
    pub amount: Option<f64>,
}

impl CashCardRequest {
    fn amount_cents(&self) -> Result<Option<Cents>, AppError> {
        self.amount
            .map(cents_from_decimal)
            .transpose()
            .map_err(|e| AppError::InvalidAmount(e.to_string()))
    }
}

fn parse_body(
    payload: Result<Json<CashCardRequest>, JsonRejection>,
) -> Result<CashCardRequest, AppError> {
    payload
        .map(|Json(request)| request)
        .map_err(|rejection| AppError::MalformedPayload(rejection.body_text()))
}

fn parse_id(path: Result<Path<CashCardId>, PathRejection>) -> Result<CashCardId, AppError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| AppError::MalformedPayload(rejection.body_text()))
}

pub fn location_of(id: CashCardId) -> String {
    format!("/cashcards/{id}")
}

pub async fn find_by_id(
    State(state): State<Arc<AppState>>,
    CardOwner(principal): CardOwner,
    path: Result<Path<CashCardId>, PathRejection>,
) -> Result<Json<CashCard>, AppError> {
    let id = parse_id(path)?;
    let card = state.service.get_cash_card(id, &principal).await?;
    Ok(Json(card))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    CardOwner(principal): CardOwner,
    payload: Result<Json<CashCardRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let amount = parse_body(payload)?.amount_cents()?;
    let card = state.service.create_cash_card(amount, &principal).await?;

    let id = card
        .id
        .ok_or_else(|| AppError::Database(anyhow::anyhow!("storage returned a card without id")))?;
    Ok((StatusCode::CREATED, [(LOCATION, location_of(id))]))
}

pub async fn find_all(
    State(state): State<Arc<AppState>>,
    CardOwner(principal): CardOwner,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<Vec<CashCard>>, AppError> {
    let Query(params) =
        query.map_err(|rejection| AppError::MalformedPayload(rejection.body_text()))?;
    let page = page_request_from_params(&params)?;
    let cards = state.service.list_cash_cards(page, &principal).await?;
    Ok(Json(cards))
}

pub async fn update(
    State(state): State<Arc<AppState>>,
    CardOwner(principal): CardOwner,
    path: Result<Path<CashCardId>, PathRejection>,
    payload: Result<Json<CashCardRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(path)?;
    let amount = parse_body(payload)?.amount_cents()?;
    state.service.update_cash_card(id, amount, &principal).await?;
    Ok(StatusCode::NO_CONTENT)
}
