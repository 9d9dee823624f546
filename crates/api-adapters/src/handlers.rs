//! # API Handlers
//!
//! Thin translation between HTTP and the services. Every response uses the
//! `{ "success": ..., "data" | "message": ... }` envelope the portal expects.

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use domains::{
    AppError, ClaimForm, ClaimId, ClaimSelector, Clock, Item, ItemId, ItemUpdate, NewItem,
};
use prometheus_client::encoding::text::encode;
use prometheus_client::registry::Registry;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use services::{ClaimService, DeliveryService, ExpirationSweeper, ItemService};

use crate::error::ApiError;

type ApiResult = Result<Response, ApiError>;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub items: Arc<ItemService>,
    pub claims: Arc<ClaimService>,
    pub delivery: Arc<DeliveryService>,
    pub sweeper: Arc<ExpirationSweeper>,
    pub clock: Arc<dyn Clock>,
    pub registry: Arc<Registry>,
}

/// Human-readable verification slot, as shown on item cards.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationView {
    pub verification_date: String,
    pub verification_time: String,
}

impl VerificationView {
    fn at(deadline: DateTime<Utc>) -> Self {
        Self {
            verification_date: deadline.format("%A, %B %-d, %Y").to_string(),
            verification_time: deadline.format("%I:%M %p").to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: Item,
    pub verification: Option<VerificationView>,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        let verification = item.verification_deadline().map(VerificationView::at);
        Self { item, verification }
    }
}

fn ok(status: StatusCode, data: impl Serialize) -> Response {
    (status, Json(json!({ "success": true, "data": data }))).into_response()
}

fn ok_list(items: Vec<Item>) -> Response {
    let data: Vec<ItemView> = items.into_iter().map(ItemView::from).collect();
    Json(json!({ "success": true, "count": data.len(), "data": data })).into_response()
}

fn parse_id(raw: &str) -> Result<ItemId, ApiError> {
    Ok(raw.parse::<ItemId>()?)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| AppError::validation(rejection.body_text()).into())
}

// ── Catalogue ────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub show_delivered: bool,
}

pub async fn list_items(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query.map_err(|r| ApiError(AppError::validation(r.body_text())))?;
    Ok(ok_list(state.items.list_items(query.show_delivered).await?))
}

pub async fn recent_items(State(state): State<AppState>) -> ApiResult {
    Ok(ok_list(state.items.recent_items().await?))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub show_delivered: bool,
}

pub async fn search_items(
    State(state): State<AppState>,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = query.map_err(|r| ApiError(AppError::validation(r.body_text())))?;
    Ok(ok_list(state.items.search_items(&query.q, query.show_delivered).await?))
}

pub async fn get_item(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let item = state.items.get_item(parse_id(&id)?).await?;
    Ok(ok(StatusCode::OK, ItemView::from(item)))
}

pub async fn create_item(
    State(state): State<AppState>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> ApiResult {
    let item = state.items.create_item(body(payload)?).await?;
    Ok(ok(StatusCode::CREATED, ItemView::from(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ItemUpdate>, JsonRejection>,
) -> ApiResult {
    let item = state.items.update_item(parse_id(&id)?, body(payload)?).await?;
    Ok(ok(StatusCode::OK, ItemView::from(item)))
}

pub async fn delete_item(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    state.items.delete_item(parse_id(&id)?).await?;
    Ok(ok(StatusCode::OK, json!({})))
}

// ── Claim lifecycle ──────────────────────────────────────────────────────────

pub async fn claim_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ClaimForm>, JsonRejection>,
) -> ApiResult {
    let item_id = parse_id(&id)?;
    let identity = body(payload)?.into_identity();
    let receipt = state.claims.submit_claim(item_id, identity).await?;

    let verification = VerificationView::at(receipt.verification_deadline);
    Ok(Json(json!({
        "success": true,
        "message": "Claim submitted successfully",
        "data": receipt,
        "verification": verification,
    }))
    .into_response())
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverRequest {
    pub claim_index: Option<usize>,
    pub claim_id: Option<ClaimId>,
    pub verified_by: Option<String>,
}

impl DeliverRequest {
    fn selector(&self) -> Option<ClaimSelector> {
        match (self.claim_id, self.claim_index) {
            (Some(id), _) => Some(ClaimSelector::Id(id)),
            (None, index) => index.map(ClaimSelector::Index),
        }
    }
}

pub async fn deliver_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<DeliverRequest>, JsonRejection>,
) -> ApiResult {
    let item_id = parse_id(&id)?;
    let request = body(payload)?;
    let Some(selector) = request.selector() else {
        // a missing or unclaimed item outranks a missing selector
        state.items.get_item(item_id).await?.ensure_deliverable()?;
        return Err(AppError::validation("claimIndex or claimId is required").into());
    };
    let record = state
        .delivery
        .deliver(item_id, selector, request.verified_by)
        .await?;
    Ok(ok(StatusCode::OK, record))
}

// ── Operations ───────────────────────────────────────────────────────────────

/// Runs one expiration sweep right now, outside the schedule.
///
/// The sweep gets its own task so a client hanging up cannot cancel
/// notifications for items that were already reset.
pub async fn run_sweep(State(state): State<AppState>) -> ApiResult {
    let sweeper = Arc::clone(&state.sweeper);
    let now = state.clock.now();
    let report = tokio::spawn(async move { sweeper.run(now).await })
        .await
        .map_err(|err| AppError::Internal(format!("manual sweep task failed: {err}")))?;
    Ok(ok(StatusCode::OK, report))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> ApiResult {
    let mut out = String::new();
    encode(&mut out, &state.registry)
        .map_err(|err| AppError::Internal(format!("metrics encoding failed: {err}")))?;
    Ok((
        [(
            header::CONTENT_TYPE,
            "application/openmetrics-text; version=1.0.0; charset=utf-8",
        )],
        out,
    )
        .into_response())
}
