//! HTTP surface for the engine.
//!
//! Every route answers with the `{success, message, data}` envelope, including
//! when the request body cannot be parsed.
//!
//! Coin values are read from the raw JSON text rather than through `f64`, so
//! a number that only rounds to a denomination is still rejected.

use crate::application::engine::VendingEngine;
use crate::application::response::VendingResponse;
use crate::domain::machine::ChangeConfig;
use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::value::RawValue;
use std::borrow::Cow;
use std::sync::Arc;

type SharedEngine = Arc<VendingEngine>;

#[derive(Debug, Deserialize)]
pub struct InsertCoinRequest {
    pub value: Box<RawValue>,
}

impl InsertCoinRequest {
    /// The coin value as the client wrote it. A JSON string is unquoted,
    /// anything else is returned verbatim.
    pub fn value_text(&self) -> Cow<'_, str> {
        let raw = self.value.get();
        match serde_json::from_str::<String>(raw) {
            Ok(text) => Cow::Owned(text),
            Err(_) => Cow::Borrowed(raw),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SelectItemRequest {
    #[serde(default)]
    pub item: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestockRequest {
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub change_config: Option<ChangeConfig>,
}

pub fn router(engine: SharedEngine) -> Router {
    Router::new()
        .route("/inventory", get(inventory))
        .route("/inserted-amount", get(inserted_amount))
        .route("/insert-coin", post(insert_coin))
        .route("/select-item", post(select_item))
        .route("/return-coins", post(return_coins))
        .route("/restock", post(restock))
        .with_state(engine)
}

impl IntoResponse for VendingResponse {
    fn into_response(self) -> Response {
        let status = if self.is_success() {
            StatusCode::OK
        } else if self.is_fatal() {
            StatusCode::INTERNAL_SERVER_ERROR
        } else {
            StatusCode::BAD_REQUEST
        };
        (status, Json(self)).into_response()
    }
}

fn bad_body(rejection: JsonRejection) -> VendingResponse {
    tracing::warn!(error = %rejection.body_text(), "rejected request body");
    VendingResponse::failure(format!("Invalid request body: {}", rejection.body_text()))
}

async fn inventory(State(engine): State<SharedEngine>) -> VendingResponse {
    engine.inventory().await
}

async fn inserted_amount(State(engine): State<SharedEngine>) -> VendingResponse {
    engine.inserted_amount().await
}

async fn insert_coin(State(engine): State<SharedEngine>, body: Bytes) -> VendingResponse {
    match serde_json::from_slice::<InsertCoinRequest>(&body) {
        Ok(req) => engine.insert_coin_text(&req.value_text()).await,
        Err(e) => {
            tracing::warn!(error = %e, "rejected request body");
            VendingResponse::failure(format!("Invalid request body: {e}"))
        }
    }
}

async fn select_item(
    State(engine): State<SharedEngine>,
    body: Result<Json<SelectItemRequest>, JsonRejection>,
) -> VendingResponse {
    match body {
        Ok(Json(req)) => engine.select_item(&req.item).await,
        Err(rejection) => bad_body(rejection),
    }
}

async fn return_coins(State(engine): State<SharedEngine>) -> VendingResponse {
    engine.return_coins().await
}

async fn restock(
    State(engine): State<SharedEngine>,
    body: Result<Json<RestockRequest>, JsonRejection>,
) -> VendingResponse {
    match body {
        Ok(Json(req)) => {
            engine
                .restock_item(&req.item, req.amount, req.change_config)
                .await
        }
        Err(rejection) => bad_body(rejection),
    }
}
