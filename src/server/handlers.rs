//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了开关接口的HTTP处理器。

use super::error::ApiError;
use super::state::AppState;
use crate::client::FlagStore;
use crate::model::Flag;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn list_flags(State(state): State<AppState>) -> Result<Json<Vec<Flag>>, ApiError> {
    let flags = state.store.get_all().await?;
    Ok(Json(flags))
}

/// 不存在的开关返回 `null`
pub async fn get_flag(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<Option<Flag>>, ApiError> {
    let flag = state.store.get(&key).await?;
    Ok(Json(flag))
}

pub async fn save_flag(
    State(state): State<AppState>,
    payload: Result<Json<Flag>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(flag) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    state.store.set(&flag).await?;
    Ok(Json(json!({ "message": "flag saved" })))
}

pub async fn delete_flag(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.store.delete(&key).await?;
    Ok(Json(json!({ "message": "flag deleted" })))
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let report = state.store.health().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let mut body = json!({
        "status": report.status(),
        "cache": report.cache.as_str(),
        "store": report.store.as_str(),
    });
    if let Some(reason) = report.cache.reason() {
        body["cache_error"] = json!(reason);
    }
    if let Some(reason) = report.store.reason() {
        body["store_error"] = json!(reason);
    }
    (status, Json(body))
}

pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.store.metrics().render(),
    )
}
