//! Code reservation handler

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use shared::CodePrefix;

use crate::error::{AppError, AppResult};
use crate::services::CodeGenerator;
use crate::AppState;

#[derive(Serialize)]
pub struct ReservedCode {
    pub code: String,
}

/// Reserve the next sequential code for a prefix (`ART`, `EMP`, ...)
pub async fn reserve_code(
    State(state): State<AppState>,
    Path(prefix): Path<String>,
) -> AppResult<(StatusCode, Json<ReservedCode>)> {
    let prefix = CodePrefix::from_str(&prefix.to_ascii_uppercase())
        .ok_or_else(|| AppError::validation("prefix", format!("Unknown code prefix {}", prefix)))?;

    let code = CodeGenerator::new(state.store.clone())
        .generate_next_code(prefix)
        .await?;
    Ok((StatusCode::CREATED, Json(ReservedCode { code })))
}
