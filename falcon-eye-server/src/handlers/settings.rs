use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use falcon_eye_core::settings::{Settings, SettingsPatch};
use falcon_eye_core::Engine;

use crate::error::ApiError;

pub async fn get(State(engine): State<Engine>) -> Result<Json<Settings>, ApiError> {
    Ok(Json(falcon_eye_core::settings::read(&engine).await?))
}

pub async fn patch(State(engine): State<Engine>, Json(req): Json<SettingsPatch>) -> Result<Json<Settings>, ApiError> {
    Ok(Json(falcon_eye_core::settings::patch(&engine, req).await?))
}

pub async fn restart_all(State(engine): State<Engine>) -> Result<StatusCode, ApiError> {
    falcon_eye_core::settings::restart_all(&engine).await?;
    Ok(StatusCode::OK)
}

pub async fn delete_all_cameras(State(engine): State<Engine>) -> Result<StatusCode, ApiError> {
    falcon_eye_core::settings::delete_all_cameras(&engine).await?;
    Ok(StatusCode::NO_CONTENT)
}
