use axum::{
    extract::{Path, Query, State},
    Json,
};
use mergington_core::{ActivityListing, ActivityServiceError, Confirmation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::web::error::ApiError;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupQuery {
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl From<Confirmation> for MessageBody {
    fn from(value: Confirmation) -> Self {
        Self {
            message: value.message(),
        }
    }
}

pub async fn list_activities_handler(
    State(state): State<AppState>,
) -> Result<Json<ActivityListing>, ApiError> {
    let service = Arc::clone(&state.service);
    let listing = run_blocking(move || service.list_activities()).await?;
    Ok(Json(listing))
}

pub async fn signup_handler(
    State(state): State<AppState>,
    Path(activity_name): Path<String>,
    Query(query): Query<SignupQuery>,
) -> Result<Json<MessageBody>, ApiError> {
    let email = query.email.ok_or(ApiError::MissingEmail)?;
    let service = Arc::clone(&state.service);
    let confirmation = run_blocking(move || service.signup(&activity_name, &email)).await?;
    Ok(Json(confirmation.into()))
}

pub async fn withdraw_handler(
    State(state): State<AppState>,
    Path((activity_name, email)): Path<(String, String)>,
) -> Result<Json<MessageBody>, ApiError> {
    let service = Arc::clone(&state.service);
    let confirmation = run_blocking(move || service.withdraw(&activity_name, &email)).await?;
    Ok(Json(confirmation.into()))
}

// Store calls block on SQLite locks; keep them off the async workers.
async fn run_blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ActivityServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(ApiError::Join)?
        .map_err(ApiError::from)
}
