use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::dto::{Envelope, UserRequest, UserResponse};
use super::errors::UserError;
use crate::state::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// Failure rendered as `{ "success": false, "error": ... }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Maps a service error to a response; storage failures are logged and
    /// hidden behind `fallback`.
    fn from_service(err: UserError, fallback: &str) -> Self {
        let (status, message) = match &err {
            UserError::InvalidUserId => (StatusCode::BAD_REQUEST, "Invalid user ID".into()),
            UserError::FirstNameRequired
            | UserError::LastNameRequired
            | UserError::EmailRequired => (StatusCode::BAD_REQUEST, err.to_string()),
            UserError::UserNotFound => (StatusCode::NOT_FOUND, "User not found".into()),
            UserError::DuplicateEmail => (StatusCode::CONFLICT, err.to_string()),
            UserError::Storage(e) => {
                error!(error = %e, "{fallback}");
                (StatusCode::INTERNAL_SERVER_ERROR, fallback.into())
            }
        };
        Self { status, message }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Envelope::error(self.message))).into_response()
    }
}

fn failed(fallback: &'static str) -> impl FnOnce(UserError) -> ApiError {
    move |err| ApiError::from_service(err, fallback)
}

fn user_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    path.map(|Path(id)| id).map_err(|e| {
        warn!(error = %e, "unparseable user id");
        ApiError::bad_request("Invalid user ID")
    })
}

fn body(payload: Result<Json<UserRequest>, JsonRejection>) -> Result<UserRequest, ApiError> {
    payload.map(|Json(req)| req).map_err(|e| {
        warn!(error = %e, "invalid request body");
        ApiError::bad_request("Invalid request body")
    })
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<UserResponse>>>, ApiError> {
    let users = state
        .users
        .get_all_users()
        .await
        .map_err(failed("Failed to fetch users"))?;
    let items: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Envelope::data(items)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Envelope<UserResponse>>, ApiError> {
    let id = user_id(path)?;
    let user = state
        .users
        .get_user_by_id(id)
        .await
        .map_err(failed("Failed to fetch user"))?;
    Ok(Json(Envelope::data(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<UserResponse>>), ApiError> {
    let req = body(payload)?;
    let user = state
        .users
        .create_user(req.into())
        .await
        .map_err(failed("Failed to create user"))?;
    Ok((StatusCode::CREATED, Json(Envelope::data(user.into()))))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UserRequest>, JsonRejection>,
) -> Result<Json<Envelope<UserResponse>>, ApiError> {
    let id = user_id(path)?;
    let req = body(payload)?;
    let user = state
        .users
        .update_user(id, req.into())
        .await
        .map_err(failed("Failed to update user"))?;
    Ok(Json(Envelope::data(user.into())))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<Envelope<()>>, ApiError> {
    let id = user_id(path)?;
    state
        .users
        .delete_user(id)
        .await
        .map_err(failed("Failed to delete user"))?;
    Ok(Json(Envelope::message("User deleted successfully")))
}
