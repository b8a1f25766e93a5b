//! REST endpoints the dashboard front-end drives the wizard with.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::api::types::{
    BusinessActivity, DocumentUpload, NewOrganization, PaymentMethodSelection, StakeholderInfo,
};
use crate::error::{Error, OnboardingError};
use crate::onboarding::controller::OnboardingProgressController;
use crate::onboarding::progress::{JumpOutcome, NavOutcome};

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub controller: Arc<OnboardingProgressController>,
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/activity", get(get_activity))
        .route("/api/onboarding/retry", post(retry))
        .route("/api/onboarding/organization", post(submit_organization))
        .route("/api/onboarding/stakeholder", post(submit_stakeholder))
        .route("/api/onboarding/business", post(submit_business))
        .route("/api/onboarding/payment-methods", post(submit_payment_methods))
        .route("/api/onboarding/documents", post(submit_documents))
        .route("/api/onboarding/advance", post(advance))
        .route("/api/onboarding/rewind", post(rewind))
        .route("/api/onboarding/jump", post(jump))
        .with_state(state)
}

/// GET /api/onboarding/status — current step, indicators, completion.
async fn get_status(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.controller.status().await)
}

/// GET /api/onboarding/activity — step completion history.
async fn get_activity(State(state): State<OnboardingRouteState>) -> Response {
    match state.controller.activity().await {
        Ok(feed) => Json(feed).into_response(),
        Err(e) => error_response(Error::Store(e)),
    }
}

/// POST /api/onboarding/retry — re-run the progress fetch after a failure.
async fn retry(State(state): State<OnboardingRouteState>) -> Response {
    match state.controller.retry().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => error_response(e),
    }
}

async fn submit_organization(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<NewOrganization>,
) -> Response {
    nav_response(&state, state.controller.submit_organization(&body).await).await
}

async fn submit_stakeholder(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<StakeholderInfo>,
) -> Response {
    nav_response(&state, state.controller.submit_stakeholder(&body).await).await
}

async fn submit_business(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<BusinessActivity>,
) -> Response {
    nav_response(&state, state.controller.submit_business(&body).await).await
}

async fn submit_payment_methods(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<PaymentMethodSelection>,
) -> Response {
    nav_response(&state, state.controller.submit_payment_methods(&body).await).await
}

/// POST /api/onboarding/documents — multipart: a `kind` text field plus
/// the `file` part.
async fn submit_documents(
    State(state): State<OnboardingRouteState>,
    mut multipart: Multipart,
) -> Response {
    let mut kind = None;
    let mut file = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("invalid multipart body: {e}")),
        };
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("kind") => kind = field.text().await.ok(),
            Some("file") => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((file_name, content_type, bytes.to_vec())),
                    Err(e) => return bad_request(format!("failed to read file part: {e}")),
                }
            }
            _ => {}
        }
    }

    let (Some(kind), Some((file_name, content_type, bytes))) = (kind, file) else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({"error": "kind and file fields are required"})),
        )
            .into_response();
    };

    let upload = DocumentUpload {
        kind,
        file_name,
        content_type,
        bytes,
    };
    nav_response(&state, state.controller.submit_documents(&upload).await).await
}

async fn advance(State(state): State<OnboardingRouteState>) -> Response {
    nav_response(&state, state.controller.advance().await).await
}

async fn rewind(State(state): State<OnboardingRouteState>) -> Response {
    nav_response(&state, state.controller.rewind().await).await
}

#[derive(Debug, Deserialize)]
struct JumpRequest {
    target: usize,
}

async fn jump(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<JumpRequest>,
) -> Response {
    match state.controller.jump_to(body.target).await {
        Ok(outcome) => {
            let status = state.controller.status().await;
            let outcome = match outcome {
                JumpOutcome::Moved(_) => "moved",
                JumpOutcome::Rejected => "rejected",
            };
            Json(serde_json::json!({"outcome": outcome, "status": status})).into_response()
        }
        Err(e) => error_response(e),
    }
}

/// Wrap a navigation outcome with a fresh status snapshot.
async fn nav_response(
    state: &OnboardingRouteState,
    result: crate::error::Result<NavOutcome>,
) -> Response {
    match result {
        Ok(outcome) => {
            let status = state.controller.status().await;
            let outcome = match outcome {
                NavOutcome::Moved(_) => "moved",
                NavOutcome::Complete => "complete",
                NavOutcome::Exit => "exit",
            };
            Json(serde_json::json!({"outcome": outcome, "status": status})).into_response()
        }
        Err(e) => error_response(e),
    }
}

fn bad_request(message: String) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": message})),
    )
        .into_response()
}

/// Map service errors to HTTP statuses: preconditions are the client's
/// to fix, remote failures are retryable upstream problems.
fn error_response(error: Error) -> Response {
    let status = match &error {
        Error::Onboarding(OnboardingError::OrganizationRequired) => StatusCode::CONFLICT,
        Error::Onboarding(OnboardingError::NotInitialized) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Api(_) => StatusCode::BAD_GATEWAY,
        Error::Session(_) => StatusCode::UNAUTHORIZED,
        Error::Store(_) | Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(serde_json::json!({"error": error.to_string()}))).into_response()
}
