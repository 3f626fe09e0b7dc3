// libs/appointment-cell/src/handlers.rs
use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_models::auth::{MaybeSession, User};
use shared_models::error::AppError;

use crate::models::{AppointmentError, BookingForm, FieldErrors, SubmitOutcome};
use crate::router::BookingState;

/// Empty form plus the service and time slot catalog.
pub async fn booking_form(State(state): State<BookingState>) -> Json<Value> {
    let view = state.controller().view();

    Json(json!({
        "success": true,
        "form": view,
    }))
}

fn outcome_status(outcome: &SubmitOutcome) -> StatusCode {
    match outcome {
        SubmitOutcome::Booked { .. } => StatusCode::CREATED,
        SubmitOutcome::RegistrationRequired { .. } => StatusCode::UNAUTHORIZED,
        SubmitOutcome::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SubmitOutcome::Conflict { .. } | SubmitOutcome::SlotTaken { .. } => StatusCode::CONFLICT,
        SubmitOutcome::Failed { .. } => StatusCode::BAD_GATEWAY,
        SubmitOutcome::Ignored => {
            error!("Fresh booking controller ignored a submit");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

#[axum::debug_handler]
pub async fn submit_booking(
    State(state): State<BookingState>,
    Extension(session): Extension<MaybeSession>,
    Json(form): Json<BookingForm>,
) -> Response {
    let mut controller = state.controller();
    controller.fill(form);

    let outcome = controller.submit(session.0.as_ref()).await;
    let form_state = controller.state();
    let notification = outcome.notification().cloned();
    let empty = FieldErrors::new();

    let status = outcome_status(&outcome);
    let mut body = match &outcome {
        SubmitOutcome::Booked { confirmation, .. } => json!({
            "appointment": confirmation.appointment,
            "meeting_id": confirmation.meeting_id,
            "meeting_link": confirmation.meeting_link,
        }),
        _ => json!({}),
    };

    let errors = match &outcome {
        SubmitOutcome::Invalid { errors, .. } => errors,
        _ => &empty,
    };

    debug!("Booking submit answered with {}", status);

    if let Some(fields) = body.as_object_mut() {
        fields.insert("success".to_string(), json!(status == StatusCode::CREATED));
        fields.insert("state".to_string(), json!(form_state));
        fields.insert("notification".to_string(), json!(notification));
        fields.insert("errors".to_string(), json!(errors));
    }

    (status, Json(body)).into_response()
}

/// Patient dashboard: the caller's scheduled appointments, earliest first.
#[axum::debug_handler]
pub async fn my_appointments(
    State(state): State<BookingState>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let appointments = state.store
        .list_scheduled(&user.id, auth.token())
        .await
        .map_err(|e| match e {
            AppointmentError::Unauthorized => AppError::Auth(e.to_string()),
            _ => AppError::ExternalService(e.to_string()),
        })?;

    Ok(Json(json!({
        "success": true,
        "total": appointments.len(),
        "appointments": appointments,
    })))
}
