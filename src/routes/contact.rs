use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use crate::{
    error::AppError,
    message::{ContactRequest, ContactResponse},
    services::store::NewContactMessage,
    state::SharedState,
};

const INVALID_DATA: &str = "Invalid message data";

pub async fn contact_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<ContactResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| {
        tracing::warn!(error = %e, "rejected contact payload");
        AppError::Validation(INVALID_DATA.to_string())
    })?;
    if let Err(reason) = payload.validate() {
        tracing::warn!(%reason, "rejected contact payload");
        return Err(AppError::Validation(INVALID_DATA.to_string()));
    }

    let saved = state
        .store
        .add_contact_message(NewContactMessage {
            name: payload.name,
            email: payload.email,
            subject: payload.subject,
            body: payload.message,
        })
        .await?;

    // The submission is already recorded, so a delivery failure is only logged.
    match state
        .mailer
        .send_contact_email(&saved.name, &saved.email, &saved.subject, &saved.body)
        .await
    {
        Ok(()) => tracing::info!(id = saved.id, "contact email sent successfully"),
        Err(e) => tracing::error!(id = saved.id, error = %e, "error sending contact email"),
    }

    Ok(Json(ContactResponse {
        success: true,
        message: "Message sent successfully".to_string(),
    }))
}
