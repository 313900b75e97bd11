//! FAQ HTTP handlers.
//!
//! This module implements the FAQ endpoints:
//! - GET /api/v1/faqs - List entries in display order
//! - POST /api/v1/faqs - Add an entry
//! - PUT /api/v1/faqs/:id - Partially update an entry
//! - DELETE /api/v1/faqs/:id - Remove an entry

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::faq::{CreateFaqRequest, Faq, UpdateFaqRequest},
    store::AppState,
};

/// List all FAQ entries, ascending by display order.
pub async fn list_faqs(State(state): State<AppState>) -> Result<Json<Vec<Faq>>, AppError> {
    let faqs = state.faqs.list_faqs().await?;
    Ok(Json(faqs))
}

/// Add a new FAQ entry.
///
/// # Response (201 Created)
///
/// Returns the stored entry with its assigned id and timestamps.
pub async fn create_faq(
    State(state): State<AppState>,
    Json(request): Json<CreateFaqRequest>,
) -> Result<(StatusCode, Json<Faq>), AppError> {
    if request.question.trim().is_empty() || request.answer.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "question and answer must not be empty".to_string(),
        ));
    }

    let faq = state.faqs.add_faq(request).await?;
    Ok((StatusCode::CREATED, Json(faq)))
}

/// Partially update an FAQ entry. Omitted fields are left unchanged.
///
/// Supplied fields obey the same rules as creation: an update may not
/// blank out a question or answer.
///
/// # Response
///
/// - **Success (200 OK)**: The updated entry
/// - **Error (400)**: A supplied field is blank
/// - **Error (404)**: No entry with that id
pub async fn update_faq(
    State(state): State<AppState>,
    Path(faq_id): Path<Uuid>,
    Json(request): Json<UpdateFaqRequest>,
) -> Result<Json<Faq>, AppError> {
    if request
        .question
        .as_deref()
        .is_some_and(|q| q.trim().is_empty())
        || request
            .answer
            .as_deref()
            .is_some_and(|a| a.trim().is_empty())
    {
        return Err(AppError::InvalidRequest(
            "question and answer must not be empty".to_string(),
        ));
    }

    let faq = state.faqs.update_faq(faq_id, request).await?;
    Ok(Json(faq))
}

/// Delete an FAQ entry.
///
/// # Response
///
/// - **Success (204 No Content)**
/// - **Error (404)**: No entry with that id
pub async fn delete_faq(
    State(state): State<AppState>,
    Path(faq_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.faqs.delete_faq(faq_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use std::sync::Arc;

    fn state() -> AppState {
        let store = Arc::new(MemoryStore::new());
        AppState {
            bookings: store.clone(),
            faqs: store,
        }
    }

    fn entry() -> CreateFaqRequest {
        CreateFaqRequest {
            question: "How do I book?".to_string(),
            answer: "Pick a day, a court and a slot.".to_string(),
            order: 0,
        }
    }

    #[tokio::test]
    async fn create_rejects_blank_fields() {
        let mut blank_question = entry();
        blank_question.question = "   ".to_string();
        let result = create_faq(State(state()), Json(blank_question)).await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn update_cannot_blank_a_field_creation_forbids() {
        let state = state();
        let (_, Json(faq)) = create_faq(State(state.clone()), Json(entry())).await.unwrap();

        // A supplied blank field is rejected, same rule as creation
        let result = update_faq(
            State(state.clone()),
            Path(faq.id),
            Json(UpdateFaqRequest {
                question: Some("   ".to_string()),
                ..Default::default()
            }),
        )
        .await;
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));

        // Omitted fields still pass through untouched
        let Json(updated) = update_faq(
            State(state),
            Path(faq.id),
            Json(UpdateFaqRequest {
                answer: Some("Pick a slot and bring your key.".to_string()),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
        assert_eq!(updated.question, "How do I book?");
        assert_eq!(updated.answer, "Pick a slot and bring your key.");
    }
}
