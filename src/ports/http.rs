// src/ports/http.rs
use std::future::Future;

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::application::{Catalog, StorageTier};
use crate::constants::{DEFAULT_SET_NAME, SHUTDOWN_GRACE_SECS};
use crate::domain::{DomainError, Flashcard, FlashcardPatch, FlashcardSet, NewFlashcard};
use crate::util::text::non_blank;

/// Errors as returned to clients: `{"success": false, "error": "..."}`.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    /// Returns `400 Bad Request`
    #[error("{0}")]
    BadRequest(String),

    /// Returns `404 Not Found`
    #[error("{0}")]
    NotFound(String),

    /// Returns `409 Conflict`
    #[error("{0}")]
    Conflict(String),

    /// Returns `500 Internal Server Error`; the source is logged, not sent.
    #[error("{message}")]
    Internal {
        message: &'static str,
        #[source]
        source: DomainError,
    },
}

impl ApiError {
    /// Map a domain error; `context` is the client message for failures
    /// that are not the client's fault.
    pub fn from_domain(error: DomainError, context: &'static str) -> Self {
        match error {
            DomainError::Validation(msg) => ApiError::BadRequest(msg),
            DomainError::FlashcardNotFound(_) => ApiError::NotFound("Flashcard not found".to_string()),
            DomainError::SetAlreadyExists(_) => ApiError::Conflict("Set already exists".to_string()),
            source @ DomainError::Storage(_) => ApiError::Internal {
                message: context,
                source,
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal { message, source } = &self {
            error!(error = %source, "{}", message);
        }
        let body = ErrorBody {
            success: false,
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct ListBody<T> {
    success: bool,
    count: usize,
    data: Vec<T>,
}

impl<T> ListBody<T> {
    fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
struct ItemBody<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    data: T,
}

impl<T> ItemBody<T> {
    fn new(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data,
        }
    }

    fn with_message(message: &'static str, data: T) -> Self {
        Self {
            success: true,
            message: Some(message),
            data,
        }
    }
}

#[derive(Debug, Serialize)]
struct SetCardsBody {
    success: bool,
    set: String,
    count: usize,
    data: Vec<Flashcard>,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    success: bool,
    storage: StorageTier,
}

#[derive(Debug, Deserialize)]
pub struct FlashcardRequest {
    #[serde(default)]
    pub front: Option<String>,
    #[serde(default)]
    pub back: Option<String>,
    #[serde(default)]
    pub set: Option<String>,
}

impl FlashcardRequest {
    /// Both sides must be present and non-empty; whitespace is left to the
    /// domain validation.
    fn sides(&self) -> Result<(String, String), ApiError> {
        match (self.front.as_deref(), self.back.as_deref()) {
            (Some(front), Some(back)) if !front.is_empty() && !back.is_empty() => {
                Ok((front.to_string(), back.to_string()))
            }
            _ => Err(ApiError::BadRequest("Front and back are required".to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

fn invalid_body(rejection: JsonRejection) -> ApiError {
    warn!(error = %rejection, "Rejected request body");
    ApiError::BadRequest("Invalid JSON body".to_string())
}

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid flashcard ID".to_string()))
}

/// The JSON API, mounted under `/api`.
pub fn router(catalog: Catalog) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/flashcards", get(list_flashcards).post(create_flashcard))
        .route(
            "/flashcards/{id}",
            get(get_flashcard).put(update_flashcard).delete(delete_flashcard),
        )
        .route("/sets", get(list_sets).post(create_set))
        .route("/sets/{name}/flashcards", get(list_set_flashcards))
        .with_state(catalog);

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn health(State(catalog): State<Catalog>) -> Json<HealthBody> {
    Json(HealthBody {
        success: true,
        storage: catalog.storage_tier(),
    })
}

async fn list_flashcards(
    State(catalog): State<Catalog>,
) -> Result<Json<ListBody<Flashcard>>, ApiError> {
    catalog.ensure_seeded().await;
    let cards = catalog
        .flashcards()
        .list()
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to retrieve flashcards"))?;
    Ok(Json(ListBody::new(cards)))
}

async fn create_flashcard(
    State(catalog): State<Catalog>,
    payload: Result<Json<FlashcardRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemBody<Flashcard>>), ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let (front, back) = request.sides()?;

    catalog.ensure_seeded().await;
    let draft = NewFlashcard {
        front,
        back,
        set: request.set,
    };
    let card = catalog
        .flashcards()
        .create(draft)
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to create flashcard"))?;

    Ok((
        StatusCode::CREATED,
        Json(ItemBody::with_message("Flashcard successfully created", card)),
    ))
}

async fn get_flashcard(
    State(catalog): State<Catalog>,
    Path(id): Path<String>,
) -> Result<Json<ItemBody<Flashcard>>, ApiError> {
    catalog.ensure_seeded().await;
    let id = parse_id(&id)?;
    let card = catalog
        .flashcards()
        .get_by_id(id)
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to retrieve flashcard"))?;
    Ok(Json(ItemBody::new(card)))
}

async fn update_flashcard(
    State(catalog): State<Catalog>,
    Path(id): Path<String>,
    payload: Result<Json<FlashcardRequest>, JsonRejection>,
) -> Result<Json<ItemBody<Flashcard>>, ApiError> {
    let id = parse_id(&id)?;
    let Json(request) = payload.map_err(invalid_body)?;
    let (front, back) = request.sides()?;

    catalog.ensure_seeded().await;
    // Clients edit whole cards; a card sent without a set moves to the default set.
    let patch = FlashcardPatch {
        front: Some(front),
        back: Some(back),
        set: Some(non_blank(request.set.as_deref()).unwrap_or_else(|| DEFAULT_SET_NAME.to_string())),
    };
    let card = catalog
        .flashcards()
        .update(id, patch)
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to update flashcard"))?;

    Ok(Json(ItemBody::with_message("Successfully updated flashcard", card)))
}

async fn delete_flashcard(
    State(catalog): State<Catalog>,
    Path(id): Path<String>,
) -> Result<Json<ItemBody<Flashcard>>, ApiError> {
    let id = parse_id(&id)?;

    catalog.ensure_seeded().await;
    let card = catalog
        .flashcards()
        .delete(id)
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to delete flashcard"))?;

    Ok(Json(ItemBody::with_message("Flashcard deleted successfully", card)))
}

async fn list_sets(
    State(catalog): State<Catalog>,
) -> Result<Json<ListBody<FlashcardSet>>, ApiError> {
    catalog.ensure_seeded().await;
    let sets = catalog
        .sets()
        .list()
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to retrieve sets"))?;
    Ok(Json(ListBody::new(sets)))
}

async fn create_set(
    State(catalog): State<Catalog>,
    payload: Result<Json<SetRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ItemBody<FlashcardSet>>), ApiError> {
    let Json(request) = payload.map_err(invalid_body)?;
    let name = match request.name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => return Err(ApiError::BadRequest("Set name is required".to_string())),
    };

    catalog.ensure_seeded().await;
    let set = catalog
        .sets()
        .create(name, request.description.as_deref())
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to create set"))?;

    Ok((
        StatusCode::CREATED,
        Json(ItemBody::with_message("Set created successfully", set)),
    ))
}

async fn list_set_flashcards(
    State(catalog): State<Catalog>,
    Path(name): Path<String>,
) -> Result<Json<SetCardsBody>, ApiError> {
    catalog.ensure_seeded().await;
    let cards = catalog
        .flashcards()
        .list_by_set(&name)
        .await
        .map_err(|e| ApiError::from_domain(e, "Failed to retrieve set flashcards"))?;

    Ok(Json(SetCardsBody {
        success: true,
        set: name,
        count: cards.len(),
        data: cards,
    }))
}

/// Serve the API on `listener` until `shutdown` resolves, then give
/// in-flight requests a bounded time to finish.
pub async fn serve<F>(listener: TcpListener, catalog: Catalog, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send,
{
    let app = router(catalog);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            return result
                .context("HTTP server task failed")?
                .context("HTTP server error");
        }
        _ = shutdown => {
            info!("Shutdown signal received, draining connections");
        }
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(std::time::Duration::from_secs(SHUTDOWN_GRACE_SECS), server).await {
        Ok(joined) => {
            joined
                .context("HTTP server task failed")?
                .context("HTTP server error")?;
            info!("HTTP API stopped");
        }
        Err(_) => warn!("HTTP API shutdown timed out"),
    }
    Ok(())
}
