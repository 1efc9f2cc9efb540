//! Book catalog endpoints.

use crate::catalog::UploadRequest;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE, PRAGMA};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use stacks_core::{attachment_filename, BOOK_CONTENT_TYPE};
use stacks_metadata::BookRow;
use time::OffsetDateTime;

/// Book record as returned to clients.
#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub category: String,
    /// Storage key of the blob, exposed as the stored filename.
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub uploaded_at: OffsetDateTime,
}

impl From<BookRow> for BookResponse {
    fn from(row: BookRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            category: row.category,
            filename: row.storage_key,
            access_url: row.access_url,
            uploaded_at: row.uploaded_at,
        }
    }
}

/// Query parameters for listing.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// Response body for a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: i64,
}

/// POST /books - Upload a book (multipart: file, title, category).
pub async fn upload_book(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<BookResponse>)> {
    let mut data: Option<Bytes> = None;
    let mut original_filename: Option<String> = None;
    let mut title: Option<String> = None;
    let mut category: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                original_filename = field.file_name().map(str::to_string);
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("failed to read file: {e}")))?,
                );
            }
            Some("title") => {
                title = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("failed to read title: {e}"))
                })?);
            }
            Some("category") => {
                category = Some(field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("failed to read category: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let request = UploadRequest {
        title: title.ok_or(ApiError::BadRequest("missing field: title".to_string()))?,
        category: category.ok_or(ApiError::BadRequest("missing field: category".to_string()))?,
        original_filename,
        data: data.ok_or(ApiError::BadRequest("missing field: file".to_string()))?,
    };

    let row = state.catalog.upload(request).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /books?category= - List books, most recent first.
pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<Vec<BookResponse>>> {
    let rows = state.catalog.list(query.category.as_deref()).await?;
    Ok(Json(rows.into_iter().map(BookResponse::from).collect()))
}

/// GET /books/{id}/stream - Stream a book's content inline.
///
/// Served with the fixed document content type, a title-derived filename,
/// and cache-suppressing headers for the reader view.
pub async fn stream_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let (book, stream) = state.catalog.open(id).await?;

    let headers = [
        (CONTENT_TYPE, BOOK_CONTENT_TYPE.to_string()),
        (
            CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", attachment_filename(&book.title)),
        ),
        (CACHE_CONTROL, "no-store".to_string()),
        (PRAGMA, "no-cache".to_string()),
    ];

    Ok((StatusCode::OK, headers, Body::from_stream(stream)).into_response())
}

/// DELETE /books/{id} - Delete a book record and its blob.
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    state.catalog.delete(id).await?;
    Ok(Json(DeleteResponse { deleted: id }))
}
