//! Media file endpoints: upload, deletion, description and serving.

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;

use galerie_common::{AppError, AppResult};
use galerie_core::{FilePayload, UploadInput, UploadOutcome};

use crate::{extractors::AuthUser, middleware::AppState, response, response::ApiResponse};

/// Upload a batch of files into a gallery.
///
/// Multipart form: repeated `files` parts carry payloads; `album` and
/// `new_album` select the album assignment. Uploading into another user's
/// gallery requires a grant with upload rights.
async fn upload(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(owner_id): Path<String>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<UploadOutcome>> {
    let mut input = UploadInput::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("album") => {
                input.album = Some(read_text(field).await?);
            }
            Some("new_album") => {
                input.new_album = Some(read_text(field).await?);
            }
            Some("files" | "file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Truncated upload: {e}")))?;
                input.files.push(FilePayload {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    if input.files.is_empty() {
        return Err(AppError::BadRequest("No files in upload".to_string()));
    }

    let outcome = state.media_service.upload(&user, &owner_id, input).await?;
    Ok(ApiResponse::ok(outcome))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed form field: {e}")))
}

/// Serve a media file. Galleries are only viewable by their owner.
async fn serve_media(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((owner_id, filename)): Path<(String, String)>,
) -> AppResult<Response> {
    if user.id != owner_id {
        return Err(AppError::Forbidden(
            "Galleries are only viewable by their owner".to_string(),
        ));
    }

    let (bytes, mime) = state.media_service.read_media(&owner_id, &filename).await?;
    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}

/// Serve a cached video thumbnail.
async fn serve_thumbnail(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let (bytes, mime) = state.media_service.read_thumbnail(&filename).await?;
    Ok(([(header::CONTENT_TYPE, mime)], bytes).into_response())
}

/// Delete a file from the caller's own gallery.
async fn delete_media(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.media_service.delete(&user, &filename).await?;
    Ok(response::ok())
}

/// Description update request.
#[derive(Debug, Deserialize)]
pub struct DescriptionRequest {
    pub description: String,
}

/// Set a file's description.
async fn set_description(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(filename): Path<String>,
    Json(req): Json<DescriptionRequest>,
) -> AppResult<impl IntoResponse> {
    state
        .media_service
        .set_description(&user, &filename, &req.description)
        .await?;
    Ok(response::ok())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/galleries/{owner_id}/media", post(upload))
        .route("/galleries/{owner_id}/media/{filename}", get(serve_media))
        .route("/media/{filename}", delete(delete_media))
        .route("/media/{filename}/description", put(set_description))
        .route("/thumbnails/{filename}", get(serve_thumbnail))
}
