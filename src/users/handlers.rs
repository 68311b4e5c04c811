use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, info, instrument};

use crate::{
    errors::ApiError,
    state::AppState,
    uploads::{save_profile_image, StoredFile, UploadError, MAX_FILE_BYTES},
    users::{
        dto::{AvailabilityResponse, SubmitResponse},
        services::{new_user_from_submission, parse_submission},
    },
};

/// Room for the `data` field and multipart framing on top of the image.
const FORM_OVERHEAD_BYTES: usize = 256 * 1024;

pub const IMAGE_FIELD: &str = "profileImage";
pub const DATA_FIELD: &str = "data";

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/check-username/:username", get(check_username))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/submit", post(submit))
        .layer(DefaultBodyLimit::max(MAX_FILE_BYTES + FORM_OVERHEAD_BYTES))
}

#[instrument(skip(state))]
pub async fn check_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<AvailabilityResponse>, ApiError> {
    let existing = state.store.find_by_username(&username).await?;
    Ok(Json(AvailabilityResponse {
        available: existing.is_none(),
    }))
}

/// POST /api/submit (multipart)
/// Fields: `profileImage` (one jpeg/png file) and `data` (JSON user attributes).
///
/// The image is written before the insert. If the insert then fails the file
/// stays behind in the upload directory.
#[instrument(skip(state, multipart))]
pub async fn submit(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let mut mp = multipart?;
    let mut image: Option<StoredFile> = None;
    let mut data: Option<String> = None;

    while let Some(field) = mp.next_field().await.map_err(UploadError::from)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some(IMAGE_FIELD) => {
                if image.is_some() {
                    return Err(UploadError::UnexpectedField.into());
                }
                image = Some(save_profile_image(state.storage.as_ref(), field).await?);
            }
            Some(DATA_FIELD) => {
                data = Some(field.text().await.map_err(UploadError::from)?);
            }
            _ if field.file_name().is_some() => {
                return Err(UploadError::UnexpectedField.into());
            }
            other => debug!(field = ?other, "ignoring form field"),
        }
    }

    let image = image.ok_or(ApiError::MissingImage)?;
    let raw = data.ok_or(ApiError::MissingData)?;
    let submission = parse_submission(&raw)?;
    let new_user =
        new_user_from_submission(submission, image.name.clone()).map_err(ApiError::internal)?;

    let user = state.store.insert(new_user).await?;

    info!(user_id = %user.id, username = %user.username, profile_image = %user.profile_image, "user submitted");
    Ok(Json(SubmitResponse { success: true }))
}
