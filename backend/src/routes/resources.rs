use std::{str::FromStr, sync::Arc};

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use upload_storage::Namespace;

use crate::{
    types::AppError,
    upload_issuance::{IssuedUpload, UploadIssuers},
};

/// Returned when the path names a namespace with no scoped upload route
pub const UNKNOWN_NAMESPACE: &str = "Unknown upload namespace";

/// Query parameters for an upload URL
///
/// Both fields are optional at the extractor so that a missing value is
/// reported with the API's own error body instead of a deserialization error.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlQuery {
    /// Client file name; only its extension is kept
    pub file_name: Option<String>,
    /// MIME type the client will upload with, e.g. `image/png`
    pub file_type: Option<String>,
}

/// Owner of a scoped upload
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityUploadPath {
    /// One of `list-items`, `profiles`, `notes`
    pub namespace: String,
    /// Id of the owning record
    pub entity_id: String,
}

/// Issued upload URL
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    /// Always `true`; failures use the error body
    pub success: bool,
    /// URL to PUT the file to, with `Content-Type` equal to `fileType`
    pub presigned_url: String,
    /// Where the object can be read once uploaded
    pub file_url: String,
    /// Object key to persist on the owning record
    pub key: String,
    /// When `presignedUrl` stops working, ISO-8601 UTC
    pub expires_at: String,
}

impl From<IssuedUpload> for UploadUrlResponse {
    fn from(issued: IssuedUpload) -> Self {
        Self {
            success: true,
            presigned_url: issued.presigned_url,
            file_url: issued.file_url,
            key: issued.key.into_string(),
            expires_at: issued.expires_at.to_rfc3339(),
        }
    }
}

/// Issue a presigned upload URL for a generic image
///
/// # Errors
///
/// - `400 BAD_REQUEST` - `fileName` or `fileType` missing, or `fileType` is not a MIME type
/// - `500 INTERNAL_SERVER_ERROR` - URL could not be signed
#[instrument(skip(issuers, query))]
pub async fn create_upload_url(
    Extension(issuers): Extension<Arc<UploadIssuers>>,
    Query(query): Query<UploadUrlQuery>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let issued = issuers.for_namespace(Namespace::Uploads).issue_upload_url(
        Namespace::Uploads,
        &[],
        query.file_name.as_deref().unwrap_or_default(),
        query.file_type.as_deref().unwrap_or_default(),
    )?;

    Ok(Json(issued.into()))
}

/// Issue a presigned upload URL for an image owned by a record
///
/// The key is placed under `{namespace}/{entityId}/images/`.
///
/// # Errors
///
/// - `400 BAD_REQUEST` - unknown namespace, invalid entity id, or bad query parameters
/// - `500 INTERNAL_SERVER_ERROR` - URL could not be signed
#[instrument(skip(issuers, query))]
pub async fn create_entity_upload_url(
    Extension(issuers): Extension<Arc<UploadIssuers>>,
    Path(path): Path<EntityUploadPath>,
    Query(query): Query<UploadUrlQuery>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let Some(namespace) = Namespace::from_str(&path.namespace)
        .ok()
        .filter(|ns| *ns != Namespace::Uploads)
    else {
        return Err(AppError::bad_request(UNKNOWN_NAMESPACE));
    };

    let issued = issuers.for_namespace(namespace).issue_upload_url(
        namespace,
        &[path.entity_id.as_str()],
        query.file_name.as_deref().unwrap_or_default(),
        query.file_type.as_deref().unwrap_or_default(),
    )?;

    Ok(Json(issued.into()))
}
