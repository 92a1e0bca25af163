use axum::extract::{rejection::JsonRejection, Extension, Json};
use std::sync::Arc;

use crate::middleware::{ApiResponse, ApiResult, UserIdentity};
use crate::record::Record;
use crate::services::DatamodelService;

/// POST /api/record/prepare - sanitize a record and make sure it carries an identifier
pub async fn record_prepare(
    identity: UserIdentity,
    Extension(service): Extension<Arc<DatamodelService>>,
    payload: Result<Json<Record>, JsonRejection>,
) -> ApiResult<Record> {
    let Json(mut record) = payload?;

    if record.metadata.role.is_empty() {
        record.metadata.role = identity.role;
    }

    let record = service.prepare_record(record)?;
    tracing::debug!("Prepared record {} for tenant '{}'", record.uuid(), identity.tenant);
    Ok(ApiResponse::success(record))
}
