use axum::extract::{rejection::JsonRejection, Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

use crate::middleware::{ApiResponse, ApiResult};
use crate::overview::DataRecord;
use crate::record::{Mapper, Record};
use crate::services::DatamodelService;

#[derive(Debug, Deserialize)]
pub struct OverviewRowsRequest {
    #[serde(default)]
    pub records: Vec<Record>,
    #[serde(default)]
    pub mapper: Mapper,
}

/// POST /api/overview/rows - display-ready overview rows for a batch of records
pub async fn overview_rows(
    Extension(service): Extension<Arc<DatamodelService>>,
    payload: Result<Json<OverviewRowsRequest>, JsonRejection>,
) -> ApiResult<Vec<DataRecord>> {
    let Json(request) = payload?;
    let rows = service.overview_rows(request.records, &request.mapper);
    Ok(ApiResponse::success(rows))
}
