use axum::extract::{Extension, Path, Query};
use serde::Deserialize;
use std::sync::Arc;

use crate::datamodel::TenantConfig;
use crate::middleware::{ApiResponse, ApiResult, UserIdentity};
use crate::services::DatamodelService;

#[derive(Debug, Deserialize)]
pub struct DatamodelQuery {
    /// Record type that receives a fresh identifier
    pub root: Option<String>,
}

/// GET /api/datamodel/:tenant/:version - effective configuration for the caller's role
pub async fn datamodel_get(
    Path((tenant, version)): Path<(String, u32)>,
    Query(query): Query<DatamodelQuery>,
    identity: UserIdentity,
    Extension(service): Extension<Arc<DatamodelService>>,
) -> ApiResult<TenantConfig> {
    let config = tokio::task::spawn_blocking(move || {
        service.effective_config(&tenant, &identity.role, version, query.root.as_deref())
    })
    .await??;

    Ok(ApiResponse::success(config))
}

/// GET /api/roles/:tenant/:version - role names the tenant defines
pub async fn roles_get(
    Path((tenant, version)): Path<(String, u32)>,
    Extension(service): Extension<Arc<DatamodelService>>,
) -> ApiResult<Vec<String>> {
    let roles = tokio::task::spawn_blocking(move || service.roles(&tenant, version)).await??;
    Ok(ApiResponse::success(roles))
}
