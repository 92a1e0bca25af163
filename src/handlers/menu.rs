use axum::extract::{Extension, Path};
use std::sync::Arc;

use crate::datamodel::MenuItemConfig;
use crate::middleware::{ApiResponse, ApiResult, UserIdentity};
use crate::services::DatamodelService;

/// GET /api/menu/:tenant/:version - menu items visible to the caller's role
pub async fn menu_get(
    Path((tenant, version)): Path<(String, u32)>,
    identity: UserIdentity,
    Extension(service): Extension<Arc<DatamodelService>>,
) -> ApiResult<Vec<MenuItemConfig>> {
    let menu = tokio::task::spawn_blocking(move || service.menu(&tenant, version, &identity.role)).await??;
    Ok(ApiResponse::success(menu))
}
