use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::datamodel::{load_effective_config, role_names, tenant_path, DataModelError, MenuConfig, MenuItemConfig, TenantConfig};
use crate::identifier::{self, ensure_identifier};
use crate::overview::{build_overview_rows, DataRecord};
use crate::record::sanitize::clean_nil_with_depth;
use crate::record::{Mapper, Record, TreeMapper, UUID_FIELD};

/// Entry point for the HTTP layer: resolves tenants under the config root
/// and runs composition, mapping and record preparation with one set of
/// mapper settings.
#[derive(Debug, Clone)]
pub struct DatamodelService {
    config_root: PathBuf,
    tree_mapper: TreeMapper,
}

impl DatamodelService {
    pub fn new(config_root: impl Into<PathBuf>, tree_mapper: TreeMapper) -> Self {
        Self {
            config_root: config_root.into(),
            tree_mapper,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.assets.config_root.clone(), TreeMapper::from_config(&config.mapper))
    }

    pub fn config_root(&self) -> &Path {
        &self.config_root
    }

    /// Base path of a tenant. Tenant names are single path components.
    fn tenant_base(&self, tenant: &str) -> Result<PathBuf, DataModelError> {
        if tenant.is_empty() || tenant == "." || tenant == ".." || tenant.contains(['/', '\\']) {
            return Err(DataModelError::InvalidTenant(tenant.to_string()));
        }
        Ok(tenant_path(&self.config_root, tenant))
    }

    /// Effective configuration of a tenant version for `role`.
    ///
    /// With `root`, the named record type gets a freshly minted identifier
    /// as the value of its `uuid` field, ready for a new document.
    pub fn effective_config(
        &self,
        tenant: &str,
        role: &str,
        version: u32,
        root: Option<&str>,
    ) -> Result<TenantConfig, DataModelError> {
        let base = self.tenant_base(tenant)?;
        let mut config = load_effective_config(&base, role, version)?;

        if let Some(root) = root {
            let subject = config.subject.clone();
            let fields = config.data_model.get_mut(root).ok_or_else(|| DataModelError::UnknownRecord {
                subject,
                record: root.to_string(),
            })?;
            fields.set_value(UUID_FIELD, Value::String(identifier::generate()?));
        }

        Ok(config)
    }

    pub fn roles(&self, tenant: &str, version: u32) -> Result<Vec<String>, DataModelError> {
        role_names(self.tenant_base(tenant)?, version)
    }

    pub fn menu(&self, tenant: &str, version: u32, role: &str) -> Result<Vec<MenuItemConfig>, DataModelError> {
        let menu = MenuConfig::load(self.tenant_base(tenant)?, version)?;
        Ok(menu.create_menu_by_role(role))
    }

    /// Sanitize a record for storage and make sure it has an identifier
    pub fn prepare_record(&self, mut record: Record) -> Result<Record, DataModelError> {
        record.fields = clean_nil_with_depth(std::mem::take(&mut record.fields), self.tree_mapper.max_depth());
        ensure_identifier(&mut record)?;
        Ok(record)
    }

    pub fn overview_rows(&self, records: Vec<Record>, mapper: &Mapper) -> Vec<DataRecord> {
        build_overview_rows(records, mapper, &self.tree_mapper)
    }
}
