use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::combobox::ComboboxCatalogue;
use super::custom_field::{CustomField, CustomFields};
use super::error::DataModelError;
use super::overview::OverviewCatalogue;
use super::role_files::{read_json, RoleFiles};

/// Name of the base configuration file inside a versioned directory
pub const DATAMODEL_FILE: &str = "datamodel.json";

/// Role layer every composed configuration starts from
pub const DEFAULT_ROLE: &str = "default";

/// `root/tenant`, the base path all versions of a tenant hang off
pub fn tenant_path(root: impl AsRef<Path>, tenant: &str) -> PathBuf {
    root.as_ref().join(tenant)
}

/// `{base}-{version:03}`
pub fn versioned_dir(base: impl AsRef<Path>, version: u32) -> PathBuf {
    let mut dir = base.as_ref().as_os_str().to_os_string();
    dir.push(format!("-{:03}", version));
    PathBuf::from(dir)
}

/// Configuration of one tenant at one version.
///
/// Built by the loader, adjusted by role composition, then handed to a
/// single caller. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TenantConfig {
    #[serde(skip)]
    dir: PathBuf,
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub subject: String,
    #[serde(rename = "datamodel", default)]
    pub data_model: BTreeMap<String, CustomFields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<BTreeMap<String, RoleFiles>>,
    #[serde(default)]
    pub layout: Value,
    #[serde(rename = "cmbs", default, skip_serializing_if = "Option::is_none")]
    pub comboboxes: Option<ComboboxCatalogue>,
    #[serde(rename = "overview", default, skip_serializing_if = "Option::is_none")]
    pub overviews: Option<OverviewCatalogue>,
    #[serde(default)]
    pub prefix: BTreeMap<String, String>,
}

impl TenantConfig {
    /// Load `{base}-{version:03}/datamodel.json` and check it against the
    /// requested version
    pub fn load(base: impl AsRef<Path>, version: u32) -> Result<Self, DataModelError> {
        let dir = versioned_dir(base, version);
        let path = dir.join(DATAMODEL_FILE);
        tracing::debug!("Loading tenant datamodel from {}", path.display());

        let mut config: TenantConfig = read_json(&path)?;

        if config.version != version {
            return Err(DataModelError::Schema {
                path,
                reason: format!("version {} does not match requested version {}", config.version, version),
            });
        }
        if config.subject.is_empty() {
            return Err(DataModelError::Schema {
                path,
                reason: "subject is empty".to_string(),
            });
        }

        config.dir = dir;
        Ok(config)
    }

    /// Directory the config was loaded from; side files resolve against it
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn prefix(&self, key: &str) -> &str {
        self.prefix.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn record(&self, record: &str) -> Option<&CustomFields> {
        self.data_model.get(record)
    }

    pub fn field(&self, record: &str, field: &str) -> Option<&CustomField> {
        self.data_model.get(record)?.get(field)
    }

    /// Force the readonly attribute of every field of every record type
    pub fn set_readonly(&mut self, readonly: bool) {
        for field in self.data_model.values_mut().flat_map(|fields| fields.values_mut()) {
            field.set_readonly(readonly);
        }
    }

    /// Role names the tenant defines, sorted
    pub fn role_names(&self) -> Vec<String> {
        match &self.roles {
            Some(roles) => roles.keys().cloned().collect(),
            None => vec![DEFAULT_ROLE.to_string()],
        }
    }
}

/// Role names of a tenant version; `["default"]` when it defines none
pub fn role_names(base: impl AsRef<Path>, version: u32) -> Result<Vec<String>, DataModelError> {
    let config = TenantConfig::load(base.as_ref(), version)?;
    if config.roles.is_none() {
        tracing::warn!(
            "No roles found in the datamodel at {}, using default role",
            config.dir().display()
        );
    }
    Ok(config.role_names())
}

/// Naming prefix lookup; any load failure reads as an empty prefix
pub fn read_prefix(base: impl AsRef<Path>, version: u32, key: &str) -> String {
    match TenantConfig::load(base, version) {
        Ok(config) => config.prefix(key).to_string(),
        Err(e) => {
            tracing::warn!("Prefix '{}' unavailable, using empty string: {}", key, e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_datamodel(root: &Path, tenant: &str, version: u32, body: &str) -> PathBuf {
        let base = tenant_path(root, tenant);
        let dir = versioned_dir(&base, version);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(DATAMODEL_FILE), body).unwrap();
        base
    }

    #[test]
    fn test_versioned_dir_pads_version() {
        assert_eq!(versioned_dir("/cfg/acme", 1), PathBuf::from("/cfg/acme-001"));
        assert_eq!(versioned_dir("/cfg/acme", 1234), PathBuf::from("/cfg/acme-1234"));
    }

    #[test]
    fn test_load_reads_datamodel() {
        let root = tempfile::tempdir().unwrap();
        let base = write_datamodel(
            root.path(),
            "acme",
            2,
            r#"{
                "version": 2,
                "subject": "invoice",
                "datamodel": { "invoice": { "amount": { "type": "float", "mandatory": true } } },
                "layout": { "columns": 2 },
                "prefix": { "invoice": "INV" }
            }"#,
        );

        let config = TenantConfig::load(&base, 2).unwrap();
        assert_eq!(config.subject, "invoice");
        assert!(config.field("invoice", "amount").unwrap().mandatory());
        assert_eq!(config.prefix("invoice"), "INV");
        assert_eq!(config.prefix("order"), "");
        assert_eq!(config.dir(), versioned_dir(&base, 2).as_path());
        assert_eq!(config.role_names(), vec!["default".to_string()]);
    }

    #[test]
    fn test_load_accepts_textual_size() {
        let root = tempfile::tempdir().unwrap();
        let base = write_datamodel(
            root.path(),
            "acme",
            1,
            r#"{
                "version": 1,
                "subject": "invoice",
                "datamodel": { "invoice": { "note": { "type": "string", "size": "500" } } }
            }"#,
        );

        let config = TenantConfig::load(&base, 1).unwrap();
        assert_eq!(config.field("invoice", "note").unwrap().size(), Some(500));
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let err = TenantConfig::load(tenant_path(root.path(), "ghost"), 1).unwrap_err();
        assert!(matches!(err, DataModelError::NotFound { .. }));
    }

    #[test]
    fn test_version_mismatch_is_schema_error() {
        let root = tempfile::tempdir().unwrap();
        let base = write_datamodel(root.path(), "acme", 3, r#"{ "version": 2, "subject": "invoice" }"#);
        let err = TenantConfig::load(&base, 3).unwrap_err();
        assert!(matches!(err, DataModelError::Schema { .. }));
    }

    #[test]
    fn test_empty_subject_is_schema_error() {
        let root = tempfile::tempdir().unwrap();
        let base = write_datamodel(root.path(), "acme", 1, r#"{ "version": 1, "subject": "" }"#);
        let err = TenantConfig::load(&base, 1).unwrap_err();
        assert!(matches!(err, DataModelError::Schema { .. }));
    }

    #[test]
    fn test_missing_subject_is_schema_error() {
        let root = tempfile::tempdir().unwrap();
        let base = write_datamodel(root.path(), "acme", 1, r#"{ "version": 1 }"#);
        match TenantConfig::load(&base, 1).unwrap_err() {
            DataModelError::Schema { reason, .. } => assert_eq!(reason, "subject is empty"),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_version_is_schema_error() {
        let root = tempfile::tempdir().unwrap();
        let base = write_datamodel(root.path(), "acme", 1, r#"{ "subject": "invoice" }"#);
        match TenantConfig::load(&base, 1).unwrap_err() {
            DataModelError::Schema { reason, .. } => assert!(reason.contains("version 0"), "{}", reason),
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_prefix_tolerates_missing_config() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(read_prefix(tenant_path(root.path(), "ghost"), 1, "invoice"), "");
    }

    #[test]
    fn test_role_names_are_sorted() {
        let root = tempfile::tempdir().unwrap();
        let base = write_datamodel(
            root.path(),
            "acme",
            1,
            r#"{ "version": 1, "subject": "invoice", "roles": { "default": {}, "approver": {}, "customer": {} } }"#,
        );
        assert_eq!(role_names(&base, 1).unwrap(), vec!["approver", "customer", "default"]);
    }
}
