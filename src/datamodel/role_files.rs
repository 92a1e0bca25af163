use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::combobox::ComboboxCatalogue;
use super::custom_field::Flag;
use super::error::DataModelError;
use super::overview::OverviewCatalogue;

/// Side files a role layers onto the base configuration. Each name is
/// relative to the versioned config directory; an empty name means the
/// role defines nothing of that kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleFiles {
    #[serde(rename = "combobox", default)]
    pub combobox_file: String,
    #[serde(rename = "overview", default)]
    pub overview_file: String,
    #[serde(rename = "field", default)]
    pub field_file: String,
}

/// Per-field override from a role's field file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOverride {
    #[serde(default, skip_serializing_if = "Flag::is_unset")]
    pub mandatory: Flag,
    #[serde(default, skip_serializing_if = "Flag::is_unset")]
    pub readonly: Flag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

/// Overrides of one record type, keyed by field name
pub type RecordOverrides = BTreeMap<String, FieldOverride>;

/// Contents of a role field file, keyed by record type
pub type FieldOverrides = BTreeMap<String, RecordOverrides>;

/// Everything one role contributes, already read from disk
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoleLayer {
    pub comboboxes: Option<ComboboxCatalogue>,
    pub fields: Option<FieldOverrides>,
    pub overviews: Option<OverviewCatalogue>,
}

impl RoleFiles {
    /// Read every side file this role names from `dir`
    pub fn load(&self, dir: &Path) -> Result<RoleLayer, DataModelError> {
        Ok(RoleLayer {
            comboboxes: load_comboboxes(dir, &self.combobox_file)?,
            fields: load_fields(dir, &self.field_file)?,
            overviews: load_overviews(dir, &self.overview_file)?,
        })
    }
}

pub fn load_comboboxes(dir: &Path, file_name: &str) -> Result<Option<ComboboxCatalogue>, DataModelError> {
    load_side_file(dir, file_name)
}

pub fn load_fields(dir: &Path, file_name: &str) -> Result<Option<FieldOverrides>, DataModelError> {
    load_side_file(dir, file_name)
}

pub fn load_overviews(dir: &Path, file_name: &str) -> Result<Option<OverviewCatalogue>, DataModelError> {
    load_side_file(dir, file_name)
}

fn load_side_file<T: DeserializeOwned>(dir: &Path, file_name: &str) -> Result<Option<T>, DataModelError> {
    if file_name.is_empty() {
        return Ok(None);
    }
    read_json(&dir.join(file_name)).map(Some)
}

/// Read and parse one JSON config file
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataModelError> {
    let content = std::fs::read_to_string(path).map_err(|e| DataModelError::from_io(path, e))?;
    serde_json::from_str(&content).map_err(|source| DataModelError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}
