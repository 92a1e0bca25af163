// Role composition: base datamodel -> default layer -> named role layer
use std::path::Path;

use super::combobox::ComboboxCatalogue;
use super::error::DataModelError;
use super::overview::OverviewCatalogue;
use super::role_files::{FieldOverrides, RoleLayer};
use super::tenant_config::{TenantConfig, DEFAULT_ROLE};

/// Load a tenant version and compose the effective configuration for `role`
pub fn load_effective_config(
    base: impl AsRef<Path>,
    role: &str,
    version: u32,
) -> Result<TenantConfig, DataModelError> {
    let config = TenantConfig::load(base, version)?;
    compose(config, role)
}

/// Compose an already loaded base configuration for `role`.
///
/// The `default` layer is always applied first; a further layer is applied
/// when `role` (case-insensitive) names another role of the tenant. Unknown
/// role names compose to the default-only configuration. The role table
/// never appears in the result.
pub fn compose(mut config: TenantConfig, role: &str) -> Result<TenantConfig, DataModelError> {
    let Some(roles) = config.roles.take() else {
        tracing::debug!("Tenant config {} defines no roles, using base datamodel", config.dir().display());
        return Ok(config);
    };

    let default_files = roles.get(DEFAULT_ROLE).ok_or_else(|| DataModelError::MissingDefaultRole {
        path: config.dir().to_path_buf(),
    })?;
    let layer = default_files.load(config.dir())?;
    config = build_role(config, DEFAULT_ROLE, layer)?;

    let role = role.to_lowercase();
    if role.is_empty() {
        tracing::debug!("No role given for subject {}, using default role only", config.subject);
    } else if role != DEFAULT_ROLE {
        match roles.get(&role) {
            Some(files) => {
                let layer = files.load(config.dir())?;
                config = build_role(config, &role, layer)?;
            }
            None => {
                tracing::warn!("Role '{}' not defined for subject {}, using default role only", role, config.subject);
            }
        }
    }

    tracing::info!("Composed datamodel for subject {} version {} as role '{}'", config.subject, config.version, role);
    Ok(config)
}

/// Apply one role layer to a configuration.
///
/// Comboboxes replace whole subjects, field overrides replace individual
/// attributes that the override sets, overviews merge key by key. A layer
/// without a field file locks every field read-only.
pub fn build_role(mut config: TenantConfig, role: &str, layer: RoleLayer) -> Result<TenantConfig, DataModelError> {
    let RoleLayer { comboboxes, fields, overviews } = layer;

    // Comboboxes
    let catalogue = config.comboboxes.get_or_insert_with(ComboboxCatalogue::new);
    if let Some(comboboxes) = comboboxes {
        catalogue.merge(comboboxes);
    }

    // Fields
    match fields {
        Some(fields) => apply_field_overrides(&mut config, role, fields)?,
        None => {
            tracing::debug!("Role '{}' has no field file, all fields are readonly", role);
            config.set_readonly(true);
        }
    }

    // Overviews
    let catalogue = config.overviews.get_or_insert_with(OverviewCatalogue::new);
    if let Some(overviews) = overviews {
        catalogue.merge(overviews);
    }

    Ok(config)
}

fn apply_field_overrides(config: &mut TenantConfig, role: &str, overrides: FieldOverrides) -> Result<(), DataModelError> {
    for (record_name, record_overrides) in overrides {
        let Some(record) = config.data_model.get_mut(&record_name) else {
            return Err(DataModelError::DanglingFieldRef {
                role: role.to_string(),
                record: record_name,
                field: None,
            });
        };

        for (field_name, field_override) in record_overrides {
            let Some(field) = record.get_mut(&field_name) else {
                return Err(DataModelError::DanglingFieldRef {
                    role: role.to_string(),
                    record: record_name,
                    field: Some(field_name),
                });
            };

            field.mandatory.override_with(field_override.mandatory);
            field.readonly.override_with(field_override.readonly);
            if let Some(command) = field_override.command {
                field.set_command(Some(command));
            }
        }
    }
    Ok(())
}
