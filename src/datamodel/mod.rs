pub mod combobox;
pub mod compose;
pub mod custom_field;
pub mod error;
pub mod menu;
pub mod overview;
pub mod role_files;
pub mod tenant_config;

pub use combobox::{Combobox, ComboboxCatalogue, ComboboxList, ComboboxType, TenantCombobox};
pub use compose::{build_role, compose, load_effective_config};
pub use custom_field::{CustomField, CustomFields, FieldType, Flag};
pub use error::DataModelError;
pub use menu::{Menu, MenuConfig, MenuItemConfig};
pub use overview::{OverviewCatalogue, OverviewColumn, OverviewCommand, OverviewSubject};
pub use role_files::{FieldOverride, FieldOverrides, RoleFiles, RoleLayer};
pub use tenant_config::{read_prefix, role_names, tenant_path, versioned_dir, TenantConfig, DEFAULT_ROLE};
