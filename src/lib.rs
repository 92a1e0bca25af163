pub mod config;
pub mod datamodel;
pub mod error;
pub mod handlers;
pub mod identifier;
pub mod middleware;
pub mod overview;
pub mod record;
pub mod services;

// Collaborator surface for persistence and transport layers
pub use datamodel::{load_effective_config, DataModelError, TenantConfig};
pub use identifier::{ensure_identifier, generate as new_identifier};
pub use record::{apply_mapper_to_record, sanitize_record, DomainEntity, Mapper, Record};
