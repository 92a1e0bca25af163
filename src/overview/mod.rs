use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::sanitize::normalize_with_depth;
use crate::record::{AccessConfig, DomainEntity, Mapper, TreeMapper, UUID_FIELD};

/// One row handed to the overview store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataRecord {
    pub row: Map<String, Value>,
    #[serde(default)]
    pub access: Vec<AccessConfig>,
}

impl DataRecord {
    pub fn uuid(&self) -> &str {
        self.row.get(UUID_FIELD).and_then(Value::as_str).unwrap_or("")
    }
}

/// Turn stored entities into display-ready overview rows.
///
/// Each entity is normalized and mapped in place before its overview
/// projection is taken.
pub fn build_overview_rows<E, I>(entities: I, mapper: &Mapper, tree_mapper: &TreeMapper) -> Vec<DataRecord>
where
    E: DomainEntity,
    I: IntoIterator<Item = E>,
{
    let rows: Vec<DataRecord> = entities
        .into_iter()
        .map(|mut entity| {
            normalize_entity(&mut entity, tree_mapper);
            tree_mapper.apply_mapper(entity.entity_mut(), mapper);

            DataRecord {
                row: entity.overview_row(),
                access: entity.access_config(),
            }
        })
        .collect();

    tracing::info!("Built {} overview rows", rows.len());
    rows
}

fn normalize_entity<E: DomainEntity>(entity: &mut E, tree_mapper: &TreeMapper) {
    let fields = std::mem::take(entity.entity_mut());
    let normalized = normalize_with_depth(Value::Object(fields), tree_mapper.max_depth());
    if let Value::Object(fields) = normalized {
        *entity.entity_mut() = fields;
    }
}
