use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One selectable entry of a combobox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combobox {
    pub id: String,
    pub value: String,
}

/// Where a combobox gets its content from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComboboxType {
    Static,
    Api,
    #[serde(rename = "self")]
    SelfRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantCombobox {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translate: Option<bool>,
    #[serde(default)]
    pub content: Vec<Combobox>,
    /// Endpoint for dynamic content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ComboboxType>,
}

impl TenantCombobox {
    pub fn combobox_type(&self) -> ComboboxType {
        self.kind.unwrap_or(ComboboxType::Static)
    }

    pub fn label(&self, id: &str) -> Option<&str> {
        self.content.iter().find(|c| c.id == id).map(|c| c.value.as_str())
    }
}

/// Comboboxes of one subject, keyed by field name
pub type ComboboxList = BTreeMap<String, TenantCombobox>;

/// Combobox definitions of a tenant, keyed by subject
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComboboxCatalogue(BTreeMap<String, ComboboxList>);

impl ComboboxCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(&self, subject: &str) -> Option<&ComboboxList> {
        self.0.get(subject)
    }

    pub fn get(&self, subject: &str, field: &str) -> Option<&TenantCombobox> {
        self.0.get(subject)?.get(field)
    }

    pub fn insert(&mut self, subject: impl Into<String>, list: ComboboxList) {
        self.0.insert(subject.into(), list);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn subjects(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Layer `other` on top: each of its subjects replaces the existing
    /// subject wholesale, fields are never merged individually.
    pub fn merge(&mut self, other: ComboboxCatalogue) {
        for (subject, list) in other.0 {
            self.0.insert(subject, list);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalogue(value: serde_json::Value) -> ComboboxCatalogue {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_type_defaults_to_static() {
        let cmb: TenantCombobox = serde_json::from_value(json!({
            "name": "userPartner",
            "content": [],
            "source": "/app-config/api/partner/cmbs/userPartner"
        }))
        .unwrap();
        assert_eq!(cmb.combobox_type(), ComboboxType::Static);

        let cmb: TenantCombobox =
            serde_json::from_value(json!({ "name": "me", "type": "self" })).unwrap();
        assert_eq!(cmb.combobox_type(), ComboboxType::SelfRef);
    }

    #[test]
    fn test_merge_replaces_whole_subject() {
        let mut base = catalogue(json!({
            "invoice": {
                "status": { "name": "status", "content": [{ "id": "A", "value": "Active" }] },
                "team": { "name": "team", "content": [] }
            },
            "user": { "role": { "name": "role", "content": [] } }
        }));
        let layer = catalogue(json!({
            "invoice": {
                "status": { "name": "status", "content": [{ "id": "C", "value": "Closed" }] }
            }
        }));

        base.merge(layer);

        assert_eq!(base.len(), 2);
        assert!(base.get("invoice", "team").is_none(), "subject must be replaced, not merged");
        assert_eq!(base.get("invoice", "status").and_then(|c| c.label("C")), Some("Closed"));
        assert!(base.get("user", "role").is_some());
    }
}
