use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use super::error::DataModelError;
use super::role_files::read_json;
use super::tenant_config::{versioned_dir, DEFAULT_ROLE};

pub const MENU_FILE: &str = "menu-struct.json";

/// Allowed menu entries of a role: item name -> allowed sub-item names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Menu {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub menu: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItemConfig {
    pub name: String,
    pub route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    /// The web client renders a single sub-level only
    #[serde(rename = "items", default, skip_serializing_if = "Vec::is_empty")]
    pub sub_items: Vec<MenuItemConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfig {
    #[serde(rename = "config", default)]
    pub items: Vec<MenuItemConfig>,
    #[serde(default)]
    pub roles: BTreeMap<String, Menu>,
}

impl MenuConfig {
    /// Load `{base}-{version:03}/menu-struct.json`
    pub fn load(base: impl AsRef<Path>, version: u32) -> Result<Self, DataModelError> {
        read_json(&versioned_dir(base, version).join(MENU_FILE))
    }

    /// Menu items visible to `role`: the default role's entries plus the
    /// role's own
    pub fn create_menu_by_role(&self, role: &str) -> Vec<MenuItemConfig> {
        let empty = Menu::default();
        let default_menu = self.roles.get(DEFAULT_ROLE).unwrap_or(&empty);
        let role_menu = self.roles.get(&role.to_lowercase()).unwrap_or(&empty);

        let menu = merge_menus(default_menu, role_menu);
        self.filter_menu_items(&menu)
    }

    fn filter_menu_items(&self, menu: &Menu) -> Vec<MenuItemConfig> {
        let mut result = Vec::new();

        for item in &self.items {
            let Some(allowed) = menu.menu.get(&item.name) else {
                continue;
            };

            if item.sub_items.is_empty() {
                result.push(item.clone());
                continue;
            }

            let allowed: HashSet<&str> = allowed.iter().map(String::as_str).collect();
            let mut filtered = item.clone();
            filtered.sub_items.retain(|sub| allowed.contains(sub.name.as_str()));
            result.push(filtered);
        }

        result
    }
}

/// Union of both menus per key, first occurrence wins, empty lists kept
fn merge_menus(a: &Menu, b: &Menu) -> Menu {
    let mut result = Menu::default();

    for source in [&a.menu, &b.menu] {
        for (key, items) in source {
            let merged = result.menu.entry(key.clone()).or_default();
            for item in items {
                if !merged.contains(item) {
                    merged.push(item.clone());
                }
            }
        }
    }

    result
}
