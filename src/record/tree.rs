//! Walking a record's field tree: path search and mapper substitution.
//!
//! Repeated sub-records are sequences of maps. Both walkers step into
//! every map element of such a sequence, so paths and mapper tables never
//! need index syntax.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::config::MapperConfig;

pub const DEFAULT_MAX_DEPTH: usize = 64;
pub const RICHTEXT_MAX_RUNES: usize = 1024;

const ELLIPSIS: &str = "...";

/// Display-time rewrite tables for one record type.
///
/// Each table maps a field name either to a nested table (for sub-records)
/// or to a lookup of stored value / positional index -> display value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mapper {
    #[serde(default)]
    pub combobox: Map<String, Value>,
    #[serde(default)]
    pub richtext: Map<String, Value>,
}

/// Depth-bounded mapper application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeMapper {
    max_depth: usize,
    richtext_truncation: bool,
    richtext_max_runes: usize,
}

impl Default for TreeMapper {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            richtext_truncation: true,
            richtext_max_runes: RICHTEXT_MAX_RUNES,
        }
    }
}

impl TreeMapper {
    pub fn new(max_depth: usize, richtext_truncation: bool, richtext_max_runes: usize) -> Self {
        Self {
            max_depth,
            richtext_truncation,
            richtext_max_runes,
        }
    }

    pub fn from_config(config: &MapperConfig) -> Self {
        Self::new(
            config.max_tree_depth,
            config.richtext_truncation,
            config.richtext_max_runes,
        )
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Apply both tables of `mapper` to a record's fields: combobox codes
    /// become labels, richtext values are shortened when truncation is on.
    pub fn apply_mapper(&self, fields: &mut Map<String, Value>, mapper: &Mapper) {
        self.apply(None, fields, &mapper.combobox, &|value| value);

        if self.richtext_truncation {
            self.apply(None, fields, &mapper.richtext, &|value| self.truncate_richtext(value));
        } else {
            self.apply(None, fields, &mapper.richtext, &|value| value);
        }
    }

    /// Rewrite every field named in `table`, best effort.
    ///
    /// Nested maps are walked with the field's sub-table, sequences of maps
    /// element by element with the element's position as `index`. A scalar
    /// is looked up by its text form first, then by `index`; a hit is passed
    /// through `on_substitute` and written back in place.
    pub fn apply<F>(&self, index: Option<usize>, fields: &mut Map<String, Value>, table: &Map<String, Value>, on_substitute: &F)
    where
        F: Fn(Value) -> Value,
    {
        self.apply_at(0, index, fields, table, on_substitute);
    }

    fn apply_at<F>(&self, depth: usize, index: Option<usize>, fields: &mut Map<String, Value>, table: &Map<String, Value>, on_substitute: &F)
    where
        F: Fn(Value) -> Value,
    {
        if depth > self.max_depth {
            tracing::warn!("Mapper walk stopped at depth {}", depth);
            return;
        }

        for (key, sub_table) in table {
            let Value::Object(sub_table) = sub_table else {
                continue;
            };
            let Some(value) = fields.get_mut(key) else {
                continue;
            };

            match value {
                Value::Object(nested) => {
                    self.apply_at(depth + 1, index, nested, sub_table, on_substitute);
                }
                Value::Array(items) => {
                    for (position, item) in items.iter_mut().enumerate() {
                        if let Value::Object(element) = item {
                            self.apply_at(depth + 1, Some(position), element, sub_table, on_substitute);
                        }
                    }
                }
                _ => {
                    let replacement = lookup_key(value)
                        .and_then(|key| sub_table.get(&key))
                        .or_else(|| index.and_then(|i| sub_table.get(&i.to_string())));

                    if let Some(replacement) = replacement {
                        *value = on_substitute(replacement.clone());
                    }
                }
            }
        }
    }

    /// Cut strings longer than the rune limit, marking the cut with "..."
    pub fn truncate_richtext(&self, value: Value) -> Value {
        match value {
            Value::String(text) if text.chars().count() > self.richtext_max_runes => {
                let keep = self.richtext_max_runes.saturating_sub(ELLIPSIS.len());
                let mut short: String = text.chars().take(keep).collect();
                short.push_str(ELLIPSIS);
                Value::String(short)
            }
            other => other,
        }
    }
}

/// Text form of a scalar used as mapper key
fn lookup_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(number_key(n)),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number_key(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // 2.0 is stored by some clients where 2 was meant
        Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => (f as i64).to_string(),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Call `on_match` with the containing map and field name for every field
/// at the end of `path`. Fields that exist but hold null still match.
pub fn find_json_field<F>(tree: &mut Map<String, Value>, path: &[&str], mut on_match: F)
where
    F: FnMut(&mut Map<String, Value>, &str),
{
    find_field(tree, path, &mut on_match);
}

fn find_field<F>(tree: &mut Map<String, Value>, path: &[&str], on_match: &mut F)
where
    F: FnMut(&mut Map<String, Value>, &str),
{
    let Some((first, rest)) = path.split_first() else {
        return;
    };

    if rest.is_empty() {
        if tree.contains_key(*first) {
            on_match(tree, first);
        }
        return;
    }

    match tree.get_mut(*first) {
        Some(Value::Object(nested)) => find_field(nested, rest, on_match),
        Some(Value::Array(items)) => {
            for item in items.iter_mut() {
                if let Value::Object(element) = item {
                    find_field(element, rest, on_match);
                }
            }
        }
        _ => {}
    }
}

/// First sequence found at `path`
pub fn find_json_array<'a>(tree: &'a mut Map<String, Value>, path: &[&str]) -> Option<&'a mut Vec<Value>> {
    let (first, rest) = path.split_first()?;
    let value = tree.get_mut(*first)?;

    if rest.is_empty() {
        return value.as_array_mut();
    }

    match value {
        Value::Object(nested) => find_json_array(nested, rest),
        Value::Array(items) => items
            .iter_mut()
            .filter_map(Value::as_object_mut)
            .find_map(|element| find_json_array(element, rest)),
        _ => None,
    }
}
