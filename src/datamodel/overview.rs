use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Row-level command of an overview grid, unique by `action`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewCommand {
    pub action: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub field: String,
}

/// Column definition of an overview grid, unique by `name`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewColumn {
    pub name: String,
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// Commands and columns of one subject's overview
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverviewSubject {
    #[serde(rename = "command", default)]
    pub commands: Vec<OverviewCommand>,
    #[serde(rename = "overview", default)]
    pub columns: Vec<OverviewColumn>,
}

impl OverviewSubject {
    /// Layer `source` on top of this subject. Entries whose key already
    /// exists are replaced in place, new keys are appended.
    pub fn merge(&mut self, source: OverviewSubject) {
        merge_by_key(&mut self.commands, source.commands, |c| c.action.clone());
        merge_by_key(&mut self.columns, source.columns, |c| c.name.clone());
    }

    pub fn command(&self, action: &str) -> Option<&OverviewCommand> {
        self.commands.iter().find(|c| c.action == action)
    }

    pub fn column(&self, name: &str) -> Option<&OverviewColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

fn merge_by_key<T, K, F>(target: &mut Vec<T>, source: Vec<T>, key: F)
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    for item in source {
        let item_key = key(&item);
        match target.iter_mut().find(|existing| key(&**existing) == item_key) {
            Some(existing) => *existing = item,
            None => target.push(item),
        }
    }
}

/// Overview definitions of a tenant, keyed by subject
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverviewCatalogue(BTreeMap<String, OverviewSubject>);

impl OverviewCatalogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(&self, subject: &str) -> Option<&OverviewSubject> {
        self.0.get(subject)
    }

    pub fn insert(&mut self, subject: impl Into<String>, overview: OverviewSubject) {
        self.0.insert(subject.into(), overview);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge every subject of `other` into this catalogue
    pub fn merge(&mut self, other: OverviewCatalogue) {
        for (subject, overview) in other.0 {
            self.0.entry(subject).or_default().merge(overview);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn command(action: &str, icon: &str) -> OverviewCommand {
        OverviewCommand {
            action: action.to_string(),
            icon: icon.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_replacing_command_keeps_position() {
        let mut subject = OverviewSubject {
            commands: vec![command("create", "plus"), command("open", "eye"), command("remove", "bin")],
            columns: vec![],
        };

        subject.merge(OverviewSubject {
            commands: vec![command("open", "folder")],
            columns: vec![],
        });

        assert_eq!(subject.commands.len(), 3);
        assert_eq!(subject.commands[1].action, "open");
        assert_eq!(subject.commands[1].icon, "folder");
    }

    #[test]
    fn test_new_entries_are_appended() {
        let mut subject: OverviewSubject = serde_json::from_value(json!({
            "command": [{ "action": "open" }],
            "overview": [{ "name": "default", "columns": ["a"] }]
        }))
        .unwrap();

        subject.merge(
            serde_json::from_value(json!({
                "command": [{ "action": "printPdf", "icon": "pdf" }],
                "overview": [{ "name": "default", "columns": ["b"] }, { "name": "archive" }]
            }))
            .unwrap(),
        );

        let actions: Vec<_> = subject.commands.iter().map(|c| c.action.as_str()).collect();
        assert_eq!(actions, vec!["open", "printPdf"]);
        assert_eq!(subject.columns.len(), 2);
        assert_eq!(subject.column("default").unwrap().settings["columns"], json!(["b"]));
    }

    #[test]
    fn test_catalogue_merge_keeps_base_subjects() {
        let mut base = OverviewCatalogue::new();
        base.insert("invoice", OverviewSubject { commands: vec![command("open", "eye")], columns: vec![] });
        base.insert("user", OverviewSubject::default());

        let mut layer = OverviewCatalogue::new();
        layer.insert("invoice", OverviewSubject { commands: vec![command("remove", "bin")], columns: vec![] });
        layer.insert("partner", OverviewSubject::default());

        base.merge(layer);

        assert_eq!(base.len(), 3);
        assert_eq!(base.subject("invoice").unwrap().commands.len(), 2);
        assert!(base.subject("invoice").unwrap().command("open").is_some());
    }
}
