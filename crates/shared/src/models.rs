use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One section of the day's content: either a single passage or a list of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionValue {
    Text(String),
    List(Vec<String>),
}

impl SectionValue {
    pub fn is_blank(&self) -> bool {
        match self {
            SectionValue::Text(text) => text.trim().is_empty(),
            SectionValue::List(items) => items.iter().all(|item| item.trim().is_empty()),
        }
    }
}

/// The day's editorial content, keyed by section name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentRecord {
    sections: BTreeMap<String, SectionValue>,
}

impl ContentRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&SectionValue> {
        self.sections.get(key)
    }

    pub fn set_text(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.sections
            .insert(key.into(), SectionValue::Text(text.into()));
    }

    pub fn set_list<I, S>(&mut self, key: impl Into<String>, items: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sections.insert(
            key.into(),
            SectionValue::List(items.into_iter().map(Into::into).collect()),
        );
    }

    pub fn insert(&mut self, key: impl Into<String>, value: SectionValue) {
        self.sections.insert(key.into(), value);
    }
}

/// A link from the history page to one archived day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveIndexEntry {
    /// Localised display date, e.g. "2026年2月23日 周一".
    pub date: String,
    /// Path relative to the output directory, e.g. "archive/2026-02-23.html".
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakingNewsItem {
    pub id: String,
    pub title: String,
    /// Local time as "YYYY-MM-DD HH:MM".
    pub time: String,
    pub category: String,
    pub urgency: Urgency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Rolling list of recent headlines, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakingNewsStore {
    #[serde(default)]
    pub last_update: String,
    #[serde(default)]
    pub breaking_news: Vec<BreakingNewsItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_record_accepts_strings_and_lists() {
        let record: ContentRecord =
            serde_json::from_str(r#"{"stock": "flat", "tech": ["a", "b"]}"#).unwrap();

        assert_eq!(
            record.get("stock"),
            Some(&SectionValue::Text("flat".to_string()))
        );
        assert_eq!(
            record.get("tech"),
            Some(&SectionValue::List(vec!["a".to_string(), "b".to_string()]))
        );
    }

    #[test]
    fn test_blank_sections() {
        assert!(SectionValue::Text("  ".to_string()).is_blank());
        assert!(SectionValue::List(vec![]).is_blank());
        assert!(SectionValue::List(vec![String::new()]).is_blank());
        assert!(!SectionValue::List(vec!["x".to_string()]).is_blank());
    }

    #[test]
    fn test_store_uses_camel_case_keys() {
        let store = BreakingNewsStore {
            last_update: "2026-02-23T08:00:00+08:00".to_string(),
            breaking_news: vec![BreakingNewsItem {
                id: "1".to_string(),
                title: "标题".to_string(),
                time: "2026-02-23 07:30".to_string(),
                category: "国际".to_string(),
                urgency: Urgency::High,
                url: None,
            }],
        };

        let json = serde_json::to_string(&store).unwrap();
        assert!(json.contains("\"lastUpdate\""));
        assert!(json.contains("\"breakingNews\""));
        assert!(json.contains("\"urgency\":\"high\""));
        assert!(!json.contains("\"url\""));
    }

    #[test]
    fn test_store_tolerates_missing_fields() {
        let store: BreakingNewsStore = serde_json::from_str("{}").unwrap();
        assert!(store.breaking_news.is_empty());
        assert!(store.last_update.is_empty());
    }
}
