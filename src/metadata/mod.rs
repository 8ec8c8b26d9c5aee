//! Content-addressed lot metadata.
//!
//! A lot may point at a JSON document by content hash. The document is
//! optional decoration: a missing document or a missing field never fails
//! the event that references it.

use crate::domain::{LotInfo, LotKey};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub mod gateway;

pub use gateway::GatewayMetadataResolver;

/// Fetches the JSON document stored under a content hash.
#[async_trait]
pub trait MetadataResolver: Send + Sync + fmt::Debug {
    /// Returns `None` when the document is unavailable or not JSON.
    async fn fetch(&self, hash: &str) -> Option<Value>;
}

/// Parsed descriptive fields of a lot metadata document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LotMetadata {
    pub name: Option<String>,
    pub description: Option<String>,
    pub links: BTreeMap<String, String>,
}

impl LotMetadata {
    pub fn into_info(self, hash: &str, lot: LotKey) -> LotInfo {
        LotInfo {
            id: hash.to_string(),
            lot,
            name: self.name,
            description: self.description,
            links: self.links,
        }
    }
}

/// Extract name, description and links, omitting whatever is absent.
///
/// Links may be a `{title: url}` object or a list of `{title, url}` entries;
/// entries without a string url are dropped.
pub fn parse_lot_metadata(document: &Value) -> LotMetadata {
    let text = |field: &str| {
        document
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    let mut links = BTreeMap::new();
    match document.get("links") {
        Some(Value::Object(map)) => {
            for (title, url) in map {
                if let Some(url) = url.as_str() {
                    links.insert(title.clone(), url.to_string());
                }
            }
        }
        Some(Value::Array(entries)) => {
            for entry in entries {
                let title = entry.get("title").and_then(Value::as_str);
                let url = entry.get("url").and_then(Value::as_str);
                if let (Some(title), Some(url)) = (title, url) {
                    links.insert(title.to_string(), url.to_string());
                }
            }
        }
        _ => {}
    }

    LotMetadata {
        name: text("name"),
        description: text("description"),
        links,
    }
}

/// Resolver backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataResolver {
    documents: HashMap<String, Value>,
}

impl StaticMetadataResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, hash: &str, document: Value) -> Self {
        self.documents.insert(hash.to_string(), document);
        self
    }
}

#[async_trait]
impl MetadataResolver for StaticMetadataResolver {
    async fn fetch(&self, hash: &str) -> Option<Value> {
        self.documents.get(hash).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_full_document() {
        let metadata = parse_lot_metadata(&json!({
            "name": "Launch",
            "description": "Token launch",
            "links": { "website": "https://example.org", "x": "https://x.com/launch" }
        }));
        assert_eq!(metadata.name.as_deref(), Some("Launch"));
        assert_eq!(metadata.description.as_deref(), Some("Token launch"));
        assert_eq!(metadata.links.len(), 2);
        assert_eq!(metadata.links["website"], "https://example.org");
    }

    #[test]
    fn test_parse_omits_missing_fields() {
        let metadata = parse_lot_metadata(&json!({ "name": 42 }));
        assert_eq!(metadata, LotMetadata::default());
    }

    #[test]
    fn test_parse_link_list() {
        let metadata = parse_lot_metadata(&json!({
            "links": [
                { "title": "docs", "url": "https://docs.example.org" },
                { "title": "broken" }
            ]
        }));
        assert_eq!(metadata.links.len(), 1);
        assert_eq!(metadata.links["docs"], "https://docs.example.org");
    }

    #[tokio::test]
    async fn test_static_resolver() {
        let resolver = StaticMetadataResolver::new().with_document("Qm1", json!({ "name": "A" }));
        assert!(resolver.fetch("Qm1").await.is_some());
        assert!(resolver.fetch("Qm2").await.is_none());
    }
}
