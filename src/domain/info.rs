//! Auxiliary lot information resolved from content-addressed metadata.

use super::identity::LotKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptive record keyed by the content hash it was resolved from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotInfo {
    pub id: String,
    pub lot: LotKey,
    pub name: Option<String>,
    pub description: Option<String>,
    pub links: BTreeMap<String, String>,
}
