//! Public API directory models
//!
//! Field names follow the upstream directory so responses pass entries through unchanged.

use serde::{Deserialize, Serialize};

/// One entry of the public API directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiEntry {
    #[serde(rename = "API")]
    pub api: String,
    #[serde(rename = "Description", default)]
    pub description: String,
    #[serde(rename = "Auth", default)]
    pub auth: String,
    #[serde(rename = "HTTPS", default)]
    pub https: bool,
    #[serde(rename = "Cors", default)]
    pub cors: String,
    #[serde(rename = "Link", default)]
    pub link: String,
    #[serde(rename = "Category", default)]
    pub category: String,
}

/// Upstream payload; `entries` is `null` when the directory is empty
#[derive(Debug, Deserialize)]
pub struct CatalogPayload {
    #[serde(default)]
    pub entries: Option<Vec<ApiEntry>>,
}

/// `GET /api/publicapis` query string
///
/// `limit` stays a string so a non-numeric value maps to our own 400 message.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub count: usize,
    pub entries: Vec<ApiEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_with_null_entries() {
        let payload: CatalogPayload =
            serde_json::from_str(r#"{"count": 0, "entries": null}"#).unwrap();
        assert!(payload.entries.is_none());
    }

    #[test]
    fn test_entry_keeps_upstream_field_names() {
        let raw = r#"{
            "API": "Cat Facts",
            "Description": "Daily cat facts",
            "Auth": "",
            "HTTPS": true,
            "Cors": "no",
            "Link": "https://alexwohlbruck.github.io/cat-facts/",
            "Category": "Animals"
        }"#;
        let entry: ApiEntry = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.api, "Cat Facts");
        assert!(entry.https);

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["Category"], "Animals");
        assert_eq!(value["API"], "Cat Facts");
    }
}
