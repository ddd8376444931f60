//! JSON rendering of a page record.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use sitedoc_shared::{NodeIndex, PageRecord, Result, SiteDocError};

#[derive(Serialize)]
struct JsonDocument<'a> {
    node: &'a str,
    generated_at: String,
    #[serde(flatten)]
    record: &'a PageRecord,
}

/// Render `record` as a pretty-printed JSON document.
pub fn render_json(record: &PageRecord, index: &NodeIndex, generated_at: DateTime<Utc>) -> Result<String> {
    let document = JsonDocument {
        node: index.as_str(),
        generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        record,
    };

    serde_json::to_string_pretty(&document)
        .map(|json| json + "\n")
        .map_err(|e| SiteDocError::Render(format!("JSON serialization failed: {e}")))
}
