// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JSON upload payload — `{ "<key>": { "filename": ..., "content": <base64> } }`.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use pdfmerge_core::SourceItem;
use serde_json::Value;
use tracing::{debug, warn};

/// Turn a payload object into sources, in the order the entries appear.
///
/// Entries lacking a `filename` or `content` string are ignored; entries
/// whose content is not valid base64 are skipped with a warning.
pub fn sources_from_json(json: &str) -> Result<Vec<SourceItem>, serde_json::Error> {
    let entries: serde_json::Map<String, Value> = serde_json::from_str(json)?;
    let mut sources = Vec::with_capacity(entries.len());

    for (key, entry) in &entries {
        let filename = entry.get("filename").and_then(Value::as_str);
        let content = entry.get("content").and_then(Value::as_str);
        let (Some(filename), Some(content)) = (filename, content) else {
            debug!(key, "Payload entry without filename or content ignored");
            continue;
        };

        match STANDARD.decode(content.trim()) {
            Ok(bytes) => sources.push(SourceItem::from_bytes(Some(filename.to_owned()), bytes)),
            Err(err) => warn!(key, filename, error = %err, "Payload entry is not valid base64"),
        }
    }

    Ok(sources)
}
