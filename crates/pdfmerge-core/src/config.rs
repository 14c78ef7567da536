// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Merge configuration.

use serde::{Deserialize, Serialize};

/// Settings applied to every merge.
///
/// Title, creator and subject end up verbatim in both the document-info
/// dictionary and the XMP packet of the merged document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Document title.
    pub title: String,
    /// Creator, also used as the XMP creator tool.
    pub creator: String,
    /// Subject, written as the Dublin Core description.
    pub subject: String,
    /// Reference page used to lay out image pages.
    pub paper_size: crate::PaperSize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            title: "Merged PDF".into(),
            creator: "AC Lyon".into(),
            subject: "Subject".into(),
            paper_size: crate::PaperSize::A4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: MergeConfig = serde_json::from_str(r#"{ "title": "Dossier" }"#).unwrap();
        assert_eq!(config.title, "Dossier");
        assert_eq!(config.creator, "AC Lyon");
        assert_eq!(config.subject, "Subject");
        assert_eq!(config.paper_size, crate::PaperSize::A4);
    }
}
