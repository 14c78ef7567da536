// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pdfmerge — Core types, configuration and error definitions shared across crates.

pub mod config;
pub mod error;
pub mod types;

pub use config::MergeConfig;
pub use error::{MergeError, MetadataError, SourceError};
pub use types::*;
