//! Mailman configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::inline::InlinerOptions;
use crate::mail::Address;

/// Configuration for [`Mailman`](crate::mail::Mailman).
///
/// Every field has a default, so `{}` is a valid configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailmanConfig {
    pub css: CssConfig,
    /// Default sender for every message.
    pub from: Option<Address>,
    /// Log messages instead of delivering them.
    pub pretend: bool,
    pub inliner: InlinerOptions,
}

/// Where email stylesheets live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssConfig {
    /// Folder that stylesheet names are resolved against (default: `resources/css`).
    #[serde(default = "default_folder")]
    pub folder: PathBuf,

    /// Stylesheet used when a message does not pick one (default: `email.css`).
    #[serde(default = "default_file")]
    pub file: String,
}

fn default_folder() -> PathBuf {
    PathBuf::from("resources/css")
}

fn default_file() -> String {
    "email.css".to_string()
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            file: default_file(),
        }
    }
}

impl MailmanConfig {
    /// Parse configuration from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }
}
