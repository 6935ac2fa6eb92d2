//! Inliner configuration.

use serde::{Deserialize, Serialize};

/// Configuration for [`StyleInliner`](super::StyleInliner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InlinerOptions {
    /// Remove `<style>` elements already present in the document.
    /// Default is true.
    pub strip_style_tags: bool,
    /// Keep `@media` blocks (from the supplied stylesheet and from stripped
    /// `<style>` elements) in a `<style>` element, since they cannot be
    /// inlined. Default is true.
    pub preserve_media_queries: bool,
    /// Reject HTML larger than this many bytes.
    pub max_input_bytes: Option<usize>,
}

impl Default for InlinerOptions {
    fn default() -> Self {
        Self {
            strip_style_tags: true,
            preserve_media_queries: true,
            max_input_bytes: None,
        }
    }
}

impl InlinerOptions {
    pub fn strip_style_tags(mut self, strip: bool) -> Self {
        self.strip_style_tags = strip;
        self
    }

    pub fn preserve_media_queries(mut self, preserve: bool) -> Self {
        self.preserve_media_queries = preserve;
        self
    }

    pub fn max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = Some(limit);
        self
    }
}
