//! WASM bindings for browser-based CSS inlining.
//!
//! This module exposes the inliner to JavaScript via wasm-bindgen.

use wasm_bindgen::prelude::*;

use crate::inline::{InlinerOptions, StyleInliner};

/// Initialize panic hook for better error messages in the browser console.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Inline `css` into `html` with default options.
#[wasm_bindgen]
pub fn inline_css(html: &str, css: &str) -> Result<String, JsValue> {
    crate::inline::convert(html, css).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Inline `css` into `html`.
///
/// `options` is a JSON object with the same fields as [`InlinerOptions`],
/// for example `{"strip_style_tags": false}`.
#[wasm_bindgen]
pub fn inline_css_with_options(html: &str, css: &str, options: &str) -> Result<String, JsValue> {
    let options: InlinerOptions =
        serde_json::from_str(options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    StyleInliner::new()
        .with_options(options)
        .convert(html, css)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
