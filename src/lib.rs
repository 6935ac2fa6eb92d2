//! # mailman
//!
//! Render HTML email and inline its CSS so it survives mail clients that
//! ignore `<style>` blocks.
//!
//! ## Features
//!
//! - Inline a stylesheet into `style` attributes, following the CSS cascade
//!   (importance, specificity, source order, existing inline styles)
//! - Keep `@media` blocks in a `<style>` element for clients that honor them
//! - Render → inline → send pipeline with pluggable renderer, stylesheet
//!   source, transport and queue
//!
//! ## Quick Start
//!
//! ```
//! use mailman::convert;
//!
//! let html = convert(
//!     r#"<p class="note">Hi</p>"#,
//!     "p { color: red } .note { color: blue; margin: 0 }",
//! )?;
//! assert_eq!(html, r#"<p class="note" style="color: blue; margin: 0;">Hi</p>"#);
//! # Ok::<(), mailman::Error>(())
//! ```
//!
//! ## Options
//!
//! ```
//! use mailman::{InlinerOptions, StyleInliner};
//!
//! let inliner = StyleInliner::new().with_options(
//!     InlinerOptions::default()
//!         .preserve_media_queries(false)
//!         .max_input_bytes(1 << 20),
//! );
//! let html = inliner.convert("<b>x</b>", "b { font-weight: 700 }")?;
//! assert_eq!(html, r#"<b style="font-weight: 700;">x</b>"#);
//! # Ok::<(), mailman::Error>(())
//! ```

pub mod config;
pub mod css;
pub mod dom;
pub mod error;
pub mod inline;
pub mod mail;
pub mod util;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::MailmanConfig;
pub use error::{Error, Result};
pub use inline::{InlinerOptions, StyleInliner, convert};
pub use mail::{Email, Mailman};
