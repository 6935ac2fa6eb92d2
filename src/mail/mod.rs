//! Email rendering and delivery around the CSS inliner.
//!
//! A [`Mailman`] ties four collaborators together:
//!
//! | Collaborator | Role |
//! |--------------|------|
//! | [`Renderer`] | view name + data + locale → raw HTML |
//! | [`StylesheetSource`] | stylesheet name → CSS text ([`FsStylesheets`] reads a folder) |
//! | [`Transport`] | delivers an [`Email`] |
//! | [`MailQueue`] | stores a [`SendEmailJob`] for later delivery (optional) |
//!
//! ```ignore
//! mailman
//!     .make("orders.shipped")
//!     .with("order", json!({"id": 42}))
//!     .locale("es")
//!     .to("ana@example.com")
//!     .subject("Tu pedido")
//!     .send()?;
//! ```

mod job;
mod mailer;
mod message;

pub use job::SendEmailJob;
pub use mailer::{
    FsStylesheets, MailQueue, Mailman, PendingMail, Renderer, StylesheetSource, Transport,
    merge_data,
};
pub use message::{Address, Attachment, Email, EmailBuilder};
