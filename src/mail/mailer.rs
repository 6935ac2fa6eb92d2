//! Collaborator traits and the render → inline → deliver pipeline.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use serde_json::{Map, Value};

use super::{Attachment, Email, EmailBuilder, SendEmailJob};
use crate::config::MailmanConfig;
use crate::error::{Error, Result};
use crate::inline::StyleInliner;
use crate::util::decode_document;

/// Turns a view name and its data into raw HTML.
///
/// `locale` is the locale the message was pinned to, if any; renderers use
/// their own default otherwise.
pub trait Renderer: Send + Sync {
    fn render(&self, view: &str, data: &Value, locale: Option<&str>) -> Result<String>;
}

impl<F> Renderer for F
where
    F: Fn(&str, &Value, Option<&str>) -> Result<String> + Send + Sync,
{
    fn render(&self, view: &str, data: &Value, locale: Option<&str>) -> Result<String> {
        self(view, data, locale)
    }
}

/// Yields stylesheet text by name.
pub trait StylesheetSource: Send + Sync {
    fn load(&self, name: &str) -> Result<String>;
}

/// In-memory stylesheets keyed by name.
impl StylesheetSource for HashMap<String, String> {
    fn load(&self, name: &str) -> Result<String> {
        self.get(name)
            .cloned()
            .ok_or_else(|| Error::Input(format!("unknown stylesheet: {name}")))
    }
}

/// Stylesheets read from a folder on disk.
#[derive(Debug, Clone)]
pub struct FsStylesheets {
    folder: PathBuf,
}

impl FsStylesheets {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }
}

impl StylesheetSource for FsStylesheets {
    /// Read `name` relative to the folder. Names that would leave the folder
    /// are rejected.
    fn load(&self, name: &str) -> Result<String> {
        let relative = Path::new(name);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(Error::Input(format!(
                "stylesheet name must stay inside the css folder: {name}"
            )));
        }
        let bytes = std::fs::read(self.folder.join(relative))?;
        Ok(decode_document(&bytes).into_owned())
    }
}

/// Delivers finished messages.
pub trait Transport: Send + Sync {
    fn send(&self, email: &Email) -> Result<()>;
}

impl<F> Transport for F
where
    F: Fn(&Email) -> Result<()> + Send + Sync,
{
    fn send(&self, email: &Email) -> Result<()> {
        self(email)
    }
}

/// Accepts jobs for deferred delivery.
pub trait MailQueue: Send + Sync {
    /// Enqueue `job`, optionally on a named queue and/or after a delay.
    fn push(&self, job: SendEmailJob, queue: Option<&str>, delay: Option<Duration>) -> Result<()>;
}

/// Renders, inlines and sends email.
///
/// ```
/// use mailman::config::MailmanConfig;
/// use mailman::mail::{Email, Mailman};
/// use serde_json::Value;
/// use std::collections::HashMap;
///
/// let renderer = |_view: &str, data: &Value, _locale: Option<&str>| {
///     Ok::<_, mailman::Error>(format!("<h1>Hola {}</h1>", data["name"].as_str().unwrap_or("")))
/// };
/// let stylesheets = HashMap::from([("email.css".to_string(), "h1 { color: blue }".to_string())]);
/// let transport = |_email: &Email| Ok::<_, mailman::Error>(());
///
/// let mailman = Mailman::new(MailmanConfig::default(), renderer, stylesheets, transport);
/// let html = mailman.make("welcome").with("name", "Ana").show()?;
/// assert_eq!(html, r#"<h1 style="color: blue;">Hola Ana</h1>"#);
/// # Ok::<(), mailman::Error>(())
/// ```
pub struct Mailman {
    config: MailmanConfig,
    inliner: StyleInliner,
    renderer: Box<dyn Renderer>,
    stylesheets: Box<dyn StylesheetSource>,
    transport: Box<dyn Transport>,
    queue: Option<Box<dyn MailQueue>>,
}

impl Mailman {
    pub fn new(
        config: MailmanConfig,
        renderer: impl Renderer + 'static,
        stylesheets: impl StylesheetSource + 'static,
        transport: impl Transport + 'static,
    ) -> Self {
        let inliner = StyleInliner::new().with_options(config.inliner.clone());
        Self {
            config,
            inliner,
            renderer: Box::new(renderer),
            stylesheets: Box::new(stylesheets),
            transport: Box::new(transport),
            queue: None,
        }
    }

    /// Use stylesheets from the folder named in the configuration.
    pub fn with_fs_stylesheets(
        config: MailmanConfig,
        renderer: impl Renderer + 'static,
        transport: impl Transport + 'static,
    ) -> Self {
        let stylesheets = FsStylesheets::new(config.css.folder.clone());
        Self::new(config, renderer, stylesheets, transport)
    }

    /// Attach a queue for [`PendingMail::queue`] and friends.
    pub fn with_queue(mut self, queue: impl MailQueue + 'static) -> Self {
        self.queue = Some(Box::new(queue));
        self
    }

    pub fn config(&self) -> &MailmanConfig {
        &self.config
    }

    /// Start a message rendered from `view`.
    pub fn make(&self, view: impl Into<String>) -> PendingMail<'_> {
        let mut envelope = Email::builder();
        if let Some(from) = &self.config.from {
            envelope = envelope.from(from.to_string());
        }
        PendingMail {
            mailman: self,
            view: view.into(),
            data: Value::Object(Map::new()),
            locale: None,
            css: self.config.css.file.clone(),
            envelope,
        }
    }

    /// Deliver a finished message, or only log it in pretend mode.
    pub fn send(&self, email: &Email) -> Result<()> {
        if self.config.pretend {
            let recipients: Vec<String> = email.recipients().map(|a| a.to_string()).collect();
            log::info!(
                "pretending to mail message to: {} (subject: {})",
                recipients.join(", "),
                email.subject
            );
            return Ok(());
        }
        self.transport.send(email)
    }

    /// Deliver a queued job payload (as produced by [`SendEmailJob::to_payload`]).
    pub fn handle_queued(&self, payload: &str) -> Result<()> {
        let job = SendEmailJob::from_payload(payload)?;
        self.send(&job.email)
    }

    fn push(&self, email: Email, queue: Option<&str>, delay: Option<Duration>) -> Result<()> {
        let Some(mail_queue) = &self.queue else {
            return Err(Error::Queue("no queue configured".into()));
        };
        log::debug!(
            "queueing message {:?} on {} (delay {:?})",
            email.subject,
            queue.unwrap_or("default queue"),
            delay
        );
        mail_queue.push(SendEmailJob::new(email), queue, delay)
    }
}

/// A message being assembled. Created by [`Mailman::make`].
pub struct PendingMail<'a> {
    mailman: &'a Mailman,
    view: String,
    data: Value,
    locale: Option<String>,
    css: String,
    envelope: EmailBuilder,
}

impl<'a> PendingMail<'a> {
    /// Set one view variable.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        if let Value::Object(map) = &mut self.data {
            map.insert(key.into(), value.into());
        }
        self
    }

    /// Merge view data recursively. Objects merge by key and arrays by
    /// index; anything else replaces what was there.
    pub fn with_data(mut self, data: Value) -> Self {
        merge_data(&mut self.data, data);
        self
    }

    /// Render in this locale instead of the renderer's default.
    pub fn locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Use another stylesheet, relative to the stylesheet source.
    pub fn css(mut self, name: impl Into<String>) -> Self {
        self.css = name.into();
        self
    }

    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.envelope = self.envelope.from(address);
        self
    }

    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.envelope = self.envelope.to(address);
        self
    }

    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.envelope = self.envelope.cc(address);
        self
    }

    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.envelope = self.envelope.bcc(address);
        self
    }

    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.envelope = self.envelope.reply_to(address);
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.envelope = self.envelope.subject(subject);
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.envelope = self.envelope.attach(attachment);
        self
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Render the view and inline the stylesheet into it.
    pub fn show(&self) -> Result<String> {
        let html = self
            .mailman
            .renderer
            .render(&self.view, &self.data, self.locale.as_deref())?;
        let css = self.mailman.stylesheets.load(&self.css)?;
        self.mailman.inliner.convert(&html, &css)
    }

    /// Render and assemble the final message.
    pub fn build(self) -> Result<Email> {
        let body = self.show()?;
        self.envelope.html(body).build()
    }

    /// Build and deliver now.
    pub fn send(self) -> Result<()> {
        let mailman = self.mailman;
        let email = self.build()?;
        mailman.send(&email)
    }

    /// Build now and deliver through the queue.
    pub fn queue(self) -> Result<()> {
        self.enqueue(None, None)
    }

    /// Like [`queue`](Self::queue), on a named queue.
    pub fn queue_on(self, queue: &str) -> Result<()> {
        self.enqueue(Some(queue), None)
    }

    /// Queue for delivery after `delay`.
    pub fn later(self, delay: Duration) -> Result<()> {
        self.enqueue(None, Some(delay))
    }

    /// Like [`later`](Self::later), on a named queue.
    pub fn later_on(self, queue: &str, delay: Duration) -> Result<()> {
        self.enqueue(Some(queue), Some(delay))
    }

    fn enqueue(self, queue: Option<&str>, delay: Option<Duration>) -> Result<()> {
        let mailman = self.mailman;
        let email = self.build()?;
        mailman.push(email, queue, delay)
    }
}

/// Recursively merge `source` into `target`.
pub fn merge_data(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(&key) {
                    Some(existing) => merge_data(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(target), Value::Array(source)) => {
            for (i, value) in source.into_iter().enumerate() {
                match target.get_mut(i) {
                    Some(existing) => merge_data(existing, value),
                    None => target.push(value),
                }
            }
        }
        (target, source) => *target = source,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_merge_objects_recursively() {
        let mut data = json!({"user": {"name": "Ana", "roles": ["a", "b"]}, "n": 1});
        merge_data(
            &mut data,
            json!({"user": {"email": "ana@example.com", "roles": ["x"]}, "n": 2}),
        );

        assert_eq!(
            data,
            json!({
                "user": {"name": "Ana", "email": "ana@example.com", "roles": ["x", "b"]},
                "n": 2
            })
        );
    }

    #[test]
    fn test_merge_replaces_mismatched_types() {
        let mut data = json!({"a": [1, 2], "b": {"c": 1}});
        merge_data(&mut data, json!({"a": "flat", "b": 5}));
        assert_eq!(data, json!({"a": "flat", "b": 5}));
    }

    #[test]
    fn test_hash_map_stylesheets() {
        let sheets = HashMap::from([("a.css".to_string(), "p{}".to_string())]);
        assert_eq!(sheets.load("a.css").unwrap(), "p{}");
        assert!(sheets.load("b.css").is_err());
    }

    #[test]
    fn test_fs_stylesheets_reject_escaping_names() {
        let sheets = FsStylesheets::new("resources/css");
        assert!(matches!(sheets.load("../secret.css"), Err(Error::Input(_))));
        assert!(matches!(sheets.load("/etc/passwd"), Err(Error::Input(_))));
    }
}
