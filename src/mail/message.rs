//! Email message types and builder.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::detect_mime_type;

/// A mailbox: an address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Address {
    /// Create an address, validating its shape.
    pub fn new(email: impl Into<String>) -> Result<Self> {
        let email = email.into();
        validate_email(&email)?;
        Ok(Self { email, name: None })
    }

    /// Create an address with a display name.
    pub fn named(email: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let mut address = Self::new(email)?;
        let name = name.into();
        address.name = (!name.trim().is_empty()).then_some(name);
        Ok(address)
    }
}

/// Reject anything that is obviously not `local@domain`.
fn validate_email(email: &str) -> Result<()> {
    let invalid = || Error::InvalidAddress(email.to_string());
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.is_empty()
        || domain.contains('@')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | ',' | ';'))
    {
        return Err(invalid());
    }
    Ok(())
}

impl FromStr for Address {
    type Err = Error;

    /// Parse `user@example.com`, `Name <user@example.com>` or
    /// `"Last, First" <user@example.com>`.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some(open) = s.rfind('<') else {
            return Address::new(s);
        };
        let email = s[open + 1..]
            .strip_suffix('>')
            .ok_or_else(|| Error::InvalidAddress(s.to_string()))?;
        let name = s[..open].trim();
        let name = name
            .strip_prefix('"')
            .and_then(|n| n.strip_suffix('"'))
            .unwrap_or(name);
        Address::named(email.trim(), name)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            None => f.write_str(&self.email),
            Some(name) if name.contains(|c: char| matches!(c, ',' | ';' | '"' | '<' | '>')) => {
                write!(f, "\"{}\" <{}>", name.replace('"', "'"), self.email)
            }
            Some(name) => write!(f, "{name} <{}>", self.email),
        }
    }
}

/// A file attached to an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    /// Raw bytes; base64 in serialized form.
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
}

impl Attachment {
    /// Create an attachment, detecting its content type.
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = detect_mime_type(&filename, &data)
            .unwrap_or("application/octet-stream")
            .to_string();
        Self {
            filename,
            content_type,
            data,
        }
    }

    /// Read an attachment from disk, named after the file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Self::new(filename, data))
    }

    /// Override the detected content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

/// A complete email message ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Sender address.
    pub from: Address,
    /// Primary recipients.
    pub to: Vec<Address>,
    /// Carbon copy recipients.
    #[serde(default)]
    pub cc: Vec<Address>,
    /// Blind carbon copy recipients.
    #[serde(default)]
    pub bcc: Vec<Address>,
    /// Optional reply-to address.
    #[serde(default)]
    pub reply_to: Option<Address>,
    /// Email subject line.
    pub subject: String,
    /// HTML body with styles inlined.
    pub html: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Email {
    /// Create a new email builder.
    pub fn builder() -> EmailBuilder {
        EmailBuilder::default()
    }

    /// Every recipient: to, then cc, then bcc.
    pub fn recipients(&self) -> impl Iterator<Item = &Address> {
        self.to.iter().chain(&self.cc).chain(&self.bcc)
    }
}

/// Builder for constructing [`Email`] instances.
///
/// Addresses are kept as written and validated by [`build`](Self::build).
#[derive(Debug, Clone, Default)]
pub struct EmailBuilder {
    from: Option<String>,
    to: Vec<String>,
    cc: Vec<String>,
    bcc: Vec<String>,
    reply_to: Option<String>,
    subject: Option<String>,
    html: Option<String>,
    attachments: Vec<Attachment>,
}

impl EmailBuilder {
    /// Set the sender address (required).
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    /// Add a primary recipient.
    pub fn to(mut self, address: impl Into<String>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Add a CC recipient.
    pub fn cc(mut self, address: impl Into<String>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Add a BCC recipient.
    pub fn bcc(mut self, address: impl Into<String>) -> Self {
        self.bcc.push(address.into());
        self
    }

    /// Set the reply-to address.
    pub fn reply_to(mut self, address: impl Into<String>) -> Self {
        self.reply_to = Some(address.into());
        self
    }

    /// Set the subject line.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set HTML body content.
    pub fn html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Build the email, validating required fields and addresses.
    pub fn build(self) -> Result<Email> {
        if self.to.is_empty() {
            return Err(Error::Build("at least one recipient required".into()));
        }

        let from: Address = self
            .from
            .ok_or_else(|| Error::Build("from address required".into()))?
            .parse()?;

        let subject = self
            .subject
            .ok_or_else(|| Error::Build("subject required".into()))?;

        let html = self
            .html
            .ok_or_else(|| Error::Build("body required".into()))?;

        Ok(Email {
            from,
            to: parse_all(&self.to)?,
            cc: parse_all(&self.cc)?,
            bcc: parse_all(&self.bcc)?,
            reply_to: self.reply_to.map(|a| a.parse::<Address>()).transpose()?,
            subject,
            html,
            attachments: self.attachments,
        })
    }
}

fn parse_all(addresses: &[String]) -> Result<Vec<Address>> {
    addresses.iter().map(|a| a.parse::<Address>()).collect()
}
