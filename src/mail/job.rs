//! Deferred delivery job.

use serde::{Deserialize, Serialize};

use super::{Email, Transport};
use crate::error::Result;

/// Job for sending an email later.
///
/// Queues store it as a JSON payload; a worker turns the payload back into
/// a job and hands the email to a transport:
///
/// ```ignore
/// let job = SendEmailJob::from_payload(&payload)?;
/// job.handle(&transport)?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendEmailJob {
    /// The email to send.
    pub email: Email,
}

impl SendEmailJob {
    /// Create a new send email job.
    pub fn new(email: Email) -> Self {
        Self { email }
    }

    pub fn to_payload(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_payload(payload: &str) -> Result<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Deliver the email.
    pub fn handle<T: Transport + ?Sized>(&self, transport: &T) -> Result<()> {
        transport.send(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::mail::Attachment;

    fn email() -> Email {
        Email::builder()
            .from("Shop <shop@example.com>")
            .to("user@example.com")
            .bcc("audit@example.com")
            .subject("Receipt")
            .html(r#"<p style="color: red;">Paid</p>"#)
            .attach(Attachment::new("receipt.txt", b"total: 10".to_vec()))
            .build()
            .unwrap()
    }

    #[test]
    fn test_payload_round_trip() {
        let job = SendEmailJob::new(email());
        let payload = job.to_payload().unwrap();

        assert!(payload.contains("\"subject\":\"Receipt\""));
        assert_eq!(SendEmailJob::from_payload(&payload).unwrap(), job);
    }

    #[test]
    fn test_garbage_payload_is_rejected() {
        assert!(matches!(
            SendEmailJob::from_payload("{\"email\": 3}"),
            Err(crate::Error::Json(_))
        ));
    }

    #[test]
    fn test_handle_sends_through_transport() {
        let sent = Mutex::new(Vec::new());
        let transport = |email: &Email| {
            sent.lock().unwrap().push(email.subject.clone());
            Ok::<_, crate::Error>(())
        };

        SendEmailJob::new(email()).handle(&transport).unwrap();
        assert_eq!(sent.into_inner().unwrap(), vec!["Receipt".to_string()]);
    }
}
