use crate::config::MailConfig;
use crate::errors::{Result, WatchError};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::info;
use std::path::{Path, PathBuf};

/// One outgoing report email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<PathBuf>,
}

#[async_trait]
pub trait Mailer {
    async fn send(&self, dispatch: &Dispatch) -> Result<()>;
}

fn content_type_for(path: &Path) -> Result<ContentType> {
    let mime = match path.extension().and_then(|e| e.to_str()) {
        Some("png") => "image/png",
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        _ => "application/octet-stream",
    };
    ContentType::parse(mime).map_err(|e| WatchError::Unknown(format!("content type {}: {}", mime, e)))
}

/// Build the MIME message: plain-text body followed by one part per attachment.
pub fn build_message(sender: &Mailbox, dispatch: &Dispatch) -> Result<Message> {
    let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(dispatch.body.clone()));
    for path in &dispatch.attachments {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        let content = std::fs::read(path)?;
        parts = parts.singlepart(Attachment::new(filename).body(content, content_type_for(path)?));
    }

    let message = Message::builder()
        .from(sender.clone())
        .to(dispatch.to.parse::<Mailbox>()?)
        .subject(dispatch.subject.as_str())
        .multipart(parts)?;
    Ok(message)
}

/// SMTP submission through a STARTTLS relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: Mailbox,
}

impl SmtpMailer {
    pub fn from_config(mail: &MailConfig) -> Result<Self> {
        let password = std::env::var(&mail.password_env).map_err(|_| {
            WatchError::ConfigError(format!("environment variable {} is not set", mail.password_env))
        })?;
        let sender = if mail.sender.trim().is_empty() {
            mail.smtp_username.as_str()
        } else {
            mail.sender.as_str()
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&mail.smtp_host)?
            .port(mail.smtp_port)
            .credentials(Credentials::new(mail.smtp_username.clone(), password))
            .build();

        Ok(Self {
            transport,
            sender: sender.parse()?,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, dispatch: &Dispatch) -> Result<()> {
        let message = build_message(&self.sender, dispatch)?;
        self.transport.send(message).await?;
        info!(
            "Mailed {} attachment(s) to {}",
            dispatch.attachments.len(),
            dispatch.to
        );
        Ok(())
    }
}

/// Stand-in used when mailing is switched off.
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(&self, dispatch: &Dispatch) -> Result<()> {
        info!("Mail disabled; not sending \"{}\"", dispatch.subject);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_carries_both_attachments() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("Lumber_Stock_Prices_2021-08-10.png");
        let html = dir.path().join("Lumber_Stock_Prices_2021-08-10.html");
        std::fs::write(&png, b"\x89PNG\r\n").unwrap();
        std::fs::write(&html, "<html></html>").unwrap();

        let dispatch = Dispatch {
            to: "desk@example.com".to_string(),
            subject: "Lumber Stocks 2021-08-10".to_string(),
            body: "Here are the lumber stock prices for 2021-08-10".to_string(),
            attachments: vec![png, html],
        };
        let sender: Mailbox = "watcher@example.com".parse().unwrap();
        let formatted = String::from_utf8_lossy(&build_message(&sender, &dispatch).unwrap().formatted()).into_owned();

        assert!(formatted.contains("Subject: Lumber Stocks 2021-08-10"));
        assert!(formatted.contains("To: desk@example.com"));
        assert!(formatted.contains("Lumber_Stock_Prices_2021-08-10.png"));
        assert!(formatted.contains("Lumber_Stock_Prices_2021-08-10.html"));
        assert!(formatted.contains("image/png"));
        assert!(formatted.contains("text/html"));
    }

    #[test]
    fn bad_recipient_is_an_address_error() {
        let dispatch = Dispatch {
            to: "not an address".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
            attachments: Vec::new(),
        };
        let sender: Mailbox = "watcher@example.com".parse().unwrap();
        assert!(matches!(build_message(&sender, &dispatch), Err(WatchError::AddressError(_))));
    }

    #[test]
    fn missing_attachment_is_an_io_error() {
        let dispatch = Dispatch {
            to: "desk@example.com".to_string(),
            subject: "s".to_string(),
            body: "b".to_string(),
            attachments: vec![PathBuf::from("/nonexistent/report.png")],
        };
        let sender: Mailbox = "watcher@example.com".parse().unwrap();
        assert!(matches!(build_message(&sender, &dispatch), Err(WatchError::IoError(_))));
    }
}
