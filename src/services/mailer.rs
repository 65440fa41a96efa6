// src/services/mailer.rs
use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, Message, SmtpTransport, Transport};

use crate::config::EmailConfig;
use crate::error::DeliveryError;

const SENDER_NAME: &str = "Portfolio Contact";

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver a contact-form submission to the operator inbox.
    async fn send_contact_email(
        &self,
        name: &str,
        email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError>;

    /// Check the SMTP login. Logs the outcome, never fails.
    async fn verify_connection(&self) -> bool;
}

#[derive(Debug, Clone)]
pub struct SmtpMailer {
    config: EmailConfig,
}

impl SmtpMailer {
    pub fn new(config: EmailConfig) -> Self {
        if !config.has_credentials() {
            tracing::error!("email configuration is missing, set EMAIL_USER and EMAIL_PASS");
        }
        Self { config }
    }

    fn transport(&self) -> Result<SmtpTransport, DeliveryError> {
        let (Some(user), Some(pass)) = (&self.config.username, &self.config.password) else {
            return Err(DeliveryError::NotConfigured);
        };

        // 465 is implicit TLS, everything else upgrades with STARTTLS.
        let builder = if self.config.port == 465 {
            SmtpTransport::relay(&self.config.host)
        } else {
            SmtpTransport::starttls_relay(&self.config.host)
        }
        .map_err(|e| DeliveryError::Transport(format!("SMTP relay error: {e}")))?;

        Ok(builder
            .port(self.config.port)
            .credentials(Credentials::new(user.clone(), pass.clone()))
            .build())
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_contact_email(
        &self,
        name: &str,
        email: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        let from = self.config.from.as_deref().ok_or(DeliveryError::NotConfigured)?;
        let to = self.config.to.as_deref().ok_or(DeliveryError::NotConfigured)?;
        let transport = self.transport()?;
        let message = compose_contact_email(from, to, name, email, subject, body)?;

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        tracing::info!(to, "contact email sent");
        Ok(())
    }

    async fn verify_connection(&self) -> bool {
        let transport = match self.transport() {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(error = %e, "email server connection failed");
                return false;
            }
        };

        match tokio::task::spawn_blocking(move || transport.test_connection()).await {
            Ok(Ok(true)) => {
                tracing::info!(host = %self.config.host, "email server connection verified");
                true
            }
            Ok(Ok(false)) => {
                tracing::error!(host = %self.config.host, "email server connection failed");
                false
            }
            Ok(Err(e)) => {
                tracing::error!(host = %self.config.host, error = %e, "email server connection failed");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "email verification task failed");
                false
            }
        }
    }
}

/// Build the operator notification with plain-text and HTML alternatives.
pub fn compose_contact_email(
    from: &str,
    to: &str,
    name: &str,
    email: &str,
    subject: &str,
    body: &str,
) -> Result<Message, DeliveryError> {
    let from_addr: Address = from
        .parse()
        .map_err(|e| DeliveryError::InvalidAddress(format!("{from}: {e}")))?;
    let to_mailbox: Mailbox = to
        .parse()
        .map_err(|e| DeliveryError::InvalidAddress(format!("{to}: {e}")))?;

    Message::builder()
        .from(Mailbox::new(Some(SENDER_NAME.to_string()), from_addr))
        .to(to_mailbox)
        .subject(format!("Portfolio - {subject}"))
        .multipart(MultiPart::alternative_plain_html(
            render_text(name, email, body),
            render_html(name, email, subject, body),
        ))
        .map_err(|e| DeliveryError::Build(e.to_string()))
}

pub fn render_text(name: &str, email: &str, body: &str) -> String {
    format!("Name: {name}\nEmail: {email}\n\n{body}")
}

pub fn render_html(name: &str, email: &str, subject: &str, body: &str) -> String {
    let body = escape_html(body).replace('\n', "<br>");
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #6C63FF;">New Contact Message from Portfolio</h2>
  <p><strong>From:</strong> {name}</p>
  <p><strong>Email:</strong> {email}</p>
  <p><strong>Subject:</strong> {subject}</p>
  <div style="background-color: #f5f5f5; padding: 15px; border-radius: 5px; margin-top: 20px;">
    <p style="white-space: pre-line;">{body}</p>
  </div>
  <div style="margin-top: 30px; padding-top: 15px; border-top: 1px solid #eee; color: #666; font-size: 12px;">
    <p>This email was sent from your portfolio contact form.</p>
  </div>
</div>"#,
        name = escape_html(name),
        email = escape_html(email),
        subject = escape_html(subject),
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(username: Option<&str>, port: u16) -> EmailConfig {
        EmailConfig {
            host: "127.0.0.1".to_string(),
            port,
            username: username.map(str::to_string),
            password: username.map(|_| "secret".to_string()),
            from: username.map(str::to_string),
            to: username.map(str::to_string),
        }
    }

    #[test]
    fn html_escapes_user_input() {
        let html = render_html("<b>Eve</b>", "eve@example.com", "Hi & bye", "line one\nline <two>");
        assert!(html.contains("&lt;b&gt;Eve&lt;/b&gt;"));
        assert!(html.contains("Hi &amp; bye"));
        assert!(html.contains("line one<br>line &lt;two&gt;"));
        assert!(!html.contains("<b>Eve"));
    }

    #[test]
    fn text_body_layout() {
        assert_eq!(
            render_text("A", "a@example.com", "Hello there"),
            "Name: A\nEmail: a@example.com\n\nHello there"
        );
    }

    #[test]
    fn composes_with_prefixed_subject() {
        let msg = compose_contact_email(
            "site@example.com",
            "owner@example.com",
            "A",
            "a@example.com",
            "Hi",
            "Hello there",
        )
        .unwrap();
        let raw = String::from_utf8(msg.formatted()).unwrap();
        assert!(raw.contains("Subject: Portfolio - Hi"));
        assert!(raw.contains("Portfolio Contact"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[test]
    fn rejects_bad_sender_address() {
        let err = compose_contact_email("not an address", "owner@example.com", "A", "a@example.com", "Hi", "Hello there")
            .unwrap_err();
        assert!(matches!(err, DeliveryError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn missing_credentials_is_not_configured() {
        let mailer = SmtpMailer::new(config(None, 587));
        let err = mailer
            .send_contact_email("A", "a@example.com", "Hi", "Hello there")
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::NotConfigured));
        assert!(!mailer.verify_connection().await);
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        // grab a free port and close it again so nothing is listening
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mailer = SmtpMailer::new(config(Some("me@example.com"), port));
        let err = mailer
            .send_contact_email("A", "a@example.com", "Hi", "Hello there")
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Transport(_)));
    }
}
