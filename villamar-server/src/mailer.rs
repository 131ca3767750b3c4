use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// SMTP relay settings, supplied through the environment.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Sender mailbox, e.g. `Villamar Estates <noreply@villamar.ae>`.
    pub from: String,
    /// Inbox that receives inquiries and signups.
    pub to: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            from: "Villamar Estates <noreply@villamar.ae>".to_string(),
            to: "leads@villamar.ae".to_string(),
        }
    }
}

/// A validated contact form submission. Lives only for the duration of one
/// email dispatch; nothing is persisted.
#[derive(Debug, Clone)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub interest: Option<String>,
    pub message: String,
}

/// Outbound notification channel for form submissions. Production uses
/// [`SmtpNotifier`]; handler tests substitute a recording fake.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn contact_inquiry(&self, message: &ContactMessage) -> Result<()>;
    async fn newsletter_signup(&self, email: &str) -> Result<()>;
}

/// Sends formatted HTML email through an authenticated SMTP relay. Each send
/// is fire-and-forget: no retry, no queue.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .context("invalid SMTP relay host")?
            .port(config.port)
            .credentials(credentials)
            .build();
        let from: Mailbox = config.from.parse().context("invalid SMTP from address")?;
        let to: Mailbox = config.to.parse().context("invalid SMTP to address")?;

        Ok(Self {
            transport,
            from,
            to,
        })
    }

    fn contact_body(message: &ContactMessage) -> String {
        let mut rows = vec![
            ("Name", message.name.clone()),
            ("Email", message.email.clone()),
        ];
        if let Some(phone) = &message.phone {
            rows.push(("Phone", phone.clone()));
        }
        if let Some(interest) = &message.interest {
            rows.push(("Interested in", interest.clone()));
        }
        let rows_html: String = rows
            .iter()
            .map(|(label, value)| {
                format!(
                    "<tr><td><strong>{}</strong></td><td>{}</td></tr>",
                    label,
                    html_escape::encode_text(value)
                )
            })
            .collect();
        format!(
            "<h2>New website inquiry</h2>\
             <table>{}</table>\
             <h3>Message</h3>\
             <p>{}</p>",
            rows_html,
            html_escape::encode_text(&message.message).replace('\n', "<br>")
        )
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn contact_inquiry(&self, message: &ContactMessage) -> Result<()> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(format!("Website inquiry from {}", message.name))
            .header(ContentType::TEXT_HTML);
        // Replying in the inbox should reach the prospect directly.
        if let Ok(reply_to) = message.email.parse::<Mailbox>() {
            builder = builder.reply_to(reply_to);
        }
        let email = builder.body(Self::contact_body(message))?;
        self.transport.send(email).await?;
        Ok(())
    }

    async fn newsletter_signup(&self, email: &str) -> Result<()> {
        let body = format!(
            "<h2>New newsletter subscription</h2><p>{}</p>",
            html_escape::encode_text(email)
        );
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject("New newsletter subscription")
            .header(ContentType::TEXT_HTML)
            .body(body)?;
        self.transport.send(message).await?;
        Ok(())
    }
}
