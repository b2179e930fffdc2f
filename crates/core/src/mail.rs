//! Outgoing email.
//!
//! Messages are assembled as plain [`OutboundEmail`] values so the pipeline can be tested without
//! a mail server; [`SmtpMailer`] turns them into MIME messages and relays them over SMTP.
//! Delivery failures are reported as [`EraError::Email`] and it is up to callers to decide whether
//! they matter (for the request handlers they never do).

use crate::config::{MailConfig, MailCredentials};
use crate::constants::{
    GENERATED_ATTACHMENT_NAME, GENERATED_EMAIL_SUBJECT, SHARED_EXAMPLE_EMAIL_SUBJECT,
};
use crate::document::GeneratedDocument;
use crate::{EraError, EraResult};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::sync::Arc;

const PRE_STYLE: &str =
    "background: #f5f5f5; padding: 15px; border-radius: 5px; white-space: pre-wrap;";

/// A file attached to an outgoing email.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// A message ready to hand to a [`Mailer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub html_body: String,
    pub attachments: Vec<EmailAttachment>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> EraResult<()>;
}

/// SMTP relay mailer authenticated with the configured account.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(smtp_host: &str, credentials: &MailCredentials) -> EraResult<Self> {
        let from = parse_mailbox(&credentials.user)?;
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
            .map_err(|e| EraError::Configuration(format!("invalid SMTP relay {smtp_host:?}: {e}")))?
            .credentials(Credentials::new(
                credentials.user.clone(),
                credentials.pass.clone(),
            ))
            .build();

        Ok(Self { transport, from })
    }

    fn build_message(&self, email: OutboundEmail) -> EraResult<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(email.subject);
        for to in &email.to {
            builder = builder.to(parse_mailbox(to)?);
        }
        if let Some(reply_to) = &email.reply_to {
            builder = builder.reply_to(parse_mailbox(reply_to)?);
        }

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(email.html_body));
        for attachment in email.attachments {
            let content_type = ContentType::parse(&attachment.content_type)
                .unwrap_or(ContentType::TEXT_PLAIN);
            body = body.singlepart(
                Attachment::new(attachment.filename).body(attachment.content, content_type),
            );
        }

        builder
            .multipart(body)
            .map_err(|e| EraError::Email(format!("failed to build message: {e}")))
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> EraResult<()> {
        let recipients = email.to.len();
        let message = self.build_message(email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| EraError::Email(e.to_string()))?;
        tracing::info!(recipients, "email sent");
        Ok(())
    }
}

/// Mailer used when no email account is configured; every send is reported as a failure.
#[derive(Clone, Debug, Default)]
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, email: OutboundEmail) -> EraResult<()> {
        Err(EraError::Email(format!(
            "email is not configured (EMAIL_USER/EMAIL_PASS); dropped {:?}",
            email.subject
        )))
    }
}

/// Build the mailer for the configured account, or a [`DisabledMailer`] when there is none.
pub fn mailer_from_config(cfg: &MailConfig) -> EraResult<Arc<dyn Mailer>> {
    match cfg.credentials() {
        Some(credentials) => Ok(Arc::new(SmtpMailer::new(cfg.smtp_host(), credentials)?)),
        None => {
            tracing::warn!("EMAIL_USER/EMAIL_PASS not set; outgoing email is disabled");
            Ok(Arc::new(DisabledMailer))
        }
    }
}

fn parse_mailbox(address: &str) -> EraResult<Mailbox> {
    address
        .trim()
        .parse::<Mailbox>()
        .map_err(|source| EraError::EmailAddress {
            address: address.to_string(),
            source,
        })
}

/// Escape text for inclusion in an HTML body.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// Recipients: the submitter (if any) then the observer, without duplicates.
///
/// A submitter address that does not parse is dropped so the observer copy still goes out.
fn recipients(submitter: Option<&str>, observer: &str) -> Vec<String> {
    let mut to = Vec::with_capacity(2);
    if let Some(submitter) = submitter.map(str::trim).filter(|s| !s.is_empty()) {
        match submitter.parse::<Mailbox>() {
            Ok(_) => to.push(submitter.to_string()),
            Err(e) => tracing::warn!(address = %submitter, "dropping unusable submitter address: {}", e),
        }
    }
    if !to.iter().any(|t| t.eq_ignore_ascii_case(observer)) {
        to.push(observer.to_string());
    }
    to
}

/// Email delivering a generated page to the submitter and the observer.
pub fn generated_webpage_email(
    submitter: Option<&str>,
    observer: &str,
    prompt: &str,
    document: &GeneratedDocument,
) -> OutboundEmail {
    let fallback_note = if document.is_fallback() {
        "<p><strong>Note:</strong> the generator could not produce a page from your screenshot, \
so a reference template with the standard tracking script is included instead. Replace \
<code>YOUR_QUALTRICS_URL</code> with your survey link before use.</p>"
    } else {
        ""
    };

    let html_body = format!(
        r#"<h2>Your ERA Generated Webpage</h2>
<p>Hello,</p>
<p>Your consumer choice webpage has been generated. Below you'll find both the prompt used and the generated HTML code.</p>
{fallback_note}
<h3>Generated Prompt:</h3>
<pre style="{PRE_STYLE}">{prompt}</pre>
<h3>Generated HTML Code:</h3>
<p>The complete HTML code is attached as a file, and also included below:</p>
<pre style="{PRE_STYLE} max-height: 400px; overflow-y: auto;">{code}</pre>
<p>You can copy this code and save it as an HTML file to use in your experiment.</p>
<p>Best regards,<br>ERA Team</p>"#,
        prompt = escape_html(prompt),
        code = escape_html(document.as_str()),
    );

    OutboundEmail {
        to: recipients(submitter, observer),
        reply_to: None,
        subject: GENERATED_EMAIL_SUBJECT.to_string(),
        html_body,
        attachments: vec![EmailAttachment {
            filename: GENERATED_ATTACHMENT_NAME.to_string(),
            content_type: "text/html".to_string(),
            content: document.as_str().as_bytes().to_vec(),
        }],
    }
}

/// Notification forwarding a shared example file to the observer.
pub fn shared_example_email(
    observer: &str,
    submitter: Option<&str>,
    description: Option<&str>,
    attachment: EmailAttachment,
) -> OutboundEmail {
    let submitter = submitter.map(str::trim).filter(|s| !s.is_empty());
    let description = description.map(str::trim).filter(|d| !d.is_empty());

    let html_body = format!(
        r#"<h2>New Example Shared with ERA</h2>
<p><strong>From:</strong> {from}</p>
<p><strong>File:</strong> {file} ({size} bytes)</p>
<h3>Description:</h3>
<pre style="{PRE_STYLE}">{description}</pre>"#,
        from = escape_html(submitter.unwrap_or("(no email given)")),
        file = escape_html(&attachment.filename),
        size = attachment.content.len(),
        description = escape_html(description.unwrap_or("(no description given)")),
    );

    OutboundEmail {
        to: vec![observer.to_string()],
        // Only offer reply-to when the address is usable.
        reply_to: submitter
            .filter(|s| s.parse::<Mailbox>().is_ok())
            .map(str::to_string),
        subject: SHARED_EXAMPLE_EMAIL_SUBJECT.to_string(),
        html_body,
        attachments: vec![attachment],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentOrigin;

    fn page() -> GeneratedDocument {
        GeneratedDocument::from_markup(
            "<!DOCTYPE html><html><body>Shop</body></html>".into(),
            DocumentOrigin::Model,
        )
        .unwrap()
    }

    #[test]
    fn escape_html_neutralises_markup() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn generated_email_goes_to_submitter_and_observer() {
        let email = generated_webpage_email(
            Some("student@example.test"),
            "observer@example.test",
            "Make it <blue>",
            &page(),
        );
        assert_eq!(email.to, vec!["student@example.test", "observer@example.test"]);
        assert_eq!(email.subject, GENERATED_EMAIL_SUBJECT);
        assert!(email.html_body.contains("Make it &lt;blue&gt;"));
        assert!(email.html_body.contains("&lt;!DOCTYPE html&gt;"));
        assert!(!email.html_body.contains("reference template"));

        let attachment = &email.attachments[0];
        assert_eq!(attachment.filename, GENERATED_ATTACHMENT_NAME);
        assert_eq!(attachment.content_type, "text/html");
        assert_eq!(attachment.content, page().as_str().as_bytes());
    }

    #[test]
    fn generated_email_without_submitter_only_reaches_observer() {
        let email = generated_webpage_email(Some("  "), "observer@example.test", "p", &page());
        assert_eq!(email.to, vec!["observer@example.test"]);

        let email = generated_webpage_email(
            Some("Observer@Example.test"),
            "observer@example.test",
            "p",
            &page(),
        );
        assert_eq!(email.to.len(), 1);
    }

    #[test]
    fn malformed_submitter_still_reaches_observer() {
        let email = generated_webpage_email(
            Some("student at example"),
            "observer@example.test",
            "p",
            &page(),
        );
        assert_eq!(email.to, vec!["observer@example.test"]);
    }

    #[tokio::test]
    async fn malformed_submitter_does_not_break_message() {
        let mailer = SmtpMailer::new(
            "smtp.example.test",
            &MailCredentials {
                user: "era@example.test".into(),
                pass: "secret".into(),
            },
        )
        .unwrap();
        let email = generated_webpage_email(
            Some("student at example"),
            "observer@example.test",
            "p",
            &page(),
        );
        let message = mailer.build_message(email).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("To: observer@example.test"));
    }

    #[test]
    fn generated_email_flags_fallback() {
        let email = generated_webpage_email(None, "o@example.test", "p", &GeneratedDocument::fallback());
        assert!(email.html_body.contains("reference template"));
    }

    #[test]
    fn shared_example_email_attaches_file() {
        let attachment = EmailAttachment {
            filename: "study.pdf".into(),
            content_type: "application/pdf".into(),
            content: vec![1, 2, 3],
        };
        let email = shared_example_email(
            "observer@example.test",
            Some("colleague@example.test"),
            Some("Price anchoring <test>"),
            attachment.clone(),
        );
        assert_eq!(email.to, vec!["observer@example.test"]);
        assert_eq!(email.reply_to.as_deref(), Some("colleague@example.test"));
        assert!(email.html_body.contains("Price anchoring &lt;test&gt;"));
        assert!(email.html_body.contains("(3 bytes)"));
        assert_eq!(email.attachments, vec![attachment]);
    }

    #[test]
    fn shared_example_email_skips_unusable_reply_to() {
        let attachment = EmailAttachment {
            filename: "a.png".into(),
            content_type: "image/png".into(),
            content: vec![],
        };
        let email = shared_example_email("o@example.test", Some("not an address"), None, attachment);
        assert!(email.reply_to.is_none());
        assert!(email.html_body.contains("(no description given)"));
    }

    #[tokio::test]
    async fn disabled_mailer_reports_failure() {
        let email = generated_webpage_email(None, "o@example.test", "p", &page());
        let err = DisabledMailer.send(email).await.unwrap_err();
        assert!(matches!(err, EraError::Email(_)));
    }

    #[tokio::test]
    async fn smtp_mailer_builds_mime_message() {
        let mailer = SmtpMailer::new(
            "smtp.example.test",
            &MailCredentials {
                user: "era@example.test".into(),
                pass: "secret".into(),
            },
        )
        .unwrap();
        let email = generated_webpage_email(Some("s@example.test"), "o@example.test", "p", &page());
        let message = mailer.build_message(email).unwrap();
        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: Your Generated Consumer Choice Webpage - ERA"));
        assert!(formatted.contains("generated-webpage.html"));
    }

    #[tokio::test]
    async fn smtp_mailer_rejects_bad_recipient() {
        let mailer = SmtpMailer::new(
            "smtp.example.test",
            &MailCredentials {
                user: "era@example.test".into(),
                pass: "secret".into(),
            },
        )
        .unwrap();
        let mut email = generated_webpage_email(None, "o@example.test", "p", &page());
        email.to.push("nope".into());
        assert!(matches!(
            mailer.build_message(email),
            Err(EraError::EmailAddress { .. })
        ));
    }
}
