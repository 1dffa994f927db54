//! Transactional email sender.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tutorhub_common::{
    AppError, AppResult,
    config::{EmailProviderKind, EmailSettings},
};

/// A rendered email.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html: String,
}

/// Email service. Sending fails when no provider is configured.
#[derive(Clone)]
pub struct EmailService {
    settings: Option<EmailSettings>,
    http_client: reqwest::Client,
}

impl EmailService {
    /// Create a new email service.
    #[must_use]
    pub fn new(settings: Option<EmailSettings>) -> Self {
        Self {
            settings,
            http_client: reqwest::Client::new(),
        }
    }

    /// Check if email service is enabled.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.settings.is_some()
    }

    /// Send an email through the configured provider.
    pub async fn send(&self, message: EmailMessage) -> AppResult<()> {
        let settings = self
            .settings
            .as_ref()
            .ok_or_else(|| AppError::Config("Email service not configured".to_string()))?;

        match settings.provider {
            EmailProviderKind::Smtp => self.send_smtp(settings, message).await,
            EmailProviderKind::Sendgrid => self.send_sendgrid(settings, message).await,
            EmailProviderKind::Log => {
                tracing::info!(to = %message.to, subject = %message.subject, "Email (log provider)");
                Ok(())
            }
        }
    }

    async fn send_smtp(&self, settings: &EmailSettings, message: EmailMessage) -> AppResult<()> {
        let host = settings
            .smtp_host
            .as_deref()
            .ok_or_else(|| AppError::Config("email.smtp_host is required".to_string()))?;

        let from: Mailbox = format!("{} <{}>", settings.from_name, settings.from_address)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid sender address: {e}")))?;
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {e}")))?;

        let email = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject)
            .header(ContentType::TEXT_HTML)
            .body(message.html)
            .map_err(|e| AppError::Internal(format!("Failed to build email: {e}")))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| AppError::ExternalService(format!("SMTP relay error: {e}")))?;
        if let Some(port) = settings.smtp_port {
            builder = builder.port(port);
        }
        if let (Some(user), Some(pass)) = (&settings.smtp_username, &settings.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        builder
            .build()
            .send(email)
            .await
            .map_err(|e| AppError::ExternalService(format!("SMTP send failed: {e}")))?;

        Ok(())
    }

    async fn send_sendgrid(&self, settings: &EmailSettings, message: EmailMessage) -> AppResult<()> {
        let api_key = settings
            .sendgrid_api_key
            .as_deref()
            .ok_or_else(|| AppError::Config("email.sendgrid_api_key is required".to_string()))?;

        let body = serde_json::json!({
            "personalizations": [{
                "to": [{"email": message.to}]
            }],
            "from": {
                "email": settings.from_address,
                "name": settings.from_name
            },
            "subject": message.subject,
            "content": [
                {"type": "text/html", "value": message.html}
            ]
        });

        let response = self
            .http_client
            .post("https://api.sendgrid.com/v3/mail/send")
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("SendGrid request failed: {e}")))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(AppError::ExternalService(format!(
                "SendGrid returned {status}: {error_text}"
            )))
        }
    }
}

/// Escape text for inclusion in HTML.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

fn wrap_html(content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px;">
    {content}
    <hr style="margin-top: 40px; border: none; border-top: 1px solid #e9ecef;">
    <p style="font-size: 12px; color: #6c757d;">Tutorhub</p>
</body>
</html>"#
    )
}

/// Email telling an applicant their tutor request was approved.
#[must_use]
pub fn tutor_approved_email(to: &str, name: &str) -> EmailMessage {
    EmailMessage {
        to: to.to_string(),
        subject: "Your tutor application was approved".to_string(),
        html: wrap_html(&format!(
            "<p>Hi {},</p><p>Your application to become a tutor has been approved. \
             Students can now find and book you.</p>",
            escape_html(name)
        )),
    }
}

/// Email telling an applicant their tutor request was rejected.
#[must_use]
pub fn tutor_rejected_email(to: &str, name: &str, reason: Option<&str>) -> EmailMessage {
    let reason = reason.map_or_else(String::new, |r| {
        format!("<p><strong>Reason:</strong> {}</p>", escape_html(r))
    });

    EmailMessage {
        to: to.to_string(),
        subject: "Your tutor application was not approved".to_string(),
        html: wrap_html(&format!(
            "<p>Hi {},</p><p>Unfortunately your application to become a tutor was not approved.</p>{reason}",
            escape_html(name)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_rejected_email_includes_escaped_reason() {
        let email = tutor_rejected_email("a@example.com", "Ann", Some("<missing> scores"));
        assert!(email.html.contains("&lt;missing&gt; scores"));
        assert_eq!(email.to, "a@example.com");
    }

    #[test]
    fn test_rejected_email_without_reason() {
        let email = tutor_rejected_email("a@example.com", "Ann", None);
        assert!(!email.html.contains("Reason"));
    }

    #[tokio::test]
    async fn test_disabled_service_errors() {
        let service = EmailService::new(None);
        assert!(!service.is_enabled());

        let result = service
            .send(tutor_approved_email("a@example.com", "Ann"))
            .await;
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
