use crate::config::EmailConfig;
use crate::error::app_error::AppError;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

/// Out-of-band delivery of verification and password reset tokens.
/// Delivery failures are the caller's to log; they never fail a request.
pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    /// Send the account verification email issued at registration.
    pub async fn send_verification_email(
        &self,
        to_email: &str,
        to_name: &str,
        verification_token: &str,
        origin: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::warn!("Email service is disabled, skipping verification email to {}", to_email);
            return Ok(());
        }

        let verify_link = format!("{origin}/verify-email?token={verification_token}&email={to_email}");

        let subject = "Verify your Storefront account";
        let text_body = format!(
            r#"Hi {to_name},

Thanks for creating a Storefront account. Confirm your email address using the link below:
{verify_link}

If you did not create an account, you can safely ignore this message.

Storefront
"#
        );
        let html_body = wrap_html(
            "Verify your email",
            &format!(
                r#"<p>Hi {to_name},</p>
<p>Thanks for creating a Storefront account. Confirm your email address:</p>
<p><a href="{verify_link}">Verify your email</a></p>
<p>If you did not create an account, you can safely ignore this message.</p>"#
            ),
        );

        self.send_email(to_email, subject, &html_body, &text_body).await
    }

    /// Send a password reset email with the reset token.
    pub async fn send_password_reset_email(
        &self,
        to_email: &str,
        to_name: &str,
        reset_token: &str,
        origin: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::warn!("Email service is disabled, skipping password reset email to {}", to_email);
            return Ok(());
        }

        let reset_link = format!("{origin}/reset-password?token={reset_token}&email={to_email}");

        let subject = "Reset your Storefront password";
        let text_body = format!(
            r#"Hi {to_name},

We received a request to reset your Storefront password. Use the secure link below to set a new one:
{reset_link}

The link expires shortly. Never share it with anyone. If you did not request this, no action is required.

Storefront Security
"#
        );
        let html_body = wrap_html(
            "Reset your password",
            &format!(
                r#"<p>Hi {to_name},</p>
<p>We received a request to reset your Storefront password.</p>
<p><a href="{reset_link}">Reset your password</a></p>
<p>The link expires shortly. Never share it with anyone. If you did not request this, no action is required.</p>"#
            ),
        );

        self.send_email(to_email, subject, &html_body, &text_body).await
    }

    /// Send an email using SMTP
    async fn send_email(&self, to_email: &str, subject: &str, html_body: &str, text_body: &str) -> Result<(), AppError> {
        let email = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_address)
                    .parse()
                    .map_err(|e| AppError::email(format!("Invalid from address: {}", e)))?,
            )
            .to(to_email.parse().map_err(|e| AppError::email(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::email(format!("Failed to build email: {}", e)))?;

        let creds = Credentials::new(self.config.smtp_username.clone(), self.config.smtp_password.clone());

        let mailer = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(|e| AppError::email(format!("Failed to create SMTP transport: {}", e)))?
            .credentials(creds)
            .port(self.config.smtp_port)
            .build();

        // Send the email (blocking operation, run off the async workers)
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::email(format!("Failed to spawn email sending task: {}", e)))?;

        result.map_err(|e| AppError::email(format!("Failed to send email: {}", e)))?;

        tracing::info!("Email sent successfully to {}", to_email);
        Ok(())
    }
}

fn wrap_html(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>{title}</title></head>
<body style="font-family: sans-serif; color: #141517; line-height: 1.6;">
<h1 style="font-size: 22px;">{title}</h1>
{body}
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config() -> EmailConfig {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 587,
            smtp_username: "test".to_string(),
            smtp_password: "test".to_string(),
            from_address: "noreply@storefront.local".to_string(),
            from_name: "Storefront".to_string(),
            enabled: false,
        }
    }

    #[tokio::test]
    async fn disabled_service_skips_sending_without_error() {
        let service = EmailService::new(disabled_config());
        service
            .send_verification_email("a@example.com", "A", "tok", "http://localhost:3000")
            .await
            .expect("disabled send is a no-op");
        service
            .send_password_reset_email("a@example.com", "A", "tok", "http://localhost:3000")
            .await
            .expect("disabled send is a no-op");
    }

    #[test]
    fn html_wrapper_contains_title_and_body() {
        let html = wrap_html("Reset your password", "<p>hello</p>");
        assert!(html.contains("Reset your password"));
        assert!(html.contains("<p>hello</p>"));
    }
}
