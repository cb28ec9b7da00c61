// src/clients/mailer.rs

use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Utc};
use lettre::{
    Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
};

use crate::{
    config::SmtpConfig,
    error::AppError,
    utils::{html::escape_text, otp::OTP_VALIDITY_MINUTES},
};

pub const PASSWORD_RECOVERY_SUBJECT: &str = "Password Recovery - Current Affairs-AI";

/// Outbound mail used by the password-recovery flow.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset_otp(&self, to: &str, name: &str, otp: &str)
    -> Result<(), AppError>;
}

/// SMTP relay mailer. The transport is built once and shared.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        // 465 speaks TLS from the first byte, everything else upgrades via STARTTLS
        let builder = if config.port == 465 {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
        }
        .map_err(|e| AppError::InternalServerError(format!("Failed to configure SMTP relay: {}", e)))?;

        let transport = builder
            .port(config.port)
            .credentials(credentials)
            .timeout(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        let address: Address = config
            .from_email
            .parse()
            .map_err(|e| AppError::InternalServerError(format!("Invalid sender address: {}", e)))?;

        Ok(Self {
            transport,
            from: Mailbox::new(Some(config.from_name.clone()), address),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_password_reset_otp(
        &self,
        to: &str,
        name: &str,
        otp: &str,
    ) -> Result<(), AppError> {
        let recipient: Mailbox = to
            .parse()
            .map_err(|_| AppError::BadRequest("Invalid recipient address".to_string()))?;

        let (text, html) = render_otp_email(name, otp);

        let message = Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(PASSWORD_RECOVERY_SUBJECT)
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| AppError::InternalServerError(format!("Failed to build email: {}", e)))?;

        self.transport.send(message).await.map_err(|e| {
            tracing::error!("Email Sending Error: {:?}", e);
            AppError::DependencyError("Failed to send email".to_string())
        })?;

        tracing::info!("Password recovery OTP sent to {}", to);
        Ok(())
    }
}

/// Plain-text and HTML bodies of the recovery mail.
pub fn render_otp_email(name: &str, otp: &str) -> (String, String) {
    let year = Utc::now().year();

    let text = format!(
        "Password Recovery\n\n\
         Hello {name},\n\n\
         We received a request to reset your password. Use the OTP below to proceed:\n\n\
         {otp}\n\n\
         This OTP is valid for {OTP_VALIDITY_MINUTES} minutes. Please do not share it with anyone.\n\
         If you didn't request this, please ignore this email or contact our support team.\n\n\
         Regards,\nCurrent Affairs-AI Team\n"
    );

    let html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <style>
        body {{ font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 0; background-color: #f4f7fa; }}
        .container {{ max-width: 600px; margin: 40px auto; background: white; border-radius: 10px; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); overflow: hidden; }}
        .header {{ background: #2c3e50; color: white; padding: 20px; text-align: center; }}
        .content {{ padding: 30px; line-height: 1.6; }}
        .otp {{ background: #eef2f7; padding: 15px; text-align: center; font-size: 24px; font-weight: bold; color: #2c3e50; border-radius: 5px; margin: 20px 0; }}
        .footer {{ background: #f8fafc; padding: 20px; text-align: center; font-size: 12px; color: #64748b; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header"><h2>Password Recovery</h2></div>
        <div class="content">
            <p>Hello {name},</p>
            <p>We received a request to reset your password. Use the OTP below to proceed:</p>
            <div class="otp">{otp}</div>
            <p>This OTP is valid for {minutes} minutes. Please do not share it with anyone.</p>
            <p>If you didn't request this, please ignore this email or contact our support team.</p>
        </div>
        <div class="footer">
            <p>Regards,<br>Current Affairs-AI Team</p>
            <p>&copy; {year} Current Affairs-AI. All rights reserved.</p>
        </div>
    </div>
</body>
</html>"#,
        name = escape_text(name),
        otp = otp,
        minutes = OTP_VALIDITY_MINUTES,
        year = year,
    );

    (text, html)
}
