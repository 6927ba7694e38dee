use crate::config::AppConfig;
use askama::Template;
use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use std::env;
use std::sync::{Arc, Mutex};

#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    #[error("Failed to build email message: {0}")]
    MessageBuild(String),
    #[error("Failed to send email: {0}")]
    SendFailed(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Contact-form payload forwarded to the administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

/// Details of a freshly uploaded contract, for the administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractNotice {
    pub contract_id: i64,
    pub uploader_name: String,
    pub uploader_email: String,
    pub file_name: String,
    pub service_title: Option<String>,
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send_verification_email(
        &self,
        to_email: &str,
        name: &str,
        token: &str,
    ) -> Result<(), EmailError>;
    async fn send_drive_link(
        &self,
        to_email: &str,
        name: Option<&str>,
        drive_link: &str,
        note: Option<&str>,
    ) -> Result<(), EmailError>;
    async fn send_contract_notification(&self, notice: &ContractNotice) -> Result<(), EmailError>;
    async fn send_contact_form(&self, contact: &ContactMessage) -> Result<(), EmailError>;
}

/// A message captured by [`MockEmailService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub struct MockEmailService {
    base_url: String,
    admin_email: String,
    outbox: Mutex<Vec<OutgoingEmail>>,
}

impl MockEmailService {
    pub fn new(base_url: impl Into<String>, admin_email: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            admin_email: admin_email.into(),
            outbox: Mutex::new(Vec::new()),
        }
    }

    /// Everything "sent" so far, oldest first.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.outbox
            .lock()
            .map(|outbox| outbox.clone())
            .unwrap_or_default()
    }

    fn record(&self, to: &str, subject: String, body: String) {
        tracing::info!("📧 [MOCK EMAIL] To: {}", to);
        tracing::info!("   Subject: {}", subject);
        tracing::info!("   {}", body);
        tracing::info!("   ---");
        if let Ok(mut outbox) = self.outbox.lock() {
            outbox.push(OutgoingEmail {
                to: to.to_string(),
                subject,
                body,
            });
        }
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        let base_url = env::var("BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let admin_email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string());
        Self::new(base_url, admin_email)
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_verification_email(
        &self,
        to_email: &str,
        _name: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let verification_url = format!("{}/auth/verify/{}", self.base_url, token);
        self.record(
            to_email,
            VERIFICATION_SUBJECT.to_string(),
            format!("Verification link: {}", verification_url),
        );
        Ok(())
    }

    async fn send_drive_link(
        &self,
        to_email: &str,
        _name: Option<&str>,
        drive_link: &str,
        note: Option<&str>,
    ) -> Result<(), EmailError> {
        let body = match note {
            Some(note) => format!("Drive link: {}\nNote: {}", drive_link, note),
            None => format!("Drive link: {}", drive_link),
        };
        self.record(to_email, DRIVE_LINK_SUBJECT.to_string(), body);
        Ok(())
    }

    async fn send_contract_notification(&self, notice: &ContractNotice) -> Result<(), EmailError> {
        self.record(
            &self.admin_email,
            contract_subject(notice),
            format!(
                "Contract #{} ({}) uploaded by {} <{}>",
                notice.contract_id, notice.file_name, notice.uploader_name, notice.uploader_email
            ),
        );
        Ok(())
    }

    async fn send_contact_form(&self, contact: &ContactMessage) -> Result<(), EmailError> {
        self.record(
            &self.admin_email,
            contact_subject(contact),
            format!("From: {} <{}>\n{}", contact.name, contact.email, contact.message),
        );
        Ok(())
    }
}

const VERIFICATION_SUBJECT: &str = "تأكيد البريد الإلكتروني";
const DRIVE_LINK_SUBJECT: &str = "رابط ملفاتك على Google Drive";

fn contract_subject(notice: &ContractNotice) -> String {
    format!("عقد جديد مرفوع من {}", notice.uploader_name)
}

fn contact_subject(contact: &ContactMessage) -> String {
    format!("رسالة تواصل جديدة من {}", contact.name)
}

#[derive(Template)]
#[template(path = "email/verification.html")]
struct VerificationEmail<'a> {
    name: &'a str,
    verification_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/drive_link.html")]
struct DriveLinkEmail<'a> {
    name: Option<&'a str>,
    drive_link: &'a str,
    note: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "email/contract_notice.html")]
struct ContractNoticeEmail<'a> {
    notice: &'a ContractNotice,
    base_url: &'a str,
}

#[derive(Template)]
#[template(path = "email/contact.html")]
struct ContactEmail<'a> {
    contact: &'a ContactMessage,
}

fn render(template: &impl Template) -> Result<String, EmailError> {
    template
        .render()
        .map_err(|e| EmailError::MessageBuild(format!("Template error: {}", e)))
}

pub struct SmtpEmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_email: String,
    from_name: String,
    base_url: String,
    admin_email: String,
}

impl SmtpEmailService {
    pub fn new(config: &AppConfig) -> Result<Self, EmailError> {
        let smtp_host = env::var("SMTP_HOST")
            .map_err(|_| EmailError::ConfigError("SMTP_HOST not set".to_string()))?;
        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse::<u16>()
            .map_err(|_| EmailError::ConfigError("Invalid SMTP_PORT".to_string()))?;
        let smtp_username = env::var("SMTP_USERNAME")
            .map_err(|_| EmailError::ConfigError("SMTP_USERNAME not set".to_string()))?;
        let smtp_password = env::var("SMTP_PASSWORD")
            .map_err(|_| EmailError::ConfigError("SMTP_PASSWORD not set".to_string()))?;
        let from_email = env::var("SMTP_FROM_EMAIL")
            .map_err(|_| EmailError::ConfigError("SMTP_FROM_EMAIL not set".to_string()))?;
        let from_name = env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "منصة تعليم".to_string());

        let encryption = env::var("SMTP_ENCRYPTION").unwrap_or_else(|_| "starttls".to_string());

        let credentials = Credentials::new(smtp_username, smtp_password);

        let mailer = match encryption.to_lowercase().as_str() {
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp_host)
                .map_err(|e| EmailError::ConfigError(format!("SMTP relay error: {}", e)))?
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            "starttls" => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp_host)
                .map_err(|e| EmailError::ConfigError(format!("SMTP starttls error: {}", e)))?
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp_host)
                .port(smtp_port)
                .credentials(credentials)
                .build(),
            _ => {
                return Err(EmailError::ConfigError(format!(
                    "Invalid SMTP_ENCRYPTION value: {}. Use 'tls', 'starttls', or 'none'",
                    encryption
                )))
            }
        };

        Ok(Self {
            mailer,
            from_email,
            from_name,
            base_url: config.base_url.clone(),
            admin_email: config.admin_email.clone(),
        })
    }

    async fn deliver(
        &self,
        to_email: &str,
        reply_to: Option<&str>,
        subject: String,
        html_body: String,
    ) -> Result<(), EmailError> {
        let mut builder = Message::builder()
            .from(
                format!("{} <{}>", self.from_name, self.from_email)
                    .parse()
                    .map_err(|e| {
                        EmailError::MessageBuild(format!("Invalid from address: {}", e))
                    })?,
            )
            .to(to_email
                .parse()
                .map_err(|e| EmailError::MessageBuild(format!("Invalid to address: {}", e)))?);

        if let Some(reply_to) = reply_to {
            builder = builder.reply_to(reply_to.parse().map_err(|e| {
                EmailError::MessageBuild(format!("Invalid reply-to address: {}", e))
            })?);
        }

        let email = builder
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html_body)
            .map_err(|e| EmailError::MessageBuild(e.to_string()))?;

        self.mailer
            .send(email)
            .await
            .map_err(|e| EmailError::SendFailed(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl EmailService for SmtpEmailService {
    async fn send_verification_email(
        &self,
        to_email: &str,
        name: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let verification_url = format!("{}/auth/verify/{}", self.base_url, token);
        let body = render(&VerificationEmail {
            name,
            verification_url: &verification_url,
        })?;

        self.deliver(to_email, None, VERIFICATION_SUBJECT.to_string(), body)
            .await
    }

    async fn send_drive_link(
        &self,
        to_email: &str,
        name: Option<&str>,
        drive_link: &str,
        note: Option<&str>,
    ) -> Result<(), EmailError> {
        let body = render(&DriveLinkEmail {
            name,
            drive_link,
            note,
        })?;

        self.deliver(to_email, None, DRIVE_LINK_SUBJECT.to_string(), body)
            .await
    }

    async fn send_contract_notification(&self, notice: &ContractNotice) -> Result<(), EmailError> {
        let body = render(&ContractNoticeEmail {
            notice,
            base_url: &self.base_url,
        })?;

        self.deliver(
            &self.admin_email,
            Some(&notice.uploader_email),
            contract_subject(notice),
            body,
        )
        .await
    }

    async fn send_contact_form(&self, contact: &ContactMessage) -> Result<(), EmailError> {
        let body = render(&ContactEmail { contact })?;

        self.deliver(
            &self.admin_email,
            Some(&contact.email),
            contact_subject(contact),
            body,
        )
        .await
    }
}

pub fn create_email_service(config: &AppConfig) -> Arc<dyn EmailService> {
    if env::var("SMTP_HOST").is_ok_and(|host| !host.trim().is_empty()) {
        match SmtpEmailService::new(config) {
            Ok(service) => {
                tracing::info!("Using SMTP email service");
                Arc::new(service)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to initialize SMTP email service: {}. Falling back to mock service",
                    e
                );
                Arc::new(MockEmailService::new(&config.base_url, &config.admin_email))
            }
        }
    } else {
        tracing::info!(
            "SMTP not configured. Using mock email service (emails will be logged to console)"
        );
        Arc::new(MockEmailService::new(&config.base_url, &config.admin_email))
    }
}
