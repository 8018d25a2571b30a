// src/notify/email.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::DeliveryChannel;
use crate::rank::Selection;

const STYLE_BODY: &str = "font-family: 'Segoe UI', sans-serif; color: #333; line-height: 1.6;";
const STYLE_CONTAINER: &str =
    "max-width: 600px; margin: 0 auto; border: 1px solid #e0e0e0; border-radius: 8px;";
const STYLE_HEADER: &str =
    "background-color: #4b2c92; padding: 20px; text-align: center; color: white;";
const STYLE_ARTICLE: &str =
    "margin-bottom: 25px; border-bottom: 1px solid #eee; padding-bottom: 15px;";
const STYLE_SOURCE: &str =
    "font-size: 11px; font-weight: bold; color: #666; text-transform: uppercase;";
const STYLE_TITLE: &str = "margin: 5px 0; font-size: 18px;";
const STYLE_LINK: &str = "text-decoration: none; color: #0078D4;";
const STYLE_DESC: &str = "font-size: 14px; color: #444; margin-top: 5px;";

/// Render the digest body. Pure so the formatting is testable without SMTP.
pub fn render_html(selection: &Selection) -> String {
    let mut html = format!(
        "<html><body style=\"{STYLE_BODY}\"><div style=\"{STYLE_CONTAINER}\">\
         <div style=\"{STYLE_HEADER}\"><h2 style=\"margin:0;\">Daily Brief</h2>\
         <p style=\"margin:5px 0 0; opacity: 0.9;\">Top {} stories</p></div>\
         <div style=\"padding: 20px;\">",
        selection.len()
    );

    for entry in selection {
        let art = &entry.article;
        html.push_str(&format!(
            "<div style=\"{STYLE_ARTICLE}\">\
             <span style=\"{STYLE_SOURCE}\">{}</span>\
             <h3 style=\"{STYLE_TITLE}\"><a href=\"{}\" style=\"{STYLE_LINK}\">{}</a></h3>\
             <p style=\"{STYLE_DESC}\"><b>Why it matters:</b> {}<br><br>{}</p></div>",
            escape(&art.source),
            escape(&art.link),
            escape(&art.title),
            escape(&entry.reason),
            escape(&art.summary),
        ));
    }

    html.push_str("</div></div></body></html>");
    html
}

fn escape(s: &str) -> String {
    html_escape::encode_text(s).to_string()
}

pub struct BriefMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl BriefMailer {
    /// Env contract: SMTP_HOST, SMTP_USER, SMTP_PASS, BRIEF_EMAIL_FROM,
    /// BRIEF_EMAIL_TO (falls back to BRIEF_EMAIL_FROM).
    pub fn from_env() -> Result<Self> {
        let host = std::env::var("SMTP_HOST").context("SMTP_HOST missing")?;
        let user = std::env::var("SMTP_USER").context("SMTP_USER missing")?;
        let pass = std::env::var("SMTP_PASS").context("SMTP_PASS missing")?;
        let from_addr = std::env::var("BRIEF_EMAIL_FROM").context("BRIEF_EMAIL_FROM missing")?;
        let to_addr = std::env::var("BRIEF_EMAIL_TO").unwrap_or_else(|_| from_addr.clone());

        let creds = Credentials::new(user, pass);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&host)
            .context("invalid SMTP_HOST")?
            .credentials(creds)
            .build();

        let from = from_addr.parse().context("invalid BRIEF_EMAIL_FROM")?;
        let to = to_addr.parse().context("invalid BRIEF_EMAIL_TO")?;

        Ok(Self { mailer, from, to })
    }
}

#[async_trait]
impl DeliveryChannel for BriefMailer {
    async fn deliver(&self, selection: &Selection) -> Result<()> {
        let subject = format!("Daily Brief: {} updates", selection.len());
        let msg = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_HTML)
            .body(render_html(selection))
            .context("build email")?;

        self.mailer.send(msg).await.context("send email")?;
        tracing::info!(count = selection.len(), "digest email sent");
        Ok(())
    }
}
