//! HTML bodies for outbound e-mail. Every interpolated value passes through [`escape_html`].

use chrono::{DateTime, Utc};

use crate::workflows::accounts::domain::User;
use crate::workflows::listings::domain::Job;

const BRAND: &str = "FreeJobAlert";

/// A rendered message ready for a notifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub subject: String,
    pub body: String,
}

pub fn compose_job_alert_subject(job: &Job) -> String {
    format!("New job alert: {} ({})", job.title, job.organization)
}

/// Job alert body. Depends only on the job so one rendering serves a whole dispatch run.
pub fn compose_job_alert_body(job: &Job) -> String {
    let mut html = String::new();
    html.push_str(&header("New Job Alert!", "#2563eb"));
    html.push_str("<div style=\"padding: 20px;\">");
    html.push_str("<p>Hello,</p>");
    html.push_str("<p>A new government job matching your preferences has been published:</p>");
    html.push_str(&job_card(job));
    html.push_str(
        "<p><strong>Tip:</strong> apply early, application windows close without extension.</p>",
    );
    html.push_str(&format!("<p>Best regards,<br>The {BRAND} Team</p></div>"));
    html.push_str(&footer(
        "You receive this e-mail because job alerts are enabled on your account. Update your preferences to stop them.",
    ));
    wrap(html)
}

pub fn compose_job_alert(job: &Job) -> ComposedMessage {
    ComposedMessage {
        subject: compose_job_alert_subject(job),
        body: compose_job_alert_body(job),
    }
}

pub fn compose_welcome(user: &User) -> ComposedMessage {
    let mut html = String::new();
    html.push_str(&header(&format!("Welcome to {BRAND}!"), "#2563eb"));
    html.push_str("<div style=\"padding: 20px;\">");
    html.push_str(&format!("<h2>Hello {},</h2>", escape_html(&user.full_name)));
    html.push_str("<p>Thank you for registering. With your account you can:</p><ul>");
    for item in [
        "Get job alerts that match your preferred categories",
        "Apply to government job openings",
        "Track the applications you have submitted",
    ] {
        html.push_str(&format!("<li>{item}</li>"));
    }
    html.push_str("</ul>");
    html.push_str(&format!(
        "<p><strong>E-mail:</strong> {}<br><strong>Registered:</strong> {}</p>",
        escape_html(&user.email),
        format_date(user.created_at)
    ));
    html.push_str(&format!("<p>Best regards,<br>The {BRAND} Team</p></div>"));
    html.push_str(&footer(
        "You received this e-mail because you registered on our platform.",
    ));

    ComposedMessage {
        subject: format!("Welcome to {BRAND} - your gateway to government jobs"),
        body: wrap(html),
    }
}

pub fn compose_application_confirmation(
    user: &User,
    job: &Job,
    applied_at: DateTime<Utc>,
) -> ComposedMessage {
    let mut html = String::new();
    html.push_str(&header("Application Confirmed", "#059669"));
    html.push_str("<div style=\"padding: 20px;\">");
    html.push_str(&format!("<h2>Hello {},</h2>", escape_html(&user.full_name)));
    html.push_str("<p>Your application has been submitted.</p>");
    html.push_str(&format!(
        "<div style=\"background: #f3f4f6; padding: 15px;\"><h3>{}</h3><p><strong>Organization:</strong> {}</p><p><strong>Location:</strong> {}, {}</p><p><strong>Application date:</strong> {}</p></div>",
        escape_html(&job.title),
        escape_html(&job.organization),
        escape_html(&job.location),
        escape_html(&job.state),
        format_date(applied_at)
    ));
    html.push_str("<p>Watch for admit card and result announcements for this position.</p>");
    html.push_str(&format!("<p>Best regards,<br>The {BRAND} Team</p></div>"));

    ComposedMessage {
        subject: format!("Application confirmed - {}", job.title),
        body: wrap(html),
    }
}

fn job_card(job: &Job) -> String {
    let mut card = String::from(
        "<div style=\"border: 1px solid #e5e7eb; border-radius: 8px; padding: 15px; margin: 10px 0;\">",
    );
    card.push_str(&format!(
        "<h3 style=\"color: #2563eb;\">{}</h3>",
        escape_html(&job.title)
    ));
    card.push_str(&format!(
        "<p><strong>Organization:</strong> {}</p>",
        escape_html(&job.organization)
    ));
    card.push_str(&format!(
        "<p><strong>Location:</strong> {}, {}</p>",
        escape_html(&job.location),
        escape_html(&job.state)
    ));
    card.push_str(&format!(
        "<p><strong>Category:</strong> {}</p>",
        job.category.label()
    ));
    if let Some(level) = job.min_education {
        card.push_str(&format!(
            "<p><strong>Minimum education:</strong> {}</p>",
            level.label()
        ));
    }
    card.push_str(&format!("<p><strong>Posts:</strong> {}</p>", job.total_posts));
    card.push_str(&format!(
        "<p><strong>Last date:</strong> {}</p>",
        format_date(job.application_end_date)
    ));
    if let Some(url) = &job.apply_online_url {
        card.push_str(&format!(
            "<p><a href=\"{}\">Apply now</a></p>",
            escape_html(url)
        ));
    }
    card.push_str("</div>");
    card
}

fn header(title: &str, color: &str) -> String {
    format!(
        "<div style=\"background: {color}; padding: 20px; text-align: center;\"><h1 style=\"color: white; margin: 0;\">{}</h1></div>",
        escape_html(title)
    )
}

fn footer(note: &str) -> String {
    format!(
        "<div style=\"background: #f9fafb; padding: 15px; text-align: center; font-size: 12px; color: #6b7280;\"><p>{BRAND}.com</p><p>{}</p></div>",
        escape_html(note)
    )
}

fn wrap(inner: String) -> String {
    format!(
        "<html><body style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">{inner}</body></html>"
    )
}

fn format_date(value: DateTime<Utc>) -> String {
    value.format("%B %d, %Y").to_string()
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
