//! Rendering of lead notifications and auto-replies.
//!
//! Every message has an HTML and a plain-text part. Persian messages are laid
//! out right-to-left. All user input is escaped before it reaches the HTML.

use crate::i18n::Language;
use crate::lead::{Lead, LeadKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedEmail {
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Escape the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
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

fn html_document(lang: Language, body: &str) -> String {
    let direction = lang.direction();
    format!(
        r#"<!DOCTYPE html>
<html lang="{code}" dir="{dir}">
<head><meta charset="UTF-8"></head>
<body style="font-family: Tahoma, Arial, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; direction: {dir}; text-align: {align};">
{body}
</body>
</html>"#,
        code = lang.code(),
        dir = direction.as_html(),
        align = direction.text_align(),
        body = body,
    )
}

/// Multi-line text keeps its line breaks in HTML.
fn html_paragraph(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}

/// Label/value pairs shown in the admin notification, in display order.
fn lead_rows(lead: &Lead, lang: Language) -> Vec<(&'static str, Option<String>)> {
    let s = lang.strings();
    let mut rows = vec![
        (s.label_name, Some(lead.name.clone())),
        (s.label_email, Some(lead.email.clone())),
        (s.label_phone, lead.phone.clone()),
        (s.label_company, lead.company.clone()),
        (s.label_website, lead.website.clone()),
    ];

    match lead.kind {
        LeadKind::ProjectRequest => rows.extend([
            (s.label_project_type, lead.project_type_label(lang)),
            (s.label_budget, lead.budget_label(lang)),
            (s.label_deadline, lead.deadline.clone()),
        ]),
        LeadKind::Contact => rows.push((s.label_service, lead.service.clone())),
    }

    rows.extend([
        (s.label_message, lead.message.clone()),
        (s.label_source_url, lead.source_url.clone()),
        (s.label_locale, Some(lead.locale.native_name().to_string())),
    ]);

    rows
}

/// Notification sent to the studio for a new lead.
pub fn compose_lead_notification(lead: &Lead, lang: Language) -> ComposedEmail {
    let s = lang.strings();
    let (subject, heading) = match lead.kind {
        LeadKind::ProjectRequest => (s.project_notification_subject, s.project_notification_heading),
        LeadKind::Contact => (s.contact_notification_subject, s.contact_notification_heading),
    };
    let subject = subject.replace("{name}", &lead.name);
    let rows = lead_rows(lead, lang);
    let align = lang.direction().text_align();

    let mut table = String::new();
    let mut text = format!("{}\n\n", heading);

    for (label, value) in &rows {
        let (html_value, text_value) = match value {
            Some(v) => (html_paragraph(v), v.as_str()),
            None => (
                format!(r#"<span style="color: #999;">{}</span>"#, escape_html(s.not_provided)),
                s.not_provided,
            ),
        };

        table.push_str(&format!(
            r#"    <tr><th style="text-align: {align}; padding: 6px 12px; background: #f5f5f5; vertical-align: top;">{label}</th><td style="padding: 6px 12px;">{value}</td></tr>
"#,
            align = align,
            label = escape_html(label),
            value = html_value,
        ));
        text.push_str(&format!("{}: {}\n", label, text_value));
    }

    let body = format!(
        r#"  <h1 style="color: #222; font-size: 20px;">{heading}</h1>
  <table style="border-collapse: collapse; width: 100%;">
{table}  </table>"#,
        heading = escape_html(heading),
        table = table,
    );

    ComposedEmail {
        subject,
        html: html_document(lang, &body),
        text,
    }
}

/// Confirmation sent to the person who submitted the form.
pub fn compose_auto_reply(name: &str, lang: Language) -> ComposedEmail {
    let s = lang.strings();
    let greeting = s.auto_reply_greeting.replace("{name}", name.trim());

    let body = format!(
        r#"  <p>{greeting}</p>
  <p>{body}</p>
  <p style="color: #666;">{signoff}</p>"#,
        greeting = escape_html(&greeting),
        body = html_paragraph(s.auto_reply_body),
        signoff = html_paragraph(s.auto_reply_signoff),
    );

    ComposedEmail {
        subject: s.auto_reply_subject.to_string(),
        html: html_document(lang, &body),
        text: format!("{}\n\n{}\n\n{}\n", greeting, s.auto_reply_body, s.auto_reply_signoff),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::LeadSubmission;

    fn project_lead(lang: Language) -> Lead {
        LeadSubmission {
            name: Some("Jane".to_string()),
            email: Some("jane@x.com".to_string()),
            project_type: Some("landing-page".to_string()),
            budget: Some("1000-2000".to_string()),
            message: Some("Line one\nLine two".to_string()),
            ..Default::default()
        }
        .validate(LeadKind::ProjectRequest, lang)
        .unwrap()
    }

    // ==================== Escaping Tests ====================

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape_html("سلام"), "سلام");
    }

    #[test]
    fn test_user_input_is_escaped_in_html() {
        let mut lead = project_lead(Language::ENGLISH);
        lead.name = "<b>Mallory</b>".to_string();
        lead.company = Some("A & B".to_string());

        let email = compose_lead_notification(&lead, Language::ENGLISH);
        assert!(!email.html.contains("<b>Mallory</b>"));
        assert!(email.html.contains("&lt;b&gt;Mallory&lt;/b&gt;"));
        assert!(email.html.contains("A &amp; B"));
        // Plain text is not HTML and stays verbatim
        assert!(email.text.contains("<b>Mallory</b>"));
    }

    // ==================== Notification Tests ====================

    #[test]
    fn test_english_project_notification() {
        let email = compose_lead_notification(&project_lead(Language::ENGLISH), Language::ENGLISH);

        assert_eq!(email.subject, "New project request from Jane");
        assert!(email.html.contains(r#"<html lang="en" dir="ltr">"#));
        assert!(email.html.contains("Landing page"));
        assert!(email.html.contains("$1,000 – $2,000"));
        assert!(email.html.contains("Line one<br>Line two"));
        assert!(email.text.contains("Budget: $1,000 – $2,000"));
        assert!(email.text.contains("Company: Not provided"));
    }

    #[test]
    fn test_persian_notification_is_rtl() {
        let email = compose_lead_notification(&project_lead(Language::PERSIAN), Language::PERSIAN);

        assert_eq!(email.subject, "درخواست پروژه جدید از Jane");
        assert!(email.html.contains(r#"<html lang="fa" dir="rtl">"#));
        assert!(email.html.contains("direction: rtl; text-align: right;"));
        assert!(email.html.contains("صفحه فرود"));
        // English budget value is unknown to the Persian list and shown verbatim
        assert!(email.text.contains("1000-2000"));
    }

    #[test]
    fn test_contact_notification_shows_service_not_budget() {
        let lead = LeadSubmission {
            name: Some("Sara".to_string()),
            email: Some("sara@x.com".to_string()),
            message: Some("Hello".to_string()),
            service: Some("brand-identity".to_string()),
            ..Default::default()
        }
        .validate(LeadKind::Contact, Language::ENGLISH)
        .unwrap();

        let email = compose_lead_notification(&lead, Language::ENGLISH);
        assert_eq!(email.subject, "New message from Sara");
        assert!(email.text.contains("Service: brand-identity"));
        assert!(!email.text.contains("Budget"));
    }

    // ==================== Auto-reply Tests ====================

    #[test]
    fn test_auto_reply_english() {
        let email = compose_auto_reply(" Jane ", Language::ENGLISH);
        assert_eq!(email.subject, Language::ENGLISH.strings().auto_reply_subject);
        assert!(email.text.starts_with("Hi Jane,"));
        assert!(email.html.contains("The Ario Studio team"));
    }

    #[test]
    fn test_auto_reply_persian_is_rtl_and_escaped() {
        let email = compose_auto_reply("<i>سارا</i>", Language::PERSIAN);
        assert!(email.html.contains(r#"dir="rtl""#));
        assert!(email.html.contains("&lt;i&gt;سارا&lt;/i&gt; عزیز،"));
    }
}
