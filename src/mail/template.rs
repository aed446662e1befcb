use chrono::{DateTime, Utc};

use crate::contact::FormPayload;

/// Escapes `& < > " '` so user text can be placed in HTML element content
/// or attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

pub fn subject_line(payload: &FormPayload) -> String {
    format!("[{}] {}", payload.subject, payload.full_name())
}

pub fn render_text(payload: &FormPayload) -> String {
    format!(
        "New contact form submission\n\n\
         Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Subject: {}\n\n\
         Message:\n\
         {}",
        payload.full_name(),
        payload.email,
        payload.phone,
        payload.subject,
        payload.message.trim(),
    )
}

fn info_row(label: &str, value: &str) -> String {
    format!(
        r#"
                  <tr>
                    <td style="padding:6px 0;color:#9ca3af;font-size:13px;width:120px;">{label}</td>
                    <td style="padding:6px 0;color:#e5e7eb;font-size:14px;">{}</td>
                  </tr>"#,
        escape_html(value)
    )
}

/// Renders the HTML notification. Every user-supplied value goes through
/// [`escape_html`]; message newlines become `<br/>` after escaping.
pub fn render_html(payload: &FormPayload, received: DateTime<Utc>) -> String {
    let rows = [
        info_row("Name", &payload.full_name()),
        info_row("Email", &payload.email),
        info_row("Phone", &payload.phone),
        info_row("Subject", payload.subject.label()),
    ]
    .concat();
    let message = escape_html(&payload.message)
        .replace("\r\n", "\n")
        .replace('\n', "<br/>");
    let received = received.format("%b %e, %Y %H:%M UTC");

    format!(
        r#"<!DOCTYPE html>
<html>
  <body style="margin:0;padding:0;background:#0b0f0d;font-family:Arial,sans-serif;">
    <table width="100%" cellpadding="0" cellspacing="0">
      <tr>
        <td align="center" style="padding:30px 16px;">
          <table width="100%" cellpadding="0" cellspacing="0" style="max-width:600px;background:#041b13;border-radius:16px;border:1px solid rgba(16,185,129,0.25);">
            <tr>
              <td style="padding:24px 24px 12px;">
                <h2 style="margin:0;color:#34d399;font-size:20px;">New Contact Message</h2>
                <p style="margin:6px 0 0;color:#9ca3af;font-size:14px;">Portfolio Contact Form</p>
              </td>
            </tr>
            <tr>
              <td style="padding:16px 24px;">
                <table width="100%" cellpadding="0" cellspacing="0">{rows}
                </table>
              </td>
            </tr>
            <tr>
              <td style="padding:16px 24px;">
                <p style="margin:0 0 8px;color:#9ca3af;font-size:13px;">Message</p>
                <div style="background:#020617;border-radius:12px;padding:16px;color:#e5e7eb;font-size:14px;line-height:1.6;border:1px solid rgba(255,255,255,0.08);">{message}</div>
              </td>
            </tr>
            <tr>
              <td style="padding:20px 24px;color:#6b7280;font-size:12px;text-align:center;">
                Received {received}. Reply directly to this email to respond to the sender.
              </td>
            </tr>
          </table>
        </td>
      </tr>
    </table>
  </body>
</html>
"#
    )
}
