//! Plain-text and HTML bodies for account emails.

use crate::delivery::OutgoingEmail;

const PRODUCT_NAME: &str = "Fiber Vision";

/// Email asking a new user to confirm their address.
pub fn verification_email(to: &str, name: &str, verification_url: &str, expiry_hours: i64) -> OutgoingEmail {
    let text = format!(
        "Hi {name},\n\n\
         Thanks for signing up for {PRODUCT_NAME}! Please verify your email address \
         by opening the link below. This helps us keep your account secure.\n\n\
         {verification_url}\n\n\
         This link will expire in {expiry_hours} hours. If you didn't create an account \
         with {PRODUCT_NAME}, please ignore this email."
    );
    let html = layout(
        "Verify Your Email Address",
        &format!(
            "<p>Hi <strong>{name}</strong>,</p>\
             <p>Thanks for signing up for {PRODUCT_NAME}! Please verify your email address \
             by clicking the button below. This helps us keep your account secure.</p>\
             {button}\
             <p class=\"notice\">This link will expire in {expiry_hours} hours. If you didn&apos;t \
             create an account with {PRODUCT_NAME}, please ignore this email.</p>",
            name = escape_html(name),
            button = button(verification_url, "Verify Email Address"),
        ),
    );
    OutgoingEmail {
        to: to.to_string(),
        subject: format!("Verify your email address for {PRODUCT_NAME}"),
        text,
        html,
    }
}

/// Email carrying a password reset link.
pub fn password_reset_email(to: &str, name: &str, reset_url: &str, expiry_minutes: i64) -> OutgoingEmail {
    let text = format!(
        "Hi {name},\n\n\
         We received a request to reset your password for your {PRODUCT_NAME} account. \
         Open the link below to choose a new password.\n\n\
         {reset_url}\n\n\
         This link will expire in {expiry_minutes} minutes. If you didn't request a \
         password reset, please ignore this email. Your password will remain unchanged."
    );
    let html = layout(
        "Reset Your Password",
        &format!(
            "<p>Hi <strong>{name}</strong>,</p>\
             <p>We received a request to reset your password for your {PRODUCT_NAME} \
             account. Click the button below to choose a new password.</p>\
             {button}\
             <p class=\"notice\">This link will expire in {expiry_minutes} minutes. If you \
             didn&apos;t request a password reset, please ignore this email. Your password \
             will remain unchanged.</p>",
            name = escape_html(name),
            button = button(reset_url, "Reset Password"),
        ),
    );
    OutgoingEmail {
        to: to.to_string(),
        subject: format!("Reset your password for {PRODUCT_NAME}"),
        text,
        html,
    }
}

fn button(url: &str, label: &str) -> String {
    let url = escape_html(url);
    format!(
        "<p style=\"text-align:center\"><a class=\"button\" href=\"{url}\">{label}</a></p>\
         <p>Or copy and paste this URL into your browser:</p>\
         <p><a href=\"{url}\">{url}</a></p>"
    )
}

fn layout(heading: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body style=\"font-family:sans-serif;color:#333333\">\
         <h1 style=\"text-align:center\">{heading}</h1>{body}\
         <hr><p style=\"font-size:12px;color:#64748b\">{PRODUCT_NAME}</p>\
         </body></html>"
    )
}

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
