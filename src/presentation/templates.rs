//! Server-rendered HTML pages.
//!
//! Every value that comes from a request or the database goes through
//! [`escape`] before it is interpolated.

use crate::domain::account::SignupForm;
use crate::domain::contact::ContactForm;
use crate::presentation::flash::Flash;
use std::fmt::Write;

/// Per-request data every page shares.
pub struct Page<'a> {
    pub username: Option<&'a str>,
    pub flashes: &'a [Flash],
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(page: &Page<'_>, title: &str, content: &str) -> String {
    let nav = match page.username {
        Some(username) => format!(
            r#"<span>Logged in as <strong>{}</strong></span> <a href="/">Home</a> <a href="/contact">Contact</a> <a href="/logout">Log out</a>"#,
            escape(username)
        ),
        None => r#"<a href="/login">Log in</a> <a href="/signup">Sign up</a> <a href="/contact">Contact</a>"#
            .to_string(),
    };

    let mut flashes = String::new();
    for flash in page.flashes {
        let _ = write!(
            flashes,
            r#"<div class="flash flash-{}" role="alert">{}</div>"#,
            flash.level.as_str(),
            escape(&flash.message)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>
body {{ font-family: sans-serif; max-width: 40rem; margin: 2rem auto; padding: 0 1rem; }}
nav a, nav span {{ margin-right: 1rem; }}
label {{ display: block; margin-top: 0.75rem; }}
input, textarea {{ width: 100%; padding: 0.4rem; box-sizing: border-box; }}
button {{ margin-top: 1rem; padding: 0.5rem 1.25rem; }}
.flash {{ padding: 0.75rem; margin: 1rem 0; border-radius: 4px; }}
.flash-danger {{ background: #f8d7da; color: #721c24; }}
.flash-success {{ background: #d4edda; color: #155724; }}
.flash-info {{ background: #d1ecf1; color: #0c5460; }}
</style>
</head>
<body>
<nav>{nav}</nav>
{flashes}
<main>
{content}
</main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn text_input(name: &str, label: &str, kind: &str, value: &str, required: bool) -> String {
    format!(
        r#"<label for="{name}">{label}</label><input id="{name}" name="{name}" type="{kind}" value="{value}"{required}>"#,
        value = escape(value),
        required = if required { " required" } else { "" },
    )
}

pub fn home(page: &Page<'_>, username: &str) -> String {
    let content = format!(
        r#"<h1>Welcome, {}!</h1>
<p>You are logged in. Send us a note through the <a href="/contact">contact form</a>.</p>"#,
        escape(username)
    );
    layout(page, "Home", &content)
}

pub fn signup(page: &Page<'_>, form: &SignupForm) -> String {
    let content = format!(
        r#"<h1>Sign up</h1>
<form method="post" action="/signup">
{}
{}
{}
{}
{}
<button type="submit">Create account</button>
</form>
<p>Already have an account? <a href="/login">Log in</a>.</p>"#,
        text_input("username", "Username", "text", &form.username, true),
        text_input("firstname", "First name", "text", &form.first_name, false),
        text_input("lastname", "Last name", "text", &form.last_name, false),
        text_input("email", "Email", "email", &form.email, true),
        text_input("password", "Password", "password", "", true),
    );
    layout(page, "Sign up", &content)
}

pub fn login(page: &Page<'_>, username: &str) -> String {
    let content = format!(
        r#"<h1>Log in</h1>
<form method="post" action="/login">
{}
{}
<button type="submit">Log in</button>
</form>
<p>No account yet? <a href="/signup">Sign up</a>.</p>"#,
        text_input("username", "Username", "text", username, true),
        text_input("password", "Password", "password", "", true),
    );
    layout(page, "Log in", &content)
}

pub fn contact(page: &Page<'_>, form: &ContactForm) -> String {
    let content = format!(
        r#"<h1>Contact us</h1>
<form method="post" action="/contact">
{}
{}
{}
<label for="message">Message</label><textarea id="message" name="message" rows="6" required>{}</textarea>
<button type="submit">Send</button>
</form>"#,
        text_input("name", "Name", "text", &form.name, true),
        text_input("email", "Email", "email", &form.email, true),
        text_input("phone", "Phone (optional)", "tel", &form.phone, false),
        escape(&form.message),
    );
    layout(page, "Contact", &content)
}

pub fn sent(page: &Page<'_>) -> String {
    layout(
        page,
        "Message sent",
        r#"<h1>Thank you!</h1>
<p>Your message has been sent. We will get back to you soon.</p>
<p><a href="/contact">Send another message</a></p>"#,
    )
}

pub fn error(status: u16, message: &str) -> String {
    let page = Page {
        username: None,
        flashes: &[],
    };
    let content = format!(
        r#"<h1>Error {status}</h1>
<p>{}</p>
<p><a href="/">Back to the home page</a></p>"#,
        escape(message)
    );
    layout(&page, "Error", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page<'a>(username: Option<&'a str>, flashes: &'a [Flash]) -> Page<'a> {
        Page { username, flashes }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape(r#"<script>alert("x&y")</script>'"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;&#x27;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_home_escapes_username() {
        let html = home(&page(Some("<b>"), &[]), "<b>");
        assert!(html.contains("Welcome, &lt;b&gt;!"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_layout_renders_flashes() {
        let flashes = [Flash::danger("Invalid credentials, please try again.")];
        let html = login(&page(None, &flashes), "");
        assert!(html.contains(r#"class="flash flash-danger""#));
        assert!(html.contains("Invalid credentials, please try again."));
    }

    #[test]
    fn test_signup_never_echoes_password() {
        let form = SignupForm {
            username: "alice".to_string(),
            password: "topsecret".to_string(),
            ..Default::default()
        };
        let html = signup(&page(None, &[]), &form);
        assert!(html.contains(r#"value="alice""#));
        assert!(!html.contains("topsecret"));
    }

    #[test]
    fn test_nav_depends_on_session() {
        let anonymous = sent(&page(None, &[]));
        assert!(anonymous.contains(r#"href="/login""#));
        assert!(!anonymous.contains(r#"href="/logout""#));

        let logged_in = sent(&page(Some("alice"), &[]));
        assert!(logged_in.contains(r#"href="/logout""#));
    }

    #[test]
    fn test_contact_prefills_message() {
        let form = ContactForm {
            message: "a < b".to_string(),
            ..Default::default()
        };
        let html = contact(&page(None, &[]), &form);
        assert!(html.contains("a &lt; b</textarea>"));
    }
}
