//! Interactive info page.
//!
//! `GET /` renders identity labels and a form; `POST /` renders the same page
//! plus a block echoing the submitted name and message. Every interpolated
//! value is HTML-escaped.

use axum::{extract::State, response::Html, Form};
use serde::Deserialize;

use crate::app_state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct EchoForm {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub async fn home(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state, None))
}

pub async fn submit(State(state): State<AppState>, Form(form): Form<EchoForm>) -> Html<String> {
    let hostname = &state.host().hostname;
    let name = form.name.as_deref().unwrap_or("");
    let message = form.message.as_deref().unwrap_or("");
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string();

    tracing::info!(%name, %message, served_by = %hostname, "post data received");

    let echo = format!(
        r#"
        <h3>Response from server:</h3>
        Hello <b>{name}</b><br>
        Your message: {message}<br>
        Served by: {host}<br>
        Time: {now}
        "#,
        name = escape_html(name),
        message = escape_html(message),
        host = escape_html(hostname),
        now = now,
    );
    Html(render_page(&state, Some(&echo)))
}

fn render_page(state: &AppState, echo: Option<&str>) -> String {
    let app = &state.cfg().app;
    format!(
        r#"
    <h1>Interactive Server Info App</h1>

    Version: {version}<br>
    Environment: {environment}<br>
    Hostname: {hostname}<br>

    <hr>

    <form method="post">

        Name:<br>
        <input type="text" name="name"><br><br>

        Message:<br>
        <input type="text" name="message"><br><br>

        <input type="submit" value="Send">

    </form>

    {echo}

    "#,
        version = escape_html(&app.version),
        environment = escape_html(&app.environment),
        hostname = escape_html(&state.host().hostname),
        echo = echo.unwrap_or(""),
    )
}

pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
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

#[cfg(test)]
mod tests {
    use super::escape_html;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
