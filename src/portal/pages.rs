//! Usage: HTML rendering for the portal pages.
//!
//! Every interpolated value goes through `escape_html`.

use crate::shared::security::escape_html;

const BASE_STYLE: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            display: flex;
            flex-direction: column;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            background: #f8f9fa;
            color: #333;
            padding: 1.5rem;
        }
        h1 { font-size: 2.25rem; font-weight: 700; margin-bottom: 2rem; }
        h2 { font-size: 1.5rem; font-weight: 700; margin-bottom: 1rem; }
        p { font-size: 1.125rem; line-height: 1.6; margin-bottom: 1rem; }
        .center { text-align: center; }
        .spinner {
            width: 4rem;
            height: 4rem;
            border: 4px solid #2563eb;
            border-top-color: transparent;
            border-radius: 50%;
            margin: 0 auto 1rem;
            animation: spin 1s linear infinite;
        }
        @keyframes spin { to { transform: rotate(360deg); } }
        .card {
            background: #fff;
            padding: 2rem;
            border-radius: 0.5rem;
            max-width: 28rem;
            width: 100%;
            box-shadow: 0 10px 25px rgba(0, 0, 0, 0.15);
        }
        .button {
            display: block;
            width: 100%;
            background: #2563eb;
            color: #fff;
            text-align: center;
            text-decoration: none;
            padding: 0.75rem 1rem;
            border-radius: 0.5rem;
            transition: background 0.15s;
        }
        .button:hover { background: #1d4ed8; }
        .error-code {
            font-family: monospace;
            background: #f1f3f5;
            padding: 0.25rem 0.5rem;
            border-radius: 4px;
            font-size: 0.875rem;
            color: #666;
            margin-bottom: 1rem;
            display: inline-block;
        }
        .error-title { color: #dc3545; }
        a.home { color: #007bff; text-decoration: none; }
"#;

fn layout(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>{head_extra}
    <style>{BASE_STYLE}</style>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape_html(title),
    )
}

fn spinner(message: &str) -> String {
    format!(
        r#"    <div class="center">
        <div class="spinner"></div>
        <p>{}</p>
    </div>"#,
        escape_html(message)
    )
}

pub(crate) fn render_landing(app_name: &str) -> String {
    let body = format!(
        r#"    <main class="center">
        <h1>{}</h1>
        <p>Welcome to the web portal</p>
    </main>"#,
        escape_html(app_name)
    );
    layout(app_name, "", &body)
}

/// Spinner page that sends the browser to `deep_link`, or just spins when there is nothing to hand off.
pub(crate) fn render_redirect(app_name: &str, deep_link: Option<&str>) -> String {
    let Some(link) = deep_link else {
        return layout(app_name, "", &spinner("Redirecting back to app..."));
    };

    let href = escape_html(link);
    // JSON string literal is valid JS; `<` is escaped so the value cannot close the script tag.
    let js_link = serde_json::Value::String(link.to_string())
        .to_string()
        .replace('<', "\\u003c");
    let head = format!(
        r#"
    <meta http-equiv="refresh" content="0;url={href}">
    <script>window.location.href = {js_link};</script>"#
    );
    let body = format!(
        r#"{}
    <p class="center"><a class="home" href="{href}">Open the app</a></p>"#,
        spinner("Redirecting back to app...")
    );
    layout(app_name, &head, &body)
}

pub(crate) fn render_connecting(app_name: &str) -> String {
    layout(app_name, "", &spinner("Connecting to Google..."))
}

/// "Open in app" page shown after a successful sign-in.
pub(crate) fn render_success(app_name: &str, user_name: &str, deep_link: &str) -> String {
    let body = format!(
        r#"    <div id="auth-modal" class="card">
        <h2>Authentication Successful!</h2>
        <p>Welcome, {name}</p>
        <p>Click below to open the app:</p>
        <a id="openAppBtn" class="button" href="{href}">Open in {app}</a>
    </div>"#,
        name = escape_html(user_name),
        href = escape_html(deep_link),
        app = escape_html(app_name),
    );
    layout(app_name, "", &body)
}

pub(crate) fn render_error(app_name: &str, code: &str, message: &str) -> String {
    let body = format!(
        r#"    <div class="card center">
        <h2 class="error-title">Authentication failed</h2>
        <div class="error-code">{code}</div>
        <p>{message}</p>
        <a class="home" href="/">&larr; Return Home</a>
    </div>"#,
        code = escape_html(code),
        message = escape_html(message),
    );
    layout(app_name, "", &body)
}
