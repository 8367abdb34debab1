//! HTML templates for the mock SAML2 login pages.

use mocksaml_core::auth::FormErrors;

/// Escape HTML special characters to prevent XSS.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn error_list(errors: &[String]) -> String {
    if errors.is_empty() {
        return String::new();
    }
    let items: String = errors
        .iter()
        .map(|e| format!("<li>{}</li>", html_escape(e)))
        .collect();
    format!(r#"<ul class="errorlist">{items}</ul>"#)
}

const STYLE: &str = r#"
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, sans-serif;
            max-width: 400px;
            margin: 100px auto;
            padding: 20px;
        }
        .warning {
            background: #fff3cd;
            border: 1px solid #ffc107;
            padding: 15px;
            border-radius: 8px;
            margin-bottom: 20px;
        }
        .warning h2 {
            color: #856404;
            margin-top: 0;
        }
        form {
            background: #f8f9fa;
            padding: 20px;
            border-radius: 8px;
        }
        label {
            display: block;
            margin-bottom: 5px;
            font-weight: 500;
        }
        input[type="text"], input[type="password"] {
            width: 100%;
            padding: 10px;
            margin-bottom: 15px;
            border: 1px solid #ced4da;
            border-radius: 4px;
            box-sizing: border-box;
        }
        .errorlist {
            color: #842029;
            background: #f8d7da;
            border-radius: 4px;
            padding: 10px 10px 10px 30px;
        }
        button {
            width: 100%;
            padding: 12px;
            background: #007bff;
            color: white;
            border: none;
            border-radius: 4px;
            cursor: pointer;
            font-size: 16px;
        }
        button:hover {
            background: #0056b3;
        }
    </style>"#;

/// Generate the credential form.
///
/// `next` travels as a hidden field; `username` is echoed back on re-render,
/// the password never is.
pub fn login_page(next: &str, username: &str, errors: &FormErrors) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Mock SAML2 Sign In (DEV ONLY)</title>{STYLE}
</head>
<body>
    <div class="warning">
        <h2>Development Only</h2>
        <p>This is a <strong>mock SAML2 identity provider</strong> for testing purposes.</p>
        <p>Sign in with one of the configured mock users.</p>
    </div>

    <form action="" method="POST">
        {non_field_errors}
        <input type="hidden" name="next" value="{next}" />

        <label for="id_username">Username</label>
        {username_errors}
        <input type="text" id="id_username" name="username" value="{username}" autofocus required />

        <label for="id_password">Password</label>
        {password_errors}
        <input type="password" id="id_password" name="password" required />

        <button type="submit">Sign in</button>
    </form>
</body>
</html>"#,
        non_field_errors = error_list(&errors.non_field),
        username_errors = error_list(&errors.username),
        password_errors = error_list(&errors.password),
        next = html_escape(next),
        username = html_escape(username),
    )
}

/// Generate the notice shown to an already-authenticated user at the login page.
pub fn auth_error_page(came_from: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Authorization Error</title>{STYLE}
</head>
<body>
    <div class="warning">
        <h2>Authorization Error</h2>
        <p>You are already signed in. Log out first to sign in as a different user.</p>
    </div>
    <p><a href="{came_from}">Continue</a></p>
</body>
</html>"#,
        came_from = html_escape(came_from),
    )
}
