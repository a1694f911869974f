// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTML pages for the onboarding flow.
//!
//! Pages are plain `format!` templates sharing one layout. Every value that
//! came from a request or the gateway goes through [`escape`].

use axum::http::StatusCode;

const STYLE: &str = r#"
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background: #f4f6f9; color: #222; margin: 0; }
        header { background: #1f3a5f; color: #fff; padding: 16px 24px; }
        header a { color: #cfe0f5; margin-right: 16px; text-decoration: none; }
        main { max-width: 760px; margin: 24px auto; background: #fff; padding: 24px; border-radius: 6px; }
        label { display: block; margin-top: 12px; font-weight: 600; }
        input, select { width: 100%; padding: 8px; margin-top: 4px; box-sizing: border-box; }
        button { margin-top: 20px; padding: 10px 18px; background: #1f3a5f; color: #fff; border: 0; border-radius: 4px; }
        pre { background: #f0f0f0; padding: 10px; white-space: pre-wrap; word-break: break-all; }
        .error { color: #a40000; }
"#;

/// Minimal HTML escaping for text and attribute values.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
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

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}</style>
</head>
<body>
    <header>
        <strong>SmartMandate Demo</strong>
        <nav>
            <a href="/home">New mandate</a>
            <a href="/queryMandate">Query mandate</a>
            <a href="/createKey">Create key</a>
        </nav>
    </header>
    <main>
{body}
    </main>
</body>
</html>
"#,
        title = escape(title),
    )
}

fn select(name: &str, options: &[(&str, &str)]) -> String {
    let items: String = options
        .iter()
        .map(|(code, label)| {
            format!(
                r#"            <option value="{}">{}</option>
"#,
                escape(code),
                escape(label)
            )
        })
        .collect();
    format!(
        r#"        <select id="{name}" name="{name}" required>
{items}        </select>"#
    )
}

fn input(name: &str, label: &str, kind: &str, value: &str) -> String {
    format!(
        r#"        <label for="{name}">{label}</label>
        <input type="{kind}" id="{name}" name="{name}" value="{value}" required>"#,
        value = escape(value),
    )
}

pub fn sign_in() -> String {
    layout(
        "Sign in",
        r#"        <h1>Sign in</h1>
        <p>Start a NACH mandate registration for a customer.</p>
        <form method="get" action="/home">
            <button type="submit">Continue</button>
        </form>"#,
    )
}

/// Mandate registration form.
pub fn home(account_types: &[(&str, &str)], frequencies: &[(&str, &str)]) -> String {
    let body = format!(
        r#"        <h1>Register mandate</h1>
        <form method="post" action="/home">
{consumer}
{reference}
        <label for="amount">Collection amount</label>
        <input type="number" id="amount" name="amount" min="0.01" step="0.01" required>
        <label for="frqcy">Frequency</label>
{frequency}
{first}
{last}
{name}
{mobile}
{account}
        <label for="dbtrAccTp">Account type</label>
{account_type}
{bank}
        <button type="submit">Create mandate</button>
        </form>"#,
        consumer = input("consumerRefNumber", "Consumer reference number", "text", ""),
        reference = input("referenceNumber", "Reference number", "text", ""),
        frequency = select("frqcy", frequencies),
        first = input("firstCollectionDate", "First collection date", "date", ""),
        last = input("finalCollectionDate", "Final collection date", "date", ""),
        name = input("dbtrNm", "Debtor name", "text", ""),
        mobile = input("mobile", "Mobile", "tel", ""),
        account = input("dbtrAccNo", "Debtor account number", "text", ""),
        account_type = select("dbtrAccTp", account_types),
        bank = input("bnkId", "Bank ID", "text", ""),
    );
    layout("Register mandate", &body)
}

/// Values shown on the query page after a submission.
#[derive(Debug, Clone, Default)]
pub struct QueryView {
    pub reference_number: String,
    pub encryption_key: String,
    pub url: String,
    pub api_key: String,
    pub result: Option<QueryResult>,
}

#[derive(Debug, Clone, Default)]
pub struct QueryResult {
    pub enc_data: String,
    pub url_enc: String,
    pub enc_response: String,
    pub dec_response: String,
}

pub fn query_mandate(view: &QueryView) -> String {
    let result = view
        .result
        .as_ref()
        .map(|r| {
            format!(
                r#"
        <h2>Result</h2>
        <h3>Encrypted reference</h3>
        <pre id="encData">{}</pre>
        <h3>URL-encoded reference</h3>
        <pre id="urlEnc">{}</pre>
        <h3>Gateway response</h3>
        <pre id="encResponse">{}</pre>
        <h3>Decrypted response</h3>
        <pre id="decResponse">{}</pre>"#,
                escape(&r.enc_data),
                escape(&r.url_enc),
                escape(&r.enc_response),
                escape(&r.dec_response)
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"        <h1>Query mandate</h1>
        <form method="post" action="/queryMandate">
{reference}
{key}
{url}
{api_key}
        <button type="submit">Query</button>
        </form>{result}"#,
        reference = input("referenceNumber", "Reference number", "text", &view.reference_number),
        key = input("encryptionKey", "Encryption key", "text", &view.encryption_key),
        url = input("url", "Gateway API URL", "url", &view.url),
        api_key = input("apiKey", "API key", "text", &view.api_key),
    );
    layout("Query mandate", &body)
}

pub fn create_key(key: &str) -> String {
    let body = format!(
        r#"        <h1>New AES-256 key</h1>
        <p>Share this key with the gateway out of band. Reload for another.</p>
        <pre id="key">{}</pre>"#,
        escape(key)
    );
    layout("Create key", &body)
}

/// Auto-submitting hand-off to the hosted gateway page.
pub fn redirect_to_gateway(gateway_url: &str, enc_data: &str, client_id: &str) -> String {
    let body = format!(
        r#"        <h1>Redirecting to gateway&hellip;</h1>
        <form id="gateway" method="post" action="{url}">
            <input type="hidden" name="encData" value="{enc_data}">
            <input type="hidden" name="clientId" value="{client_id}">
            <noscript><button type="submit">Continue to gateway</button></noscript>
        </form>
        <script>document.getElementById('gateway').submit();</script>"#,
        url = escape(gateway_url),
        enc_data = escape(enc_data),
        client_id = escape(client_id),
    );
    layout("Redirecting", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"        <h1>{status}</h1>
        <p class="error">{message}</p>
        <p><a href="javascript:history.back()">Go back</a></p>"#,
        status = escape(&status.to_string()),
        message = escape(message),
    );
    layout("Error", &body)
}
