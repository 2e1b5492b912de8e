//! External HTTP tool dispatch.
//!
//! Tenants register tool descriptors whose url, header values, and body are
//! templates: `{{field}}` placeholders are substituted with the model's
//! call arguments before the request goes out. Every outcome, including
//! failure, becomes a JSON envelope fed back to the model.

use frontdesk_core::model::ExternalToolDescriptor;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Dispatches tenant-configured external HTTP tools.
pub struct ExtToolClient {
    client: reqwest::Client,
}

impl Default for ExtToolClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtToolClient {
    pub fn new() -> Self {
        // Per-call timeouts are set on each request
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Execute one external tool call and wrap the outcome.
    ///
    /// Success: `{"ok": true, "status": N, "body": ...}` with the body
    /// parsed as JSON when possible, raw text otherwise.
    /// Failure: `{"ok": false, "error": "..."}`. Never an `Err` — the model
    /// sees the envelope and decides how to proceed.
    pub async fn dispatch(&self, descriptor: &ExternalToolDescriptor, args: &Value) -> Value {
        if descriptor.url.is_empty() {
            return json!({"ok": false, "error": "url required"});
        }

        let method_str = descriptor.method.to_uppercase();
        let method = match reqwest::Method::from_bytes(method_str.as_bytes()) {
            Ok(m) => m,
            Err(_) => {
                return json!({"ok": false, "error": format!("invalid method: {method_str}")})
            }
        };

        let url = render(&descriptor.url, args);
        let timeout = Duration::from_secs(descriptor.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS));

        let mut headers: Vec<(String, String)> = descriptor
            .headers
            .iter()
            .map(|(k, v)| (k.clone(), render(v, args)))
            .collect();

        let mut builder = self.client.request(method.clone(), &url).timeout(timeout);

        // Body only for non-GET methods; JSON-looking bodies get a
        // Content-Type unless the descriptor already set one
        if let Some(body_tpl) = &descriptor.body {
            if method != reqwest::Method::GET {
                let body = render(body_tpl, args);
                if serde_json::from_str::<Value>(&body).is_ok()
                    && !headers
                        .iter()
                        .any(|(k, _)| k.eq_ignore_ascii_case("content-type"))
                {
                    headers.push(("Content-Type".into(), "application/json".into()));
                }
                builder = builder.body(body);
            }
        }

        for (k, v) in &headers {
            builder = builder.header(k.as_str(), v.as_str());
        }

        debug!(tool = %descriptor.name, method = %method_str, url = %url, "Dispatching external tool");

        let response = match builder.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(tool = %descriptor.name, error = %e, "External tool request failed");
                return json!({"ok": false, "error": e.to_string()});
            }
        };

        let status = response.status().as_u16();
        let text = match response.text().await {
            Ok(t) => t,
            Err(e) => return json!({"ok": false, "error": e.to_string()}),
        };

        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));
        json!({"ok": true, "status": status, "body": body})
    }
}

/// Substitute `{{field}}` placeholders with call arguments.
///
/// String arguments are inserted raw; everything else uses its JSON form.
/// Unknown placeholders are left untouched.
pub fn render(template: &str, args: &Value) -> String {
    let mut out = template.to_string();
    if let Some(obj) = args.as_object() {
        for (key, value) in obj {
            let needle = format!("{{{{{key}}}}}");
            let replacement = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            out = out.replace(&needle, &replacement);
        }
    }
    out
}
