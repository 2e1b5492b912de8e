//! API credential resolution.
//!
//! The key is looked up in the environment first, then in an optional JSON
//! secrets file named by `FRONTDESK_SECRETS_FILE`. Whatever is found is
//! cached process-wide so repeated requests never touch the filesystem
//! again.

use frontdesk_core::error::ProviderError;
use serde_json::Value;
use std::sync::OnceLock;
use tracing::warn;

/// Resolved credentials for the generation endpoint.
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub project: Option<String>,
    pub organization: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"***")
            .field("project", &self.project)
            .field("organization", &self.organization)
            .finish()
    }
}

static CACHE: OnceLock<Option<Credentials>> = OnceLock::new();

/// Resolve credentials, caching the result for the process lifetime.
///
/// Lookup order per field: environment variable, then the secrets file.
/// Fails with [`ProviderError::NotConfigured`] when no API key is found
/// anywhere.
pub fn load() -> Result<&'static Credentials, ProviderError> {
    CACHE
        .get_or_init(resolve)
        .as_ref()
        .ok_or_else(|| ProviderError::NotConfigured("no API key in env or secrets file".into()))
}

fn resolve() -> Option<Credentials> {
    let secrets = read_secrets_file();

    let api_key = env_or_secret(&secrets, "OPENAI_API_KEY", &["api_key", "openai_api_key"])?;
    let project = env_or_secret(&secrets, "OPENAI_PROJECT", &["project", "openai_project"]);
    let organization = std::env::var("OPENAI_ORG")
        .or_else(|_| std::env::var("OPENAI_ORGANIZATION"))
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| secret_value(&secrets, &["organization", "org", "openai_org"]));

    Some(Credentials {
        api_key,
        project,
        organization,
    })
}

fn env_or_secret(secrets: &Option<Value>, env_key: &str, aliases: &[&str]) -> Option<String> {
    std::env::var(env_key)
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| {
            let mut keys = vec![env_key];
            keys.extend_from_slice(aliases);
            secret_value(secrets, &keys)
        })
}

fn secret_value(secrets: &Option<Value>, keys: &[&str]) -> Option<String> {
    let obj = secrets.as_ref()?.as_object()?;
    for key in keys {
        // Secrets files in the wild mix upper and lower case
        let hit = obj
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .and_then(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty());
        if let Some(v) = hit {
            return Some(v.to_string());
        }
    }
    None
}

fn read_secrets_file() -> Option<Value> {
    let path = std::env::var("FRONTDESK_SECRETS_FILE").ok()?;
    let raw = match std::fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path, error = %e, "Failed to read secrets file");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(path = %path, error = %e, "Secrets file is not valid JSON");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn secret_lookup_is_case_insensitive() {
        let secrets = Some(json!({"OpenAI_API_Key": "sk-file"}));
        assert_eq!(
            secret_value(&secrets, &["openai_api_key"]).as_deref(),
            Some("sk-file")
        );
    }

    #[test]
    fn secret_lookup_tries_aliases_in_order() {
        let secrets = Some(json!({"api_key": "sk-short", "OPENAI_API_KEY": "sk-long"}));
        assert_eq!(
            secret_value(&secrets, &["OPENAI_API_KEY", "api_key"]).as_deref(),
            Some("sk-long")
        );
    }

    #[test]
    fn empty_secret_values_are_skipped() {
        let secrets = Some(json!({"api_key": ""}));
        assert!(secret_value(&secrets, &["api_key"]).is_none());
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let creds = Credentials {
            api_key: "sk-very-secret".into(),
            project: Some("proj_1".into()),
            organization: None,
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn missing_secrets_object_yields_none() {
        assert!(secret_value(&None, &["api_key"]).is_none());
        let non_object = Some(json!(["not", "an", "object"]));
        assert!(secret_value(&non_object, &["api_key"]).is_none());
    }
}
