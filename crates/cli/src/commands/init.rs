//! `frontdesk init` — write a default config file.

use frontdesk_config::AppConfig;
use std::path::Path;

pub fn run(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    if Path::new(path).exists() {
        return Err(format!("{path} already exists, refusing to overwrite").into());
    }

    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config)?;
    std::fs::write(path, content)?;

    println!("Wrote default config to {path}");
    println!("Set OPENAI_API_KEY (or FRONTDESK_SECRETS_FILE) before serving.");
    Ok(())
}
