//! `docchat config` — Configuration management commands.

use docchat_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   ✅ Config parsed successfully");

            let mut warnings = Vec::new();

            if config.provider == "gemini" && !config.has_api_key() {
                warnings.push("No API key set (set GOOGLE_API_KEY or api_key in config.toml)");
            }

            if config.provider == "estimate" {
                warnings.push("Provider 'estimate' can count tokens but cannot answer questions");
            }

            if config.history.max_turns == Some(0) {
                warnings.push("history.max_turns = 0 sends no prior turns at all");
            }

            if warnings.is_empty() {
                println!("   ✅ All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   ⚠️  {w}");
                }
            }

            println!();
            println!("   Provider:  {}", config.provider);
            println!("   Model:     {}", config.model);
            println!(
                "   Budget:    {} tokens ({} reserved)",
                config.budget.max_tokens, config.budget.reserved_headroom
            );
            println!(
                "   History:   {}",
                config
                    .history
                    .max_turns
                    .map_or_else(|| "all turns".to_string(), |n| format!("last {n} turns"))
            );
            println!("   Prompts:   {}", config.prompts_path().display());
        }
        Err(e) => {
            println!("   ❌ Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    println!("{}", redacted_toml(&config)?);
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

fn redacted_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut shown = config.clone();
    if shown.api_key.is_some() {
        shown.api_key = Some("[REDACTED]".into());
    }
    toml::to_string_pretty(&shown)
}
