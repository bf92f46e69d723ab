//! `docchat doctor` — Diagnose setup and connectivity.

use docchat_config::AppConfig;
use docchat_session::PromptLibrary;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 DocChat Doctor — System Diagnostics");
    println!("======================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if !config_path.exists() {
        println!("  ⚠️  No config file — using defaults (run `docchat onboard`)");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Config invalid: {e}");
            println!("\n  ⚠️  1 blocking issue found.");
            return Ok(());
        }
    };

    if config.provider == "gemini" {
        if config.has_api_key() {
            println!("  ✅ API key configured");
        } else {
            println!("  ❌ No API key — set GOOGLE_API_KEY or api_key in config.toml");
            issues += 1;
        }
    }

    match PromptLibrary::open(config.prompts_path()) {
        Ok(library) => println!("  ✅ Prompt library: {} prompts", library.list().len()),
        Err(e) => {
            println!("  ❌ Prompt library: {e}");
            issues += 1;
        }
    }

    match docchat_providers::build_from_config(&config) {
        Ok(oracle) => match oracle.health_check().await {
            Ok(true) => println!("  ✅ {} reachable (model {})", oracle.name(), config.model),
            Ok(false) => {
                println!("  ❌ {} rejected the health check", oracle.name());
                issues += 1;
            }
            Err(e) => {
                println!("  ❌ {} unreachable: {e}", oracle.name());
                issues += 1;
            }
        },
        Err(e) => {
            println!("  ❌ Model client: {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
