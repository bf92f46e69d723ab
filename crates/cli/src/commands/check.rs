//! `docchat check` — Measure a document against the token budget.

use docchat_core::oracle::TokenOracle;
use docchat_providers::EstimatingOracle;
use docchat_session::extract_text;
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(file: PathBuf, estimate: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let oracle: Arc<dyn TokenOracle> = if estimate {
        Arc::new(EstimatingOracle::new()) as Arc<dyn TokenOracle>
    } else {
        docchat_providers::build_from_config(&config)?
    };

    let extracted = extract_text(&file)?;
    let tokens = oracle.count(&extracted.text).await?;
    let ceiling = super::budget_from(&config).ceiling();

    println!("  Document:  {}", extracted.name);
    println!("  Counter:   {}", oracle.name());
    println!("  Size:      {}", super::usage_line(tokens, ceiling));

    if tokens > ceiling {
        println!();
        println!(
            "  ❌ Over budget by {} tokens — this document cannot be loaded.",
            tokens - ceiling
        );
        return Err(format!("{} exceeds the token budget", extracted.name).into());
    }

    println!(
        "  ✅ Fits, leaving {} tokens for the system prompt, history and questions.",
        ceiling - tokens
    );
    Ok(())
}
