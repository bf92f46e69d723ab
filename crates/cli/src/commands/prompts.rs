//! `docchat prompts` — Manage the system prompt library.

pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let library = super::open_prompts(&config)?;

    println!("📋 Prompts ({})", library.path().display());
    println!();
    for prompt in library.list() {
        let marker = if prompt.id == config.prompts.default_id {
            "*"
        } else {
            " "
        };
        println!("  {marker} {:<38} {}", prompt.id, prompt.name);
    }
    println!();
    println!("  * = used when `chat` is run without --prompt");
    Ok(())
}

pub async fn add(name: &str, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let mut library = super::open_prompts(&config)?;

    let prompt = library.add(name, text)?;
    println!("✅ Added prompt '{}' ({})", prompt.name, prompt.id);
    Ok(())
}

pub async fn delete(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let mut library = super::open_prompts(&config)?;

    let removed = library.delete(id)?;
    println!("🗑️  Deleted prompt '{}'", removed.name);
    Ok(())
}
