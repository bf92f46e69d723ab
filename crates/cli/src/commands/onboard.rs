//! `docchat onboard` — First-time setup.

use docchat_config::AppConfig;
use docchat_session::PromptLibrary;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    println!("📄 DocChat — First-Time Setup");
    println!("=============================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config.toml at: {}", config_path.display());
    }

    let config = AppConfig::load_from(&config_path)?;
    let library = PromptLibrary::open(config.prompts_path())?;
    println!(
        "✅ Prompt library ready: {} ({} prompts)",
        library.path().display(),
        library.list().len()
    );

    println!("\n📝 Next steps:");
    println!("   1. Set GOOGLE_API_KEY (or api_key in {})", config_path.display());
    println!("   2. Run: docchat check <FILE>");
    println!("   3. Run: docchat chat <FILE>\n");

    Ok(())
}
