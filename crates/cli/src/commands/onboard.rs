//! `wrapwright onboard` — First-time setup.

use wrapwright_config::AppConfig;
use wrapwright_core::Result;

pub async fn run() -> Result<()> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("Wrapwright — First-Time Setup");
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
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set OPENAI_API_KEY (or api_key in config.toml, or a .env file)");
    println!("   2. Start a wrap runtime at the configured runtime.endpoint");
    println!("   3. Run: wrapwright run \"<your goal>\"\n");

    Ok(())
}
