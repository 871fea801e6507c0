//! `wrapwright library` — Show the wrap library index.

use wrapwright_config::AppConfig;
use wrapwright_core::{Error, Result};
use wrapwright_wraps::WrapLibrary;

pub async fn run() -> Result<()> {
    let config = AppConfig::load().map_err(|e| Error::Config(e.to_string()))?;
    let library = WrapLibrary::from_config(&config.library);

    println!("> Fetching wrap library index @ {}\n", library.location());
    let index = library.load_index().await?;

    if index.is_empty() {
        println!("  The library has no wraps.");
        return Ok(());
    }

    println!("  {:<24} Description", "Name");
    println!("  {:<24} -----------", "----");
    for wrap in index.values() {
        println!("  {:<24} {}", wrap.name, wrap.description);
    }
    println!("\n  {} wraps", index.len());

    Ok(())
}
