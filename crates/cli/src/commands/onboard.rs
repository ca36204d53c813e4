//! `wayfinder onboard` — First-time setup wizard.

use wayfinder_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");
    let sessions_dir = config_dir.join("sessions");

    println!("🧭 Wayfinder — First-Time Setup");
    println!("===============================\n");

    // Create directories
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if !sessions_dir.exists() {
        std::fs::create_dir_all(&sessions_dir)?;
        println!("✅ Created session directory: {}", sessions_dir.display());
    }

    // Create config file
    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    } else {
        let default_toml = AppConfig::default_toml();
        std::fs::write(&config_path, &default_toml)?;
        println!("✅ Created config.toml at: {}", config_path.display());
        println!("\n📝 Next steps:");
        println!("   1. Set WAYFINDER_API_KEY (or GOOGLE_AI_API_KEY) for the model");
        println!("   2. Optionally set WEATHER_API_KEY and GEOAPIFY_API_KEY for live data");
        println!("   3. Run: wayfinder chat\n");
    }

    println!("🎉 Setup complete! Run `wayfinder chat` to start planning.\n");

    Ok(())
}
