//! `gstmate doctor` — Diagnose configuration and provider health.

use gstmate_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("GSTMate Doctor");
    println!();

    let config_path = AppConfig::config_dir().join("config.toml");
    println!(
        "  Config file:     {} ({})",
        config_path.display(),
        if config_path.exists() { "found" } else { "not found, using defaults" }
    );

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  Config:          OK");
            config
        }
        Err(e) => {
            println!("  Config:          INVALID — {e}");
            return Err(e.into());
        }
    };

    println!("  Provider:        {}", config.default_provider);
    println!("  Model:           {}", config.default_model);
    println!(
        "  API key:         {}",
        if config.has_api_key() { "configured" } else { "MISSING" }
    );

    if !config.has_api_key() {
        println!();
        println!("  Set GROQ_API_KEY (or GSTMATE_API_KEY) and re-run.");
        return Ok(());
    }

    let router = gstmate_providers::router::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;

    print!("  Provider health: ");
    match provider.health_check().await {
        Ok(true) => println!("reachable"),
        Ok(false) => println!("UNREACHABLE (endpoint responded with an error)"),
        Err(e) => println!("UNREACHABLE — {e}"),
    }

    Ok(())
}
