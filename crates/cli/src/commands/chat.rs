//! `gstmate chat` — Single-message chat mode from the terminal.

use std::sync::Arc;

use gstmate_advisor::AdvisorEngine;
use gstmate_config::AppConfig;
use gstmate_core::message::SessionId;
use gstmate_session::SessionStore;

pub async fn run(
    message: String,
    session: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for API key early — give a clear error
    if config.api_key.is_none() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    GROQ_API_KEY=gsk_...       (recommended)");
        eprintln!("    OPENAI_API_KEY=sk-...      (for OpenAI direct)");
        eprintln!("    GSTMATE_API_KEY=...        (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        eprintln!("  Get a Groq key at: https://console.groq.com/keys");
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = gstmate_providers::router::build_from_config(&config);
    let provider = router.default().ok_or("No default provider configured")?;

    let store = Arc::new(SessionStore::new(config.session.max_history_turns));
    let engine = AdvisorEngine::new(provider, store, &config);

    let session_id = session.unwrap_or_else(|| SessionId::new().to_string());

    eprint!("  Thinking...");
    let reply = engine.chat(&session_id, &message).await?;
    eprint!("\r              \r");
    println!("{reply}");

    Ok(())
}
