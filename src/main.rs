pub mod auth;
pub mod config;
pub mod correlate;
pub mod events;
pub mod orchestrator;
pub mod resolver;
pub mod types;

use std::sync::Arc;

use auth::TokenCache;
use config::Config;
use orchestrator::Orchestrator;
use types::Platform;

#[tokio::main]
pub async fn main() {
    dotenv::dotenv().ok();

    let config = Config::from_env();

    // Write logs to stderr so result output on stdout stays clean
    let mut builder = if config.rust_log.is_some() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
    };
    builder.target(env_logger::Target::Stderr).init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let json_output = args.iter().any(|a| a == "--json");
    args.retain(|a| a != "--json");

    let player = match args.first() {
        Some(p) => p.clone(),
        None => {
            eprintln!("usage: vodsync <player> [pc|psn|xbl] [--json]");
            std::process::exit(2);
        }
    };
    let platform = args
        .get(1)
        .map(String::as_str)
        .and_then(Platform::parse)
        .unwrap_or(Platform::Pc);

    log::info!("Starting vodsync query");
    log::info!("   Player: {} ({:?})", player, platform);
    if !config.has_archive_credentials() {
        log::warn!("No archive credentials configured; VOD matches will be synthetic");
    }

    let tokens = Arc::new(TokenCache::new(&config));
    let orchestrator = Orchestrator::new(&config, tokens);

    let report = orchestrator.query_report(&player, platform).await;

    if json_output {
        match serde_json::to_string_pretty(&report.results) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                log::error!("Failed to serialize results: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    println!(
        "Scanned {} kill(s), {} correlated to streamer archives",
        report.scanned_count,
        report.results.len()
    );
    for result in &report.results {
        println!(
            "  [{}] killed {} ({}) in match {} at {} -> {} ({:?})",
            result.archive_match.title(),
            result.kill_event.victim_name,
            result.kill_event.weapon,
            result.kill_event.match_id,
            result.kill_event.occurred_at.format("%Y-%m-%d %H:%M:%S"),
            result.watch_url(),
            result.tier
        );
    }
}
