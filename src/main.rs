use plex_stats::utils::{logger, validation::Validate};
use plex_stats::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 初始化日誌
    if std::env::var("PLEX_STATS_LOG_FORMAT").is_ok_and(|format| format == "json") {
        logger::init_json_logger();
    } else {
        logger::init_logger();
    }

    let config = match AppConfig::load().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            println!("{} {}", e.tag(), e);
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    if let Err(e) = plex_stats::run(&config).await {
        tracing::error!("Stats update failed: {}", e);
        println!("{} {}", e.tag(), e);
        eprintln!("Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }
}
