use anyhow::Context;
use atm_finder::adapters::load_catalog;
use atm_finder::config::{CliArgs, LogFormat};
use atm_finder::core::distance::DistanceUnit;
use atm_finder::core::ranker::rank_nearest;
use atm_finder::utils::error::ErrorSeverity;
use atm_finder::utils::{logger, validation::Validate};
use atm_finder::{find_atms, FinderError, PipelineState, SessionState, TomlConfig};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    match args.log_format {
        LogFormat::Compact => logger::init_cli_logger(args.verbose, config.log_level()),
        LogFormat::Json => logger::init_json_logger(args.verbose, config.log_level()),
    }

    tracing::info!("🚀 Starting atm-finder");
    tracing::info!("📁 Configuration loaded from: {}", args.config);

    if let Some(size) = args.shortlist_size {
        config.set_shortlist_size(size);
        tracing::info!("🔧 Shortlist size overridden to: {}", size);
    }

    // 驗證配置
    if let Err(e) = args.validate().and_then(|_| config.validate()) {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let location = args.location()?;

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - ranking only, no remote calls");
        return dry_run(&config, location).await;
    }

    match find_atms(&config, location).await {
        Ok(session) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&session)?);
            } else {
                print_session(&session);
            }
            if let PipelineState::Error(kind) = session.state {
                eprintln!("❌ Pipeline stopped: {:?}", kind);
                eprintln!("💡 Pass --lat/--lon or configure a default [location]");
                std::process::exit(2);
            }
            Ok(())
        }
        Err(e) => exit_with(e),
    }
}

async fn dry_run(config: &TomlConfig, location: Option<atm_finder::GeoPoint>) -> anyhow::Result<()> {
    let location = location
        .or_else(|| config.default_location())
        .context("dry run needs --lat/--lon or a [location] default")?;

    let catalog = load_catalog(&config.catalog.path)
        .await
        .with_context(|| format!("loading catalog {}", config.catalog.path))?;
    let shortlist = rank_nearest(location, catalog.records(), config.shortlist_size())?;

    println!("Nearest ATMs to {}:", location);
    for (rank, ranked) in shortlist.iter().enumerate() {
        let name = catalog
            .get(&ranked.atm_id)
            .map(|atm| atm.name.as_str())
            .unwrap_or("?");
        println!(
            "  {}. {} ({}) - {}",
            rank + 1,
            name,
            ranked.atm_id,
            DistanceUnit::for_display(ranked.distance_meters).format(ranked.distance_meters)
        );
    }
    Ok(())
}

fn print_session(session: &SessionState) {
    if let Some(location) = session.location {
        println!("📍 Your location: {}", location);
    }
    println!("State: {:?}", session.state);

    println!("\nNearest ATMs ({}):", session.shortlist.len());
    for (rank, ranked) in session.shortlist.iter().enumerate() {
        println!(
            "  {}. {} - {}",
            rank + 1,
            ranked.atm_id,
            DistanceUnit::for_display(ranked.distance_meters).format(ranked.distance_meters)
        );
    }

    if session.recommendations.is_empty() {
        println!("\nNo recommendations available.");
    } else {
        println!("\nRecommended ({}):", session.recommendations.len());
        for recommendation in &session.recommendations {
            let distance = recommendation
                .distance_meters
                .map(|d| DistanceUnit::for_display(d).format(d))
                .unwrap_or_else(|| "-".to_string());
            let rating = recommendation
                .rating
                .map(|r| format!("{:.1}", r))
                .unwrap_or_else(|| "-".to_string());
            let currency = match recommendation.currency_available {
                Some(true) => "yes",
                Some(false) => "no",
                None => "-",
            };
            println!(
                "  ⭐ {} ({}) - {} | {} | rating {} | currency {}",
                recommendation.atm.name,
                recommendation.atm.atm_id,
                recommendation.atm.address,
                distance,
                rating,
                currency
            );
        }
    }

    if let Some(top) = session.top_recommendation() {
        println!("\n👉 Best pick: {} ({})", top.atm.name, top.atm.atm_id);
    }

    match (&session.route, &session.route_destination) {
        (Some(route), Some(destination)) => {
            let distance = route
                .distance_meters
                .map(|d| DistanceUnit::Kilometers.format(d))
                .unwrap_or_else(|| "unknown distance".to_string());
            let minutes = route
                .duration_seconds
                .map(|s| format!("{:.0} min", s / 60.0))
                .unwrap_or_else(|| "unknown duration".to_string());
            println!(
                "\n🗺️ Route to {}: {} points, {}, {}",
                destination,
                route.points.len(),
                distance,
                minutes
            );
        }
        _ => println!("\nNo route available."),
    }
}

fn exit_with(e: FinderError) -> ! {
    tracing::error!(
        "❌ Pipeline failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
