//! Drive Mirror - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use drive_mirror::{
    api::{
        auth::{load_or_authorize, AuthorizationFlow, ClientSecret},
        DriveClient, FileTokenStore, RefreshingToken,
    },
    cli::Args,
    config::{validate_config, Config},
    download::mirror_drive,
    error::{exit_codes, Result},
    output::{print_banner, print_config_summary, print_error, print_info, print_summary, print_warning},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    args.merge_into_config(&mut config);
    validate_config(&config)?;

    if args.init_config {
        config.save(&config_path)?;
        print_info(&format!("Configuration written to {}", config_path.display()));
        return Ok(());
    }

    print_config_summary(
        &config.options.root_folder_id,
        &config.options.destination.display().to_string(),
        &config.options.listing_failure.to_string(),
    );

    // Authorize
    let secret = ClientSecret::load(&config.credentials.client_secret_file)?;
    let flow = AuthorizationFlow::new(&secret)?;
    let store = FileTokenStore::new(&config.credentials.token_file);
    let token = load_or_authorize(&flow, &store).await?;

    let token = Arc::new(RefreshingToken::new(flow, Box::new(store), token));
    let client = DriveClient::new(token, config.options.list_options())?;

    let stats = mirror_drive(&client, &config.options).await?;
    print_summary(&stats, &config.options.failed_downloads_file.display().to_string());

    // Per-file failures are journaled; re-running retries them.
    if stats.has_failures() {
        print_warning("Some items were not mirrored. Run again to retry them.");
    }

    Ok(())
}
