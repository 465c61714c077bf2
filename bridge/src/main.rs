//! Gatelink - Entry Point
//!
//! A small HTTP bridge that lets a home-automation controller drive CAME
//! Connect gates through the vendor cloud, hiding the OAuth exchange, host
//! fallback and token persistence behind a plain local API.

use std::collections::HashMap;
use std::env;

use gatelink::app::options::{AppOptions, Credentials, ServerOptions, StorageOptions, VendorOptions};
use gatelink::app::run::run;
use gatelink::logs::{init_logging, LogOptions};
use gatelink::storage::layout::StorageLayout;
use gatelink::storage::settings::Settings;
use gatelink::utils::version_info;

use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();

    for arg in args.iter().skip(1) {
        if let Some((key, value)) = arg.split_once('=') {
            // Handle --key=value format
            let clean_key = key.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), value.to_string());
        } else if arg.starts_with("--") {
            // Handle standalone flags like --version
            let clean_key = arg.trim_start_matches('-');
            cli_args.insert(clean_key.to_string(), "true".to_string());
        }
    }

    // Print version and exit
    let version = version_info();
    if cli_args.contains_key("version") {
        println!("{}", serde_json::to_string_pretty(&version).unwrap());
        return;
    }

    // Storage layout, overridable for development
    let layout = match cli_args.get("data-dir") {
        Some(dir) => StorageLayout::new(dir),
        None => StorageLayout::default(),
    };

    // Retrieve the settings file; a missing file means defaults
    let settings_file = layout.settings_file();
    let settings = if settings_file.exists().await {
        match settings_file.read_json::<Settings>().await {
            Ok(settings) => settings,
            Err(e) => {
                println!("Unable to read settings file, using defaults: {e}");
                Settings::default()
            }
        }
    } else {
        Settings::default()
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        log_dir: layout.logs_dir().path().to_path_buf(),
        file_output: settings.log_to_file,
        ..Default::default()
    };
    if let Err(e) = init_logging(log_options) {
        println!("Failed to initialize logging: {e}");
    }

    // Vendor credentials come from the environment only
    let credentials = Credentials::from_env();
    if !credentials.is_complete() {
        warn!("CAME Connect credentials incomplete; vendor requests will fail until all four environment variables are set");
    }

    // Run the bridge
    let options = AppOptions {
        server: ServerOptions {
            host: settings.server.host.clone(),
            port: settings.server.port,
        },
        storage: StorageOptions { layout },
        vendor: VendorOptions {
            api_bases: settings.vendor.api_bases.clone(),
            redirect_uri: settings.vendor.redirect_uri.clone(),
        },
        credentials,
    };

    info!("Running Gatelink with options: {:?}", options);
    let result = run(options, await_shutdown_signal()).await;
    if let Err(e) = result {
        error!("Failed to run the bridge: {e}");
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = sigint.recv() => {
                info!("SIGINT received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
        info!("Ctrl+C received, shutting down...");
    }
}
