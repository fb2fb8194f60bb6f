// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! NDN <-> gRPC bridge CLI
//!
//! # Usage
//!
//! ```bash
//! # Bridge node (NDN producer + gRPC server)
//! ndn-grpc-bridge --config config.yaml server
//!
//! # gRPC client sending grpc.client.test_data
//! ndn-grpc-bridge --config config.yaml client --host 10.0.0.5:50051
//!
//! # Mode from the environment
//! MODE=client ndn-grpc-bridge
//!
//! # Generate / check a configuration file
//! ndn-grpc-bridge gen-config --output config.yaml
//! ndn-grpc-bridge validate --config config.yaml
//! ```

use clap::{CommandFactory, Parser, Subcommand};
use ndn_grpc_bridge::config::RouteModeConfig;
use ndn_grpc_bridge::rpc::GrpcClient;
use ndn_grpc_bridge::{BridgeConfig, BridgeContext, BridgeStats, ConfigOverrides, Mode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// NDN <-> gRPC bridge
#[derive(Parser, Debug)]
#[command(name = "ndn-grpc-bridge")]
#[command(about = "Bridge between NDN Interest/Data exchanges and gRPC unary calls")]
#[command(version)]
struct Args {
    /// Configuration file path (YAML or TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// gRPC server port
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// gRPC server address for client mode (host:port)
    #[arg(long, global = true)]
    host: Option<String>,

    /// Statistics reporting interval (seconds, 0 to disable)
    #[arg(long)]
    stats_interval: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a bridge node
    Server,

    /// Send the configured test data to a bridge node
    Client,

    /// Generate example configuration file
    GenConfig {
        /// Output file path (.yaml or .toml)
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },

    /// Validate a configuration file
    Validate,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Some(Commands::GenConfig { ref output }) => return cmd_gen_config(output),
        Some(Commands::Validate) => return cmd_validate(args.config.as_deref()),
        _ => {}
    }

    let config = build_config(&args)?;
    let Some(mode) = config.mode else {
        eprintln!("No mode given: use a subcommand, MODE or `mode` in the config file\n");
        Args::command().print_help()?;
        std::process::exit(1);
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config.logging.level))
        .with_target(false)
        .init();

    match mode {
        Mode::Server => run_server(config).await,
        Mode::Client => run_client(config).await,
    }
}

/// Filter for the resolved `logging.level` (flag > env > file > default).
fn log_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn build_config(args: &Args) -> Result<BridgeConfig, Box<dyn std::error::Error>> {
    let mut config = BridgeConfig::load(args.config.as_deref())?;

    let mode = match args.command {
        Some(Commands::Server) => Some(Mode::Server),
        Some(Commands::Client) => Some(Mode::Client),
        _ => None,
    };
    config.apply_overrides(&ConfigOverrides {
        mode,
        log_level: args.log_level.clone(),
        grpc_port: args.port,
        grpc_host: args.host.clone(),
    });
    if let Some(interval) = args.stats_interval {
        config.stats_interval_secs = interval;
    }

    config.validate()?;
    Ok(config)
}

async fn run_server(config: BridgeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let stats_interval = config.stats_interval_secs;
    let bridge = Arc::new(BridgeContext::start(config).await?);

    println!("NDN-gRPC Bridge v{}", env!("CARGO_PKG_VERSION"));
    println!("=====================================");
    println!();
    for route in bridge.router().routes() {
        println!(
            "Route: {} ({:?}, freshness {:?})",
            route.prefix, route.mode, route.freshness_period
        );
    }
    match bridge.config().client.interests.first() {
        Some(prefix) => println!("gRPC -> NDN prefix: {}", prefix),
        None => println!("gRPC -> NDN prefix: (none configured)"),
    }
    println!("gRPC port: {}", bridge.config().grpc.server.port);
    println!();
    println!("Press Ctrl+C to stop...");
    println!();

    let stats_task = (stats_interval > 0).then(|| {
        let bridge = bridge.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(stats_interval));
            interval.tick().await;
            loop {
                interval.tick().await;
                print_stats(&bridge.stats());
            }
        })
    });

    bridge
        .serve_grpc(async {
            let _ = tokio::signal::ctrl_c().await;
            println!("\nShutting down...");
        })
        .await?;

    if let Some(task) = stats_task {
        task.abort();
    }
    bridge.shutdown();

    println!("\nFinal Statistics:");
    print_stats(&bridge.stats());
    Ok(())
}

async fn run_client(config: BridgeConfig) -> Result<(), Box<dyn std::error::Error>> {
    let grpc = &config.grpc.client;
    let client = GrpcClient::new(&grpc.host, grpc.timeout())?;
    tracing::info!("Connecting to gRPC server at {}", client.target());

    let mut failures = 0usize;
    for (value, payload) in &grpc.test_data {
        tracing::info!("Sending request: value={}, payload={}", value, payload);
        match client.call(*value, payload, grpc.timeout()).await {
            Ok(response) => println!(
                "Response: value={}, payload={}",
                response.numeric, response.text
            ),
            Err(e) => {
                failures += 1;
                tracing::error!("Request failed: {}", e);
            }
        }
    }

    println!(
        "{} request(s) sent, {} failed",
        grpc.test_data.len(),
        failures
    );
    Ok(())
}

fn cmd_gen_config(output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = BridgeConfig::example();

    let is_toml = output.extension().is_some_and(|ext| ext == "toml");
    let body = if is_toml {
        toml::to_string_pretty(&config)?
    } else {
        serde_yaml::to_string(&config)?
    };

    let content = format!(
        "# NDN-gRPC Bridge Configuration\n# Generated by ndn-grpc-bridge gen-config\n\n{}",
        body
    );

    std::fs::write(output, content)?;
    println!("Generated configuration file: {}", output.display());
    Ok(())
}

fn cmd_validate(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let Some(path) = path else {
        eprintln!("Missing --config <file>");
        std::process::exit(2);
    };

    let config = match BridgeConfig::from_file(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration invalid: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("Configuration invalid: {}", e);
        std::process::exit(1);
    }

    println!("Configuration valid!");
    println!();
    println!("Routes: {}", config.server.routes.len());
    for (i, spec) in config.server.routes.iter().enumerate() {
        let route = spec.to_config();
        let detail = match route.mode {
            RouteModeConfig::Static => "static".to_string(),
            RouteModeConfig::Custom => {
                format!("handler {}", route.handler.as_deref().unwrap_or("?"))
            }
            RouteModeConfig::Forward => format!("forward to {}", config.grpc.client.host),
        };
        println!("  [{}] {} ({})", i, route.prefix, detail);
    }
    println!("Data items: {}", config.server.data.len());
    println!("Interests: {}", config.client.interests.join(", "));
    println!("gRPC port: {}", config.grpc.server.port);
    Ok(())
}

fn print_stats(stats: &BridgeStats) {
    println!("--- Bridge Statistics ---");
    let f = &stats.forwarder;
    println!(
        "  Forwarder: {} interests, {} satisfied, {} cache hits, {} nacks, {} timeouts, {} pending",
        f.interests, f.satisfied, f.cache_hits, f.nacks, f.timeouts, f.pending
    );
    let n = &stats.ndn_calls;
    println!(
        "  gRPC -> NDN: {} calls, {} ok, {} nacked, {} timed out, {} failed, {} in flight",
        n.submitted, n.fulfilled, n.nacked, n.timed_out, n.failed, n.in_flight
    );
    if let Some(ref r) = stats.rpc_calls {
        println!(
            "  NDN -> gRPC: {} calls, {} ok, {} timed out, {} failed, {} in flight",
            r.submitted, r.fulfilled, r.timed_out, r.failed, r.in_flight
        );
    }
    for route in &stats.routes {
        println!(
            "  {}: {} interests ({:.1}/s), {}, {} not found, {} forwarded, {} errors",
            route.prefix,
            route.interests_served,
            route.interests_per_second(),
            format_bytes(route.bytes_served),
            route.not_found,
            route.forwarded,
            route.errors
        );
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_ignores_rust_log() {
        std::env::set_var("RUST_LOG", "trace");
        assert_eq!(log_filter("warn").to_string(), "warn");
        assert_eq!(log_filter("debug").to_string(), "debug");
    }

    #[test]
    fn test_log_level_flag_overrides_config() {
        let args = Args::try_parse_from(["ndn-grpc-bridge", "--log-level", "error", "server"])
            .expect("args");
        let mut config = BridgeConfig::default();
        config.logging.level = "debug".into();
        config.apply_overrides(&ConfigOverrides {
            mode: Some(Mode::Server),
            log_level: args.log_level.clone(),
            grpc_port: None,
            grpc_host: None,
        });
        assert_eq!(config.logging.level, "error");
        assert_eq!(log_filter(&config.logging.level).to_string(), "error");
    }
}
