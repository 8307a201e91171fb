// SPDX-FileCopyrightText: 2026 ReviewPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ReviewPulse - review analysis gateway.
//!
//! This is the binary entry point for the gateway process.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reviewpulse_config::{ConfigError, ReviewPulseConfig};

/// ReviewPulse - AI summaries of e-commerce product reviews.
#[derive(Parser, Debug)]
#[command(name = "reviewpulse", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Start the gateway (default).
    Serve,
    /// Print the effective configuration with credentials redacted.
    Config,
}

fn load(path: Option<&std::path::Path>) -> Result<ReviewPulseConfig, Vec<ConfigError>> {
    match path {
        Some(path) => reviewpulse_config::load_and_validate_path(path),
        None => reviewpulse_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            reviewpulse_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Commands::Config => match config.to_redacted_toml() {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => {
                eprintln!("error: failed to render configuration: {e}");
                std::process::exit(1);
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::parse_from(["reviewpulse"]);
        assert!(cli.command.is_none());
        assert!(cli.config.is_none());

        let cli = Cli::parse_from(["reviewpulse", "--config", "/tmp/rp.toml", "config"]);
        assert_eq!(cli.command, Some(Commands::Config));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/rp.toml")));
    }

    #[test]
    fn binary_loads_config_defaults() {
        figment::Jail::expect_with(|_jail| {
            let config = load(None).expect("default config should be valid");
            assert_eq!(config.server.port, 8080);
            Ok(())
        });
    }

    #[test]
    fn explicit_config_path_is_used() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("custom.toml", "[server]\nport = 9191\n")?;
            let config = load(Some(std::path::Path::new("custom.toml")))
                .expect("custom config should be valid");
            assert_eq!(config.server.port, 9191);
            Ok(())
        });
    }
}
