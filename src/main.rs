//! hookline - host for prioritized hooks and runtime-discovered plugins.
//!
//! Usage:
//!   hookline hooks                          List installed hooks
//!   hookline plugins                        List loaded plugins
//!   hookline invoke HOOK [--payload JSON]   Invoke a hook and print the result
//!   hookline --help                         Show help

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use hookline_core::Payload;
use hookline_plugin::{PluginConfig, Registry, ScriptSource};

#[derive(Parser)]
#[command(
    name = "hookline",
    version,
    about = "Prioritized hook registry with runtime plugin discovery",
    long_about = "hookline loads script plugins from a plugin directory, lets them \
                  install and subscribe to hooks, and invokes hooks on demand.\n\n\
                  Set RUST_LOG to control log output (default: hookline=info)."
)]
struct Cli {
    /// Plugin directory (overrides the configuration file)
    #[arg(long, global = true)]
    plugin_dir: Option<PathBuf>,

    /// Plugin configuration file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (takes precedence over RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List installed hooks with their payload documentation
    Hooks,

    /// List loaded plugins in load order
    Plugins,

    /// Invoke a hook and print the resulting payload
    Invoke {
        /// Hook name
        hook: String,

        /// Payload as a JSON array, e.g. '[1, "text", null, [true]]'
        #[arg(short, long, default_value = "[]")]
        payload: String,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = build_registry(cli.config.as_ref(), cli.plugin_dir)?;

    match cli.command {
        Command::Hooks => print_hooks(&registry),
        Command::Plugins => print_plugins(&registry),
        Command::Invoke { hook, payload } => {
            let payload: serde_json::Value =
                serde_json::from_str(&payload).context("Payload is not valid JSON")?;
            let out = registry
                .invoke_hook_json(&hook, &payload)
                .context("Payload must be a JSON array of scalars and arrays")?;
            print_payload(&out);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose, env.as_deref()))
        .with_writer(std::io::stderr)
        .init();
}

/// `--verbose` wins over RUST_LOG; otherwise RUST_LOG wins over the default.
fn log_filter(verbose: bool, env: Option<&str>) -> EnvFilter {
    if verbose {
        return EnvFilter::new("hookline=debug,plugin=debug");
    }
    env.and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("hookline=info,plugin=info"))
}

/// Create the registry, attach the script source and run the first scan.
fn build_registry(config_path: Option<&PathBuf>, plugin_dir: Option<PathBuf>) -> Result<Registry> {
    let mut config = match config_path {
        Some(path) => PluginConfig::load(path)
            .wrap_err_with(|| format!("Failed to load config {}", path.display()))?,
        None => PluginConfig::default(),
    };
    if let Some(dir) = plugin_dir {
        config = config.with_plugin_dir(dir);
    }

    tracing::debug!(plugin_dir = %config.plugin_dir.display(), "Scanning for plugins");

    let registry = Registry::default();
    registry.add_source(ScriptSource::new(config));
    let loaded = registry.scan_for_plugins();
    tracing::debug!(count = loaded.len(), "Initial scan complete");

    Ok(registry)
}

fn print_hooks(registry: &Registry) {
    for (i, hook) in registry.list_hooks().iter().enumerate() {
        if i > 0 {
            println!();
        }
        let mode = if hook.always_invoke { "broadcast" } else { "chained" };
        println!("[{mode}] {}", hook.full_description());

        let subscribers = registry.subscriptions(&hook.name);
        for subscription in &subscribers {
            println!("   <- {} (priority {})", subscription.handler.name(), subscription.priority);
        }
    }
}

fn print_plugins(registry: &Registry) {
    let plugins = registry.loaded_plugins();
    if plugins.is_empty() {
        println!("No plugins loaded");
        return;
    }

    for entry in plugins {
        println!(
            "{:<24} {:<24} loaded {}",
            entry.id.as_str(),
            entry.instance().name(),
            entry.loaded_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }
}

fn print_payload(payload: &Payload) {
    if payload.is_empty() {
        println!("(empty payload)");
        return;
    }

    for (slot, value) in payload.iter().enumerate() {
        println!("[{slot}] {}", value.debug_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbose_overrides_rust_log() {
        let filter = log_filter(true, Some("warn")).to_string();
        assert!(filter.contains("hookline=debug"));
        assert!(!filter.contains("warn"));
    }

    #[test]
    fn test_rust_log_overrides_default() {
        assert_eq!(log_filter(false, Some("warn")).to_string(), "warn");
        assert!(log_filter(false, None).to_string().contains("hookline=info"));
    }
}
