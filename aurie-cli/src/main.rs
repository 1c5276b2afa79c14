//! Aurie CLI

mod manifest;

use anyhow::{Context, Result};
use aurie_api::ModuleEvent;
use aurie_runtime::{
    load_from_file, InterfaceInfo, ModuleInfo, ModuleManager, ObjectManagerConfig, RegistryStats,
};
use clap::{Parser, Subcommand};
use manifest::{Manifest, NamedInterface};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aurie")]
#[command(about = "Aurie module registry tools", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load, initialize and unload the modules described by a manifest
    Simulate {
        /// Path to the module manifest
        #[arg(short, long, default_value = "modules.yaml")]
        manifest: PathBuf,

        /// Path to the object manager configuration file
        #[arg(short, long, env = "AURIE_CONFIG")]
        config: Option<PathBuf>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,
    },

    /// Validate a configuration file and, optionally, a manifest
    Validate {
        /// Path to configuration file
        #[arg(short, long, default_value = "aurie.yaml")]
        config: PathBuf,

        /// Path to a module manifest
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

/// Registry contents after every module has initialized
#[derive(Debug, Serialize)]
struct Report {
    stats: RegistryStats,
    modules: Vec<ModuleInfo>,
    interfaces: Vec<InterfaceInfo>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            manifest,
            config,
            log_level,
        } => {
            init_tracing(&log_level)?;
            simulate(manifest, config)
        }

        Commands::Validate { config, manifest } => {
            tracing_subscriber::fmt().with_target(false).init();

            tracing::info!("Validating configuration: {}", config.display());

            match validate(&config, manifest.as_deref()) {
                Ok(cfg) => {
                    tracing::info!("✓ Configuration is valid");
                    tracing::info!("  Isolate callback panics: {}", cfg.isolate_callback_panics);
                    tracing::info!("  Notify on purge: {}", cfg.notify_on_purge);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("✗ Validation failed: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Version => {
            println!("Aurie");
            println!("Version: {}", env!("CARGO_PKG_VERSION"));
            println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
            Ok(())
        }
    }
}

fn validate(config: &Path, manifest: Option<&Path>) -> Result<ObjectManagerConfig> {
    let cfg = ObjectManagerConfig::from_file(config)
        .with_context(|| format!("loading {}", config.display()))?;

    if let Some(path) = manifest {
        let manifest = load_manifest(path)?;
        tracing::info!("  Modules: {}", manifest.modules.len());
    }

    Ok(cfg)
}

fn load_manifest(path: &Path) -> Result<Manifest> {
    let manifest: Manifest =
        load_from_file(path).with_context(|| format!("loading {}", path.display()))?;
    manifest.validate().map_err(anyhow::Error::msg)?;
    Ok(manifest)
}

fn simulate(manifest_path: PathBuf, config: Option<PathBuf>) -> Result<()> {
    let config = match config {
        Some(path) => ObjectManagerConfig::from_file(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ObjectManagerConfig::default(),
    };
    let manifest = load_manifest(&manifest_path)?;

    tracing::info!(
        manifest = %manifest_path.display(),
        modules = manifest.modules.len(),
        "Starting simulation"
    );

    let manager = ModuleManager::with_config(config);

    let mut loaded = Vec::with_capacity(manifest.modules.len());
    for spec in &manifest.modules {
        let id = manager.load(spec.name.clone(), spec.path.clone());

        if spec.listen {
            let listener = spec.name.clone();
            manager.objects().set_module_callback(
                id,
                Arc::new(move |event: &ModuleEvent| {
                    tracing::info!(
                        listener = %listener,
                        module = %event.module_name,
                        operation = %event.operation,
                        future = event.is_future_call,
                        "Module event"
                    );
                }),
            )?;
        }

        loaded.push((id, spec));
    }

    for (id, spec) in &loaded {
        let result = manager.initialize(
            *id,
            |_, _| Ok(()),
            |objects, me| {
                for name in &spec.requires {
                    objects.get(name)?;
                }
                for name in &spec.publishes {
                    objects.publish(me, name.as_str(), Arc::new(NamedInterface::new(name.as_str())))?;
                }
                Ok(())
            },
        );

        if let Err(e) = result {
            tracing::warn!(module = %spec.name, error = %e, "Module failed to initialize");
        }
    }

    let report = Report {
        stats: manager.stats(),
        modules: manager.objects().modules(),
        interfaces: manager.objects().interfaces(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    manager.unload_all();

    tracing::info!(remaining = manager.count(), "Simulation finished");
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(filter.into()))
        .init();

    Ok(())
}
