//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `attachment_core` linkage and registry wiring.
//! - Keep output deterministic for quick local sanity checks.

use attachment_core::components::auth::Authenticator;
use attachment_core::registry::provider::keys;
use attachment_core::{ServiceProvider, ServiceRegistry};
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::process::ExitCode;

/// Wires the base and admin services and reports what was registered.
#[derive(Debug, Parser)]
#[command(name = "attachment_cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Root for metadata and view lookups.
    #[arg(default_value = ".")]
    base_path: PathBuf,
    /// Absolute directory for rotating log files; logging stays off without it.
    log_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Some(log_dir) = &args.log_dir {
        if let Err(err) =
            attachment_core::init_logging(attachment_core::default_log_level(), log_dir)
        {
            eprintln!("logging disabled: {err}");
        }
    }

    println!("attachment_core ping={}", attachment_core::ping());
    println!("attachment_core version={}", attachment_core::core_version());

    let mut registry = ServiceRegistry::new();
    let provider = ServiceProvider::new(args.base_path);
    provider.register_base_services(&mut registry);
    provider.register_admin_services(&mut registry);
    info!("event=cli_wire module=cli status=ok keys={}", registry.len());

    for key in registry.keys() {
        println!("registered {key}");
    }

    match registry.resolve::<Authenticator>(keys::AUTHENTICATOR) {
        Ok(authenticator) => {
            println!("authenticator user_type={}", authenticator.user_type());
            ExitCode::SUCCESS
        }
        Err(err) => {
            warn!(
                "event=cli_resolve module=cli status=error key={} error={err}",
                keys::AUTHENTICATOR
            );
            eprintln!("failed to resolve {}: {err}", keys::AUTHENTICATOR);
            ExitCode::FAILURE
        }
    }
}
