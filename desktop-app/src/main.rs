mod actions;
mod cli;
mod ipc;
mod menus;
mod protocol;
mod shell;
mod surface;
mod window;

use std::process::ExitCode;

use markwrite_config::Settings;
use markwrite_core::{version_full, APP_NAME};
use markwrite_io::assets;

use cli::Cli;
use window::LaunchOptions;

/// Log filter variable, e.g. `MARKWRITE_LOG=markwrite_core=debug`.
const LOG_ENV: &str = "MARKWRITE_LOG";

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV, "info"))
        .format_timestamp_millis()
        .init();
}

/// `MarkWrite 0.1.2 (build 000021) commit 1a2b3c4`
fn startup_banner() -> String {
    format!("{APP_NAME} {} commit {}", version_full(), env!("GIT_COMMIT_HASH"))
}

fn main() -> ExitCode {
    let (cli, ignored) = Cli::parse_known();

    if cli.version {
        println!("{APP_NAME} {}", version_full());
        return ExitCode::SUCCESS;
    }

    init_logging();
    if !ignored.is_empty() {
        log::debug!("ignoring unrecognised arguments: {:?}", ignored);
    }

    let settings = Settings::load().sanitized();
    let override_dir = cli.assets_dir.clone().or_else(|| settings.assets_dir.clone());
    let asset_root = assets::resolve_root(override_dir.as_deref());

    if cli.check_assets {
        return match &asset_root {
            Some(root) => {
                let report = assets::check_assets(root);
                print!("{}", report.render());
                if report.is_complete() {
                    ExitCode::SUCCESS
                } else {
                    ExitCode::FAILURE
                }
            }
            None => {
                println!("No asset directory found. Looked in:");
                for candidate in assets::candidate_roots(override_dir.as_deref()) {
                    println!("  {}", candidate.display());
                }
                ExitCode::FAILURE
            }
        };
    }

    log::info!("{} starting, settings at {}", startup_banner(), Settings::config_path_display());

    match &asset_root {
        Some(root) => {
            let report = assets::check_assets(root);
            if !report.is_complete() {
                let missing: Vec<_> = report.missing().collect();
                log::warn!("editor assets incomplete in {}: missing {}", root.display(), missing.join(", "));
            }
        }
        None => log::warn!("no editor asset directory found; the editor page will fail to load"),
    }

    let launch = LaunchOptions {
        settings,
        asset_root,
        open: cli.existing_path(),
    };

    match window::run(launch) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
