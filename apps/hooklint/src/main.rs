//! hooklint CLI binary entry point.
//! Resolves configuration, dispatches to the selected mode and prints results.

use clap::Parser;
use hooklint::cli::{Cli, Mode};
use hooklint::settings::load_layers;
use hooklint::utils::{display_path, error_prefix, note_prefix};
use hooklint::{config, output, validate};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HOOKLINT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Some(dir) = cli.dir.as_deref() {
        if !PathBuf::from(dir).is_dir() {
            eprintln!("{} Project directory not found: {}", error_prefix(), dir);
            std::process::exit(2);
        }
    }

    let (eff, problem) = config::resolve_effective(
        cli.dir.as_deref(),
        cli.output.as_deref(),
        cli.timeout,
        cli.no_probe,
    );
    if let Some(e) = problem {
        eprintln!("{} {}; using defaults.", note_prefix(), e);
    }
    if eff.output != "human" && eff.output != "json" {
        eprintln!(
            "{} Unknown output mode: {} (expected human or json)",
            error_prefix(),
            eff.output
        );
        std::process::exit(2);
    }
    tracing::debug!(project = %eff.project_dir.display(), mode = ?cli.mode(), "resolved configuration");

    let ctx = eff.context();
    let ok = match cli.mode() {
        Mode::Script => {
            let path = PathBuf::from(cli.script.as_deref().unwrap_or_default());
            let path = if path.is_absolute() {
                path
            } else {
                ctx.project_dir.join(path)
            };
            let layers = load_layers(&ctx.settings);
            let report = validate::validate_script(&path, cli.event.as_deref(), &layers, &ctx);
            output::print_script_report(&display_path(&path, &ctx.project_dir), &report, &eff.output);
            report.success()
        }
        Mode::All => {
            let scripts = validate::discover_hooks(&ctx.hooks_dir);
            if scripts.is_empty() {
                println!("No hook scripts found in {}", ctx.hooks_dir.display());
                std::process::exit(0);
            }
            let layers = load_layers(&ctx.settings);
            let reports = validate::validate_scripts(&scripts, cli.event.as_deref(), &layers, &ctx);
            output::print_scripts(&reports, &ctx.project_dir, &eff.output);
            reports.iter().all(|r| r.report.success())
        }
        Mode::Settings => {
            let layers = load_layers(&ctx.settings);
            let reports = validate::validate_settings(&layers, &ctx);
            output::print_settings(&reports, &eff.output);
            reports.iter().all(|r| r.report.success())
        }
        Mode::Project => {
            let report = validate::validate_project(&ctx);
            output::print_project(&report, &eff.output);
            report.success()
        }
    };
    std::process::exit(if ok { 0 } else { 1 });
}
