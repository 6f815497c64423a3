mod aggregate;
mod clipboard;
mod cloud;
mod config;
mod controller;
mod error;
mod model;
mod modules;
mod print;
mod session;
mod store;
#[cfg(test)]
mod testing;
mod utils;

pub use error::{Error, Result};

use clap::{Arg, ArgAction, ArgMatches, Command};
use clipboard::SystemClipboard;
use config::{Settings, OUTPUT_DIR};
use controller::Controller;
use model::{export_to_json, export_to_markdown, export_to_text, ScanResult};
use std::path::Path;
use store::JsonFileStore;
use tracing::{error, info};
use utils::{ensure_dir, log::init_tracing_subscriber, run_id};

fn cli() -> Command {
    Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .about("Aggregate the subdomains of a domain and guess who hosts them")
        .arg(
            Arg::new("store")
                .long("store")
                .value_name("PATH")
                .global(true)
                .help("Where the last scan is kept"),
        )
        .arg(
            Arg::new("extended")
                .long("extended")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Also query web.archive.org and rapiddns.io"),
        )
        .arg(
            Arg::new("no-cloud")
                .long("no-cloud")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Skip the hosting provider detection"),
        )
        .arg(
            Arg::new("logs")
                .short('s')
                .long("logs")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Save logs into a .log file"),
        )
        .subcommand(Command::new("modules").about("List all modules"))
        .subcommand(Command::new("interactive").about("Open an interactive session"))
        .subcommand(
            Command::new("scan")
                .about("Scan a target")
                .arg(
                    Arg::new("target")
                        .help("The domain name to scan")
                        .value_name("TARGET")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .help("Output format")
                        .value_name("OUTPUT")
                        .value_parser(["json", "md", "txt", "none"])
                        .default_value("none"),
                ),
        )
        .subcommand(Command::new("show").about("Print the last scan"))
        .subcommand(Command::new("copy").about("Copy the last scan to the clipboard"))
        .subcommand(Command::new("clear").about("Forget the last scan"))
        .arg_required_else_help(true)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli().get_matches();

    let Some((name, args)) = cli.subcommand() else {
        error!("{:12} - Command not handled, exit program", "CLI ERROR");
        return Err(Error::CliUsage("Command not handled".into()));
    };

    let settings = Settings::from_matches(args);
    let filename = run_id()?;
    let log_dir = match args.try_get_one::<String>("target") {
        Ok(Some(target)) => Path::new(OUTPUT_DIR).join(target),
        _ => Path::new(OUTPUT_DIR).to_path_buf(),
    };
    if settings.save_logs {
        ensure_dir(&log_dir)?;
    }
    init_tracing_subscriber(settings.save_logs, &log_dir, &filename);

    match name {
        "modules" => modules::display_all(),
        "interactive" => interactive(&settings).await?,
        "scan" => {
            let target = args
                .get_one::<String>("target")
                .ok_or_else(|| Error::CliUsage("missing target".into()))?;
            info!("Scanning {} (run_{})", target, filename);
            scan(&settings, args, target, &log_dir, &filename).await?;
        }
        "show" => show(&settings).await?,
        "copy" => copy(&settings)?,
        "clear" => clear(&settings)?,

        // fallback if a cmd is not handled (should not possible)
        _ => {
            error!("{:12} - Command not handled, exit program", "CLI ERROR");
            return Err(Error::CliUsage("Command not handled".into()));
        }
    }

    Ok(())
}

// region:        --- Commands

async fn interactive(settings: &Settings) -> Result<()> {
    let mut store = JsonFileStore::open(&settings.store_path)?;
    let mut clipboard = SystemClipboard::new();
    let mut controller = Controller::open(&mut store, &mut clipboard, settings.services()?);
    session::run(&mut controller).await
}

async fn scan(
    settings: &Settings,
    args: &ArgMatches,
    target: &str,
    output_dir: &Path,
    filename: &str,
) -> Result<()> {
    let mut store = JsonFileStore::open(&settings.store_path)?;
    let mut clipboard = SystemClipboard::new();
    let mut controller = Controller::new(&mut store, &mut clipboard, settings.services()?);

    controller.scan(target).await;
    print::print_table(controller.rows());
    while let Some(index) = controller.next_update().await {
        if let Some(row) = controller.rows().get(index) {
            print::print_update(row, controller.rows());
        }
    }
    print::print_status(controller.status());

    if controller.rows().is_empty() {
        return Ok(());
    }

    // write result
    let format = args
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or("none");
    if format == "none" {
        return Ok(());
    }

    ensure_dir(output_dir)?;
    let path = output_dir.join(filename).with_extension(format);
    let result = ScanResult {
        domain: target.trim().to_string(),
        subdomains: controller.rows().iter().map(|row| row.host.clone()).collect(),
    };
    match format {
        "json" => export_to_json(&result, &path)?,
        "md" => export_to_markdown(&result.domain, controller.rows(), &path)?,
        _ => export_to_text(&result, &path)?,
    }
    info!("Result written to {}", path.display());
    print::print_status(&format!("Saved to {}", path.display()));

    Ok(())
}

async fn show(settings: &Settings) -> Result<()> {
    let mut store = JsonFileStore::open(&settings.store_path)?;
    let mut clipboard = SystemClipboard::new();
    let mut controller = Controller::open(&mut store, &mut clipboard, settings.services()?);

    print::print_table(controller.rows());
    while let Some(index) = controller.next_update().await {
        if let Some(row) = controller.rows().get(index) {
            print::print_update(row, controller.rows());
        }
    }
    print::print_status(controller.status());
    Ok(())
}

fn copy(settings: &Settings) -> Result<()> {
    let mut store = JsonFileStore::open(&settings.store_path)?;
    // the process exits right after, the selection must outlive it
    let mut clipboard = SystemClipboard::until_replaced();
    let services = Settings {
        cloud: false,
        ..settings.clone()
    }
    .services()?;
    let mut controller = Controller::open(&mut store, &mut clipboard, services);

    if controller.copy_enabled() {
        print::print_status(&format!(
            "Copying {} hostnames, waiting for the clipboard to be pasted or replaced...",
            controller.rows().len()
        ));
    }
    if controller.copy() {
        print::print_status(&format!("Copied {} hostnames", controller.rows().len()));
    } else if controller.rows().is_empty() {
        print::print_status("Nothing to copy");
    } else {
        print::print_status(controller.status());
    }
    Ok(())
}

fn clear(settings: &Settings) -> Result<()> {
    let mut store = JsonFileStore::open(&settings.store_path)?;
    let mut clipboard = SystemClipboard::new();
    let services = Settings {
        cloud: false,
        ..settings.clone()
    }
    .services()?;
    let mut controller = Controller::new(&mut store, &mut clipboard, services);

    controller.clear();
    print::print_status(controller.status());
    Ok(())
}

// endregion:     --- Commands
