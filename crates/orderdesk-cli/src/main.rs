// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

use anyhow::{Context, Result, bail};
use config::Config;
use orderdesk_app::{GridEvent, GridVariant, NoticeLevel, OrdersBackend, OrdersGrid, SyncAdapter};
use orderdesk_remote::Client;
use orderdesk_testkit::MemoryBackend;
use runtime::{DemoRuntime, RemoteRuntime};
use std::env;
use std::path::PathBuf;
use tracing::info;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `orderdesk --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;

    if options.check_only {
        println!("{}", check(&config, options.demo)?);
        return Ok(());
    }

    let log_path = logging::init(&config)?;
    let grid_options = config.grid_options();
    if options.demo {
        info!(log = %log_path.display(), "starting with in-memory demo orders");
        let mut runtime = DemoRuntime::new(MemoryBackend::demo());
        return orderdesk_tui::run_app(&mut runtime, &grid_options, config.show_dashboard());
    }

    let client = remote_client(&config, &options.config_path)?;
    info!(
        log = %log_path.display(),
        base_url = client.base_url(),
        "starting against orders API"
    );
    let mut runtime = RemoteRuntime::new(client);
    orderdesk_tui::run_app(&mut runtime, &grid_options, config.show_dashboard())
}

fn remote_client(config: &Config, config_path: &std::path::Path) -> Result<Client> {
    Client::new(&config.base_url(), config.timeout()?).with_context(|| {
        format!(
            "invalid [remote] config in {}; fix base_url/timeout values",
            config_path.display()
        )
    })
}

/// Validates startup dependencies: one `GET /orders` against the configured
/// API, or the seeded demo backend.
fn check(config: &Config, demo: bool) -> Result<String> {
    if demo {
        let count = load_orders(&MemoryBackend::demo())?;
        return Ok(format!("demo backend ready: {count} orders"));
    }

    let client = Client::new(&config.base_url(), config.timeout()?)?;
    let count = load_orders(&client).with_context(|| {
        format!(
            "check orders API at {}; set [remote].base_url or ORDERDESK_BASE_URL",
            client.base_url()
        )
    })?;
    Ok(format!(
        "orders API ready at {}: {count} orders",
        client.base_url()
    ))
}

/// Runs the startup reload inline and returns how many rows landed in the grid.
fn load_orders(backend: impl OrdersBackend) -> Result<usize> {
    let mut grid = OrdersGrid::new(GridVariant::Full);
    let events = SyncAdapter::new(backend).load(&mut grid);
    let failure = events.iter().find_map(|event| match event {
        GridEvent::Notice(notice) if notice.level == NoticeLevel::Error => {
            Some(notice.message.as_str())
        }
        _ => None,
    });
    if let Some(message) = failure {
        bail!("{message}");
    }
    Ok(grid.store().len())
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    demo: bool,
    print_example: bool,
    check_only: bool,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        demo: false,
        print_example: false,
        check_only: false,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--demo" => {
                options.demo = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow::anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("orderdesk");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --demo                   Run against seeded in-memory orders");
    println!("  --check                  Validate config and reach the orders API, then exit");
    println!("  --help                   Show this help");
}
