// Copyright 2026 The gangway authors
// Licensed under the Apache License, Version 2.0

mod config;

use anyhow::{Context, Result};
use config::{Backend, Config};
use gangway_app::SessionState;
use gangway_inventory::{ConnectCommand, DemoSource, InventorySource, TshSource};
use gangway_tui::UiOptions;
use std::env;
use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;

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
            "load config {}; run `gangway --print-example-config` to generate a template",
            options.config_path.display()
        )
    })?;

    let backend = if options.demo {
        Backend::Demo
    } else {
        config.backend()?
    };
    let source: Arc<dyn InventorySource> = match backend {
        Backend::Tsh => match config.tsh_path() {
            Some(path) => Arc::new(TshSource::with_path(path)),
            None => Arc::new(TshSource::locate()?),
        },
        Backend::Demo => Arc::new(DemoSource::new(config.demo_target())?),
    };

    // Session identity is resolved before the interactive loop so a broken
    // login fails fast instead of rendering a misleading picker.
    let profile = source.profile_name().context("resolve active profile")?;
    if options.check_only {
        return Ok(());
    }

    let ui_options = UiOptions {
        profile,
        page_rows: config.page_rows(),
    };
    let mut state = SessionState::default();
    let Some(hostname) = gangway_tui::run_app(&mut state, Arc::clone(&source), &ui_options)?
    else {
        return Ok(());
    };

    launch(source.connect_command(&hostname))
}

// The connection replaces the picker process so the remote shell owns the
// terminal, matching plain `tsh ssh` behavior.
#[cfg(unix)]
fn launch(command: ConnectCommand) -> Result<()> {
    use std::os::unix::process::CommandExt;

    let error = Command::new(&command.program).args(&command.args).exec();
    Err(error).with_context(|| format!("exec {}", command.program.display()))
}

#[cfg(not(unix))]
fn launch(command: ConnectCommand) -> Result<()> {
    let status = Command::new(&command.program)
        .args(&command.args)
        .status()
        .with_context(|| format!("run {}", command.program.display()))?;
    if !status.success() {
        anyhow::bail!("{} exited with {status}", command.program.display());
    }
    Ok(())
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
    println!("gangway");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a config template");
    println!("  --demo                   Use the built-in demo inventory");
    println!("  --check                  Validate config and backend connectivity");
    println!("  --help                   Show this help");
}
