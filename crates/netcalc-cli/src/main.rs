use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use netcalc_cidr::Subnet;
use std::io::{IsTerminal, Write};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod render;
mod repl;

use render::{OutputFormat, RenderOptions, Renderer};

/// IPv4 subnet calculator
///
/// Pass one or more CIDR expressions to calculate them directly, or run
/// without arguments for an interactive prompt.
#[derive(Parser)]
#[command(name = "netcalc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address in CIDR notation (e.g. 192.168.0.0/24)
    #[arg(value_name = "CIDR")]
    targets: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    output: OutputFormat,

    /// When to use terminal colors
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,

    /// Omit the binary section of human output
    #[arg(long)]
    no_binary: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorChoice {
    /// Color when stdout is a terminal
    Auto,
    /// Always color
    Always,
    /// Never color
    Never,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;
    apply_color_choice(cli.color);

    let options = RenderOptions {
        format: cli.output,
        show_binary: !cli.no_binary,
    };
    tracing::info!(format = ?options.format, "starting netcalc");

    if cli.targets.is_empty() {
        handle_interactive(options)
    } else {
        let mut renderer = Renderer::new(std::io::stdout().lock(), std::io::stderr(), options);
        handle_targets(&cli.targets, &mut renderer)
    }
}

/// Initialize logging - respects RUST_LOG, `--verbose` forces debug
fn init_logging(verbose: bool) -> Result<()> {
    let log_level = if verbose {
        Level::DEBUG
    } else {
        std::env::var("RUST_LOG")
            .ok()
            .and_then(|s| s.parse::<Level>().ok())
            .unwrap_or(Level::WARN)
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn apply_color_choice(choice: ColorChoice) {
    match choice {
        ColorChoice::Always => colored::control::set_override(true),
        ColorChoice::Never => colored::control::set_override(false),
        ColorChoice::Auto => {
            if !std::io::stdout().is_terminal() {
                colored::control::set_override(false);
            }
        }
    }
}

fn handle_interactive(options: RenderOptions) -> Result<()> {
    let stdin = std::io::stdin();
    let mut renderer = Renderer::new(std::io::stdout().lock(), std::io::stderr(), options);
    repl::run(stdin.lock(), &mut renderer)?;
    Ok(())
}

/// Calculate every target; fails after the last one if any was rejected
fn handle_targets<W: Write, E: Write>(
    targets: &[String],
    renderer: &mut Renderer<W, E>,
) -> Result<()> {
    let mut failed = 0usize;

    for target in targets {
        match Subnet::parse(target) {
            Ok(subnet) => renderer.render(&subnet)?,
            Err(err) => {
                tracing::debug!(input = %target, error = ?err, "rejected input");
                renderer.error(&err.to_string())?;
                failed += 1;
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} inputs could not be parsed", failed, targets.len());
    }
    Ok(())
}
