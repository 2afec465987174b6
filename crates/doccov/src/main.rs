use clap::{Parser, Subcommand};
use doccov::config::{Config, CONFIG_FILE};
use doccov::output::{self, OutputFormat};
use doccov_core::{CoverageAggregator, DiscoveryOptions, JsonStore};
use eyre::{eyre, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "doccov", version, about = "Measure documentation coverage of a source tree")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a coverage report
    Report {
        /// Project root to analyze
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Config file (defaults to <root>/doccov.json)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output format: text or json
        #[arg(long, default_value = "text")]
        format: String,
        /// Override the overall coverage threshold
        #[arg(long)]
        threshold: Option<f64>,
        /// Show per-file breakdown
        #[arg(long, short)]
        verbose: bool,
    },
    /// Preview what file discovery would include and exclude
    DryRun {
        /// Project root to analyze
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Config file (defaults to <root>/doccov.json)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DOCCOV_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            // Unusable options or config; distinct from a failed threshold.
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Report {
            root,
            config,
            format,
            threshold,
            verbose,
        } => {
            let format = OutputFormat::from_str(&format)
                .ok_or_else(|| eyre!("unknown output format {format:?}, expected text or json"))?;
            let config = Config::load(&config.unwrap_or_else(|| root.join(CONFIG_FILE)))?;
            let options = config.report_options(&root, threshold);

            let store = JsonStore::new(config.store_path(&root));
            let report = CoverageAggregator::new(store).generate_report(&options)?;

            print!("{}", output::render_report(&report, format, verbose));
            Ok(ExitCode::from(output::exit_code(&report, options.threshold)))
        }
        Command::DryRun { root, config } => {
            let config = Config::load(&config.unwrap_or_else(|| root.join(CONFIG_FILE)))?;
            let options = config.report_options(&root, None);

            let preview = doccov_core::dry_run(&DiscoveryOptions {
                include: options.include,
                exclude: options.exclude,
                root_dir: options.root_dir,
            })?;

            println!(
                "{} files would be analyzed (~{} lines estimated)",
                preview.files.len(),
                preview.estimated_total_lines
            );
            for file in &preview.files {
                println!("  {} {file}", "+".green());
            }
            if !preview.excluded_source_like.is_empty() {
                println!(
                    "{} source-like files excluded:",
                    preview.excluded_source_like.len()
                );
                for file in &preview.excluded_source_like {
                    println!("  {} {file}", "-".yellow());
                }
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
