//! # routegen
//!
//! Generate route entries, typed clients, hooks and form inputs from route
//! descriptor files.
//!
//! ## Usage
//!
//! ```bash
//! # Generate for every descriptor under the current directory
//! routegen generate
//!
//! # Force one convention and scan a subdirectory
//! routegen generate --framework pages-router --root web
//!
//! # Preview without writing, or keep regenerating on change
//! routegen generate --dry-run
//! routegen generate --watch
//!
//! # Fail with exit code 2 when generated files are stale
//! routegen check
//!
//! # List generators, write a config file
//! routegen frameworks
//! routegen init
//! ```

use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use routegen::generator::framework_generators;
use routegen::{generate_with_options, GenerateOptions, GenerationResult, OsDeps, DEFAULT_FRAMEWORK};
use routegen_cli::{
    config::{CliArgs, Config, ConfigManager, CONFIG_FILENAME},
    error::{CliError, ConfigError},
    watcher::{drain_batch, FileWatcher},
    writer::{DryRunDeps, WriteStatus},
};

#[derive(Parser)]
#[command(name = "routegen")]
#[command(author, version, about = "Generate typed route artifacts from route descriptor files", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by commands that run the pipeline.
#[derive(Args)]
struct RunArgs {
    /// Generator name or "auto" to detect per directory
    #[arg(short, long)]
    framework: Option<String>,

    /// Directory scanned for route descriptor files
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// Name of the per-route output directory
    #[arg(long)]
    output_dir: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate artifacts for every route descriptor directory
    Generate {
        #[command(flatten)]
        run: RunArgs,

        /// Preview changes without writing files
        #[arg(long)]
        dry_run: bool,

        /// Watch descriptor files and regenerate on change
        #[arg(short, long)]
        watch: bool,

        /// Print the generation result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify that generated artifacts are up-to-date
    Check {
        #[command(flatten)]
        run: RunArgs,
    },

    /// List available framework generators
    Frameworks,

    /// Initialize a new routegen configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = CONFIG_FILENAME)]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        1 => tracing_subscriber::EnvFilter::new("debug"),
        _ => tracing_subscriber::EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate {
            run,
            dry_run,
            watch,
            json,
        } => cmd_generate(run, dry_run, watch, json),
        Commands::Check { run } => cmd_check(run),
        Commands::Frameworks => cmd_frameworks(),
        Commands::Init { output, force } => cmd_init(output, force),
    }
}

/// Load the config file, apply flag overrides and validate the result.
fn load_config(run: RunArgs) -> Result<Config, CliError> {
    let config = ConfigManager::load(run.config.as_deref())?;
    let config = ConfigManager::merge_cli_args(
        config,
        &CliArgs {
            root: run.root,
            framework: run.framework,
            output_dir: run.output_dir,
        },
    );
    config.validate()?;
    Ok(config)
}

/// Generate command implementation.
fn cmd_generate(run: RunArgs, dry_run: bool, watch: bool, json: bool) -> Result<(), CliError> {
    let config = load_config(run)?;

    if watch {
        run_watch_mode(&config, dry_run)
    } else {
        run_generate(&config, dry_run, json)
    }
}

/// Run generation once.
fn run_generate(config: &Config, dry_run: bool, json: bool) -> Result<(), CliError> {
    let options = &config.generate_options();
    if !json {
        println!(
            "{} {} (framework: {})",
            "Generating route artifacts in".cyan(),
            display_root(options).display(),
            options.framework
        );
    }

    let result = if dry_run {
        let deps = DryRunDeps::new(config.os_deps());
        let result = generate_with_options(&deps, options);
        if result.success && !json {
            print_dry_run(&deps);
        }
        result
    } else {
        generate_with_options(&config.os_deps(), options)
    };

    if json {
        let rendered =
            serde_json::to_string_pretty(&result).map_err(|e| CliError::Generation(e.to_string()))?;
        println!("{}", rendered);
    } else if !dry_run {
        print_result(&result);
    }

    into_outcome(result)
}

fn display_root(options: &GenerateOptions) -> PathBuf {
    options.root.clone().unwrap_or_else(|| PathBuf::from("."))
}

fn into_outcome(result: GenerationResult) -> Result<(), CliError> {
    if result.success {
        Ok(())
    } else {
        Err(CliError::Generation(
            result.error.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

fn print_result(result: &GenerationResult) {
    let Some(generated) = &result.generated else {
        return;
    };

    for directory in generated {
        println!(
            "  {} {} ({} files)",
            "✓".green(),
            directory.directory.display(),
            directory.files.len().to_string().green()
        );
    }
    println!(
        "{} Generated {} route director{}",
        "✓".green(),
        generated.len(),
        if generated.len() == 1 { "y" } else { "ies" }
    );
}

fn print_dry_run(deps: &DryRunDeps<OsDeps>) {
    for (write, status) in deps.statuses() {
        let label = match status {
            WriteStatus::Created => status.label().green(),
            WriteStatus::Changed => status.label().yellow(),
            WriteStatus::Unchanged => status.label().dimmed(),
        };
        println!(
            "{} {:>9} {}",
            "[dry-run]".yellow(),
            label,
            write.path.display()
        );
    }
}

/// Run in watch mode.
fn run_watch_mode(config: &Config, dry_run: bool) -> Result<(), CliError> {
    println!("{}", "Starting watch mode...".cyan());
    println!("  Watching: {}", config.project.root.display());
    println!("  Press Ctrl+C to stop\n");

    // A failed first run is reported but does not stop the watch.
    if let Err(e) = run_generate(config, dry_run, false) {
        print_error(&e);
    }

    let watcher = FileWatcher::new(&config.project.root, config.output.dir.clone());
    let (_debouncer, rx) = watcher.watch()?;

    println!("\n{}", "Watching for changes...".cyan());

    while let Ok(first) = rx.recv() {
        // One debounced batch can touch several descriptors; regenerate once.
        let mut changed = 0;
        for event in drain_batch(first, &rx) {
            if let Some(message) = event.error_message() {
                println!("{} {}", "Watch error:".red(), message);
                continue;
            }
            if let Some(path) = event.path() {
                println!("\n{} {}", "Descriptor changed:".cyan(), path.display());
                changed += 1;
            }
        }

        if changed == 0 {
            continue;
        }

        if let Err(e) = run_generate(config, dry_run, false) {
            print_error(&e);
        }

        println!("\n{}", "Watching for changes...".cyan());
    }

    Ok(())
}

/// Check command implementation.
fn cmd_check(run: RunArgs) -> Result<(), CliError> {
    let config = load_config(run)?;
    let options = config.generate_options();

    println!("{}", "Checking generated route artifacts...".cyan());

    let deps = DryRunDeps::new(config.os_deps());
    into_outcome(generate_with_options(&deps, &options))?;

    let stale: Vec<_> = deps
        .statuses()
        .into_iter()
        .filter(|(_, status)| *status != WriteStatus::Unchanged)
        .collect();

    if stale.is_empty() {
        println!("{} Generated files are up-to-date", "✓".green());
        return Ok(());
    }

    for (write, status) in &stale {
        println!("  {} {:>7} {}", "✗".red(), status.label(), write.path.display());
    }
    println!("  Run 'routegen generate' to update");
    Err(CliError::Check(format!(
        "{} generated file(s) out of date",
        stale.len()
    )))
}

/// Frameworks command implementation.
fn cmd_frameworks() -> Result<(), CliError> {
    println!("{}", "Available frameworks:".cyan());
    for generator in framework_generators() {
        println!(
            "  {:<14} {}",
            generator.name().green(),
            generator.description()
        );
    }
    println!(
        "  {:<14} {}",
        DEFAULT_FRAMEWORK.green(),
        "Detect per route directory from the closest `app` or `pages` segment"
    );
    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        return Err(ConfigError::AlreadyExists { path: output }.into());
    }

    write_config(&output)?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

fn write_config(path: &Path) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, ConfigManager::default_config_content())?;
    Ok(())
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
