use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser, ValueEnum};
use tracing::{info, warn};

use selfcheck::health::{self, SelfCheckRunner};
use selfcheck::{SelfCheckConfig, build_info, logging};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Table with a summary block
    Table,
    /// Pretty JSON
    Json,
    /// Status line followed by one error per line
    Line,
}

#[derive(Parser)]
#[command(name = "selfcheck")]
#[command(about = "Run the startup self-checks and report their outcome", long_about = None)]
struct Cli {
    /// Configuration profile (defaults to $SELFCHECK_PROFILE, then "debug")
    #[arg(short, long)]
    profile: Option<String>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Override the base URL pinged by the network check
    #[arg(long)]
    base_url: Option<String>,

    /// Per-check timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Directory for the storage check's file store
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    /// Trigger the manual fault after the run
    #[arg(long)]
    fault: bool,

    /// Log every report snapshot as it is published
    #[arg(long)]
    watch: bool,
}

impl Cli {
    fn apply(&self, config: &mut SelfCheckConfig) {
        if let Some(base_url) = &self.base_url {
            config.network.base_url = base_url.clone();
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.runner.check_timeout_ms = Some(timeout_ms);
        }
        if let Some(dir) = &self.storage_dir {
            config.storage.dir = Some(dir.clone());
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Cli::command()
        .version(build_info::version_string())
        .long_version(build_info::long_version())
        .get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let loaded = match &cli.profile {
        Some(profile) => SelfCheckConfig::load(profile),
        None => SelfCheckConfig::load_from_env(),
    };
    let (mut config, load_error) = match loaded {
        Ok(config) => (config, None),
        Err(e) => (SelfCheckConfig::default(), Some(e)),
    };

    logging::init(&config.log.filter);
    if let Some(e) = load_error {
        warn!(error = %e, "Failed to load config, using default configuration");
    }
    cli.apply(&mut config);
    info!(profile = %config.profile, version = %build_info::version_string(), "Starting self-check");

    let mut runner = SelfCheckRunner::from_config(&config.runner);
    runner.register_checks(health::default_checks(&config)?);

    let watcher = cli.watch.then(|| {
        let mut updates = runner.subscribe();
        tokio::spawn(async move {
            while updates.changed().await.is_ok() {
                let snapshot = updates.borrow_and_update().clone();
                if let Some(latest) = snapshot.summary.last() {
                    info!(done = snapshot.total(), "{latest}");
                }
                if snapshot.is_finished() {
                    break;
                }
            }
        })
    });

    runner.run_all().await;

    if let Some(watcher) = watcher {
        watcher.await?;
    }

    if cli.fault {
        runner.trigger_manual_fault();
    }

    let report = runner.report();
    match cli.format {
        OutputFormat::Table => health::print_report(&report),
        OutputFormat::Json => println!("{}", health::format_json(&report)?),
        OutputFormat::Line => {
            println!("{}", report.status_line());
            for entry in &report.errors {
                println!("{entry}");
            }
        }
    }

    let code = report.exit_code();
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}
