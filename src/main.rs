use std::error::Error as _;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use pbfetch::{Api, Config};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Make sure a PocketBase binary of the right version is present in a directory.
#[derive(Debug, Parser)]
#[command(name = "pbfetch", version, about)]
struct Cli {
    /// Directory to install into.
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Version to install (overrides POCKETBASE_VERSION and the latest release).
    #[arg(long = "pb-version", value_name = "VERSION")]
    pb_version: Option<String>,

    /// GitHub repository in owner/name form.
    #[arg(long)]
    repo: Option<String>,

    /// Reinstall even if the installed version matches.
    #[arg(long)]
    force: bool,

    /// Do not draw a progress bar.
    #[arg(long)]
    no_progress: bool,

    /// Log debug details.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors.
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(cli: &Cli) {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();

    let _ = TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto);
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let config = Config::from_env();
    let repo = cli.repo.clone().unwrap_or_else(|| config.repo.clone());
    let mut api = Api::with_config(config).set_install_dir(&cli.dir);
    if cli.no_progress {
        api = api.no_progress();
    }

    let result = api
        .repo(&repo)
        .requested(cli.pb_version.as_deref())
        .force(cli.force)
        .ensure()
        .await;

    match result {
        Ok(installed) => {
            println!("{}", installed.binary_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprint!("{}", failure_report(&e));
            ExitCode::FAILURE
        }
    }
}

/// `error: <message>` followed by one line per underlying cause.
fn failure_report(e: &pbfetch::Error) -> String {
    let mut report = format!("error: {e}\n");
    let mut source = e.source();
    while let Some(cause) = source {
        report.push_str(&format!("  caused by: {cause}\n"));
        source = cause.source();
    }
    report
}
