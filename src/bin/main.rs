use bunch_check::{self, CheckReport, CheckSettings, Extensions};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::{fmt, EnvFilter};

fn parse_extensions(s: &str) -> std::result::Result<Extensions, String> {
    Extensions::parse_list(s).map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Git repository (HTTPS/SSH URL or local path)
    #[arg(short, long)]
    repo: String,

    /// Newest commit to check (inclusive)
    #[arg(short, long, default_value = "HEAD")]
    since: String,

    /// Oldest boundary of the range (exclusive). Checks the whole history if omitted
    #[arg(short, long)]
    until: Option<String>,

    /// Comma-separated bunch extensions (read from the `.bunch` file if not provided)
    #[arg(short, long, value_parser = parse_extensions)]
    extensions: Option<Extensions>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(global = true, short, long, default_value = "error")]
    log: LevelFilter,
}

fn print_report(report: &CheckReport) {
    println!("Found commits: {}", report.commits.len());
    for commit in &report.commits {
        println!("  {}", commit.title);
    }

    for problem in &report.problems {
        println!("\n{} {} {}", problem.hash, problem.author, problem.title);
        for file in &problem.forgotten {
            let marker = if file.deleted { " [deleted]" } else { "" };
            println!("    {}{marker}", file.path);
        }
    }

    if report.has_problems() {
        println!(
            "\n❌ {} of {} commits forgot to update bunch files",
            report.problems.len(),
            report.commits.len()
        );
    } else {
        println!(
            "\n✅ {} commits checked, no problems found",
            report.commits.len()
        );
    }
}

#[tokio::main]
async fn main() -> bunch_check::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let env_filter = EnvFilter::from_default_env().add_directive(cli.log.into());

    fmt()
        .with_env_filter(env_filter)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(true)
        .pretty()
        .init();

    let settings = CheckSettings {
        since: cli.since,
        until: cli.until,
        extensions: cli.extensions,
    };
    debug!(settings = ?settings, "Starting bunch check");

    let report = bunch_check::check(&cli.repo, &settings)?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        print_report(&report);
    }

    if report.has_problems() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
