//! apitest - black-box test runner CLI
//!
//! Spawns the server under test and replays the YAML-defined request
//! sequence against it. Exit code 0 means every case passed.

use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Color;

use apitest::cli::{self, RunOptions, DEFAULT_BASE_URL};
use apitest::common::{env, logging};
use apitest::runner::report;

#[derive(Parser)]
#[command(name = "apitest", about = "Declarative black-box test runner for HTTP API servers")]
#[command(version, long_about = None)]
struct Cli {
    /// Server executable under test
    #[arg(long, env = "BIN_PATH", default_value_os_t = env::default_bin_path())]
    bin: PathBuf,

    /// YAML test document
    #[arg(long = "test_path", env = "TEST_PATH", default_value_os_t = env::default_test_path())]
    test_path: PathBuf,

    /// Endpoint the server under test listens on
    #[arg(long = "base_url", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Database name exported to the server as DATABASE_NAME
    #[arg(long)]
    database: Option<String>,

    /// List passing cases in the final report
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    env::load_env_file(Path::new(".env"));
    logging::init();

    let args = Cli::parse();
    let options = RunOptions {
        bin: args.bin,
        test_path: args.test_path,
        base_url: args.base_url,
        database: args.database,
        verbose: args.verbose,
    };

    match cli::run(&options).await {
        Ok(summary) if summary.all_passed() => {
            report::header("SUCCESSFUL", Color::Green);
            if options.verbose {
                for case in &summary.passed {
                    report::success_line(case);
                }
            }
        }
        Ok(summary) => {
            report::header(&format!("{} FAILED", summary.failed.len()), Color::Red);
            for case in &summary.failed {
                report::failure(case);
            }
            println!();
            std::process::exit(1);
        }
        Err(error) => {
            report::header("ERROR", Color::Magenta);
            report::error(&error);
            let name = options
                .bin
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or_default();
            report::note(&format!("killing all {} processes...", name));
            cli::spawn::kill_by_name(&options.bin).await;
            std::process::exit(1);
        }
    }
}
