//! memo-core command line entry point.
//!
//! ## CLI Subcommands
//!
//! - `memo-core demo [N] [--json]` - Memoization walkthrough (default)
//! - `memo-core config show [--file PATH] [--json]` - Effective configuration
//! - `memo-core config defaults` - Default configuration
//! - `memo-core config validate` - Validate configuration (exit 0/1)

use std::path::Path;
use std::process::ExitCode;

use memo_core::cli::{config_cmd, flag_value, has_flag, run_demo};
use memo_core::config as memo_config;
use memo_core::telemetry::{describe_metrics, init_logging};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("demo");

    match command {
        "demo" | "" => {
            let env = memo_config::load();
            if let Err(e) = init_logging(&env.log) {
                eprintln!("Logging disabled: {}", e);
            }
            describe_metrics();

            let fib_n = match args.get(2).filter(|a| !a.starts_with("--")) {
                Some(raw) => match raw.parse::<i64>() {
                    Ok(n) => n,
                    Err(_) => {
                        eprintln!("Invalid number: {}", raw);
                        return ExitCode::from(2u8);
                    }
                },
                None => 30,
            };
            let code = run_demo(fib_n, env.memo, has_flag(&args, "--json"));
            ExitCode::from(code as u8)
        }
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    let file = flag_value(&args, "--file").map(Path::new);
                    let code = config_cmd::run_show(file, has_flag(&args, "--json"));
                    ExitCode::from(code as u8)
                }
                "defaults" => {
                    config_cmd::run_defaults();
                    ExitCode::SUCCESS
                }
                "validate" => {
                    let code = config_cmd::run_validate();
                    ExitCode::from(code as u8)
                }
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_usage();
                    ExitCode::FAILURE
                }
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("memo-core {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "memo-core v{}

USAGE:
    memo-core [COMMAND] [OPTIONS]

COMMANDS:
    demo [N]     Walk through declare/call/preset/reset (default, N = 30)
    config       Show, list defaults, or validate configuration
    version      Show version information
    help         Show this help message

OPTIONS:
    --json         JSON output (demo, config show)
    --file PATH    Read configuration from a TOML file (config show)

ENVIRONMENT:
    MEMO_RECORD_METRICS    Emit metrics counters (default: true)
    MEMO_TRACE_KEYS        Log full argument keys (default: false)
    MEMO_INITIAL_CAPACITY  Method slots reserved per instance (default: 8)
    MEMO_LOG_LEVEL         Log filter (default: info)
    MEMO_LOG_FORMAT        json or pretty (default: json)
    MEMO_LOG_FILE          Log file path (default: stderr)

EXIT CODES:
    0  Success
    1  Failure
    2  Invalid input or configuration file
",
        version
    );
}
