// Copyright 2024-2026 memo-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Config CLI subcommands: show, defaults, validate.

use std::path::Path;

use crate::config::{self, EffectiveConfig, EnvConfig};
use crate::telemetry::build_filter;

/// Print the effective config. Reads `file` when given, the environment
/// otherwise. Returns the process exit code.
pub fn run_show(file: Option<&Path>, json: bool) -> i32 {
    let env = match file {
        Some(path) => match EnvConfig::from_file(path) {
            Ok(env) => env,
            Err(e) => {
                eprintln!("{}", e);
                return 2;
            }
        },
        None => config::load(),
    };
    let cfg = env.effective_config();

    if json {
        match serde_json::to_string_pretty(&cfg) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to encode config: {}", e);
                return 1;
            }
        }
    } else {
        print_config(&cfg);
    }
    0
}

/// Print default config values (no env overrides) to stdout.
pub fn run_defaults() {
    print_config(&EnvConfig::default().effective_config());
}

/// Validate environment configuration.
///
/// Returns 0 if valid, 1 if any warnings are found.
pub fn run_validate() -> i32 {
    let warnings = validate(&config::load());
    for w in &warnings {
        eprintln!("WARNING: {}", w);
    }
    if warnings.is_empty() {
        println!("Configuration is valid.");
        0
    } else {
        1
    }
}

/// Collect configuration problems that loading silently tolerates.
pub fn validate(env: &EnvConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if let Err(e) = build_filter(&env.log) {
        warnings.push(format!("MEMO_LOG_LEVEL: {}", e));
    }

    if let Some(path) = &env.log.output_path {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = parent {
            if !dir.is_dir() {
                warnings.push(format!(
                    "MEMO_LOG_FILE: directory {} does not exist",
                    dir.display()
                ));
            }
        }
    }

    warnings
}

fn print_config(cfg: &EffectiveConfig) {
    println!("MEMO_RECORD_METRICS={}", cfg.record_metrics);
    println!("MEMO_TRACE_KEYS={}", cfg.trace_keys);
    println!("MEMO_INITIAL_CAPACITY={}", cfg.initial_capacity);
    println!("MEMO_SHARD_AMOUNT={}", cfg.shard_amount);
    println!("MEMO_LOG_LEVEL={}", cfg.log_level);
    println!("MEMO_LOG_FORMAT={}", cfg.log_format);
    println!(
        "MEMO_LOG_FILE={}",
        cfg.log_file.as_deref().unwrap_or("")
    );
}
