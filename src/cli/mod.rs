// Copyright 2024-2026 memo-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommands for the `memo-core` binary.
//!
//! ## Usage
//!
//! ```bash
//! memo-core demo 30            # Run the memoization walkthrough
//! memo-core demo 30 --json     # Same, as a JSON report
//! memo-core config show        # Effective configuration
//! memo-core config validate    # Check configuration, exit 0 if valid
//! ```

pub mod config_cmd;
pub mod demo_cmd;

pub use demo_cmd::{demo_report, run_demo, DemoReport};

/// Look for `--flag` anywhere after the subcommand.
pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

/// Value following `--name`, if present.
pub fn flag_value<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .map(|s| s.as_str())
}
