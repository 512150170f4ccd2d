// Copyright 2024-2026 memo-core Contributors
// SPDX-License-Identifier: Apache-2.0

//! Demo subcommand: a guided run of declare, call, preset and reset.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::config::MemoConfig;
use crate::error::MemoError;
use crate::memo::{CallArgs, Signature, StatsSnapshot};
use crate::object::{Class, ResetTarget};

/// Largest Fibonacci index that fits in an `i64`.
pub const MAX_FIB: i64 = 92;

/// Outcome of one demo run.
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub fib_n: i64,
    pub fib_value: i64,
    /// Times the Fibonacci body ran; `n + 1` with caching.
    pub fib_body_runs: usize,
    /// `square` body runs after: square(2), square(2), square(3),
    /// reset(square, 2), square(2), square(3).
    pub square_body_runs: usize,
    /// `square(7)` after presetting it to -1.
    pub preset_value: i64,
    pub stats: StatsSnapshot,
}

fn demo_class(fib_runs: Arc<AtomicUsize>, square_runs: Arc<AtomicUsize>) -> Result<Class<(), i64>, MemoError> {
    let class = Class::new("Demo");

    class.define("fib", Signature::new().required("n"), move |this, args| {
        fib_runs.fetch_add(1, Ordering::Relaxed);
        let n = args.int(0).unwrap_or_default();
        if n < 2 {
            return Ok(n);
        }
        let a = this.send("fib", CallArgs::positional([n - 1]))?;
        let b = this.send("fib", CallArgs::positional([n - 2]))?;
        Ok(a + b)
    })?;

    class.define("square", Signature::new().required("n"), move |_, args| {
        square_runs.fetch_add(1, Ordering::Relaxed);
        let n = args
            .int(0)
            .ok_or_else(|| MemoError::failed("square", "expected an integer"))?;
        Ok(n * n)
    })?;

    class.memoize_all(&["fib", "square"])?;
    Ok(class)
}

/// Build the demo class, run the walkthrough and collect the results.
pub fn demo_report(fib_n: i64, config: MemoConfig) -> Result<DemoReport, MemoError> {
    let fib_n = fib_n.clamp(0, MAX_FIB);
    let fib_runs = Arc::new(AtomicUsize::new(0));
    let square_runs = Arc::new(AtomicUsize::new(0));
    let class = demo_class(Arc::clone(&fib_runs), Arc::clone(&square_runs))?;
    let obj = class.instantiate_with((), config);

    let fib_value = obj.call("fib", CallArgs::positional([fib_n]))?;

    let two = || CallArgs::positional([2i64]);
    let three = || CallArgs::positional([3i64]);
    obj.call("square", two())?;
    obj.call("square", two())?;
    obj.call("square", three())?;
    obj.reset(ResetTarget::Entry("square", two()))?;
    obj.call("square", two())?;
    obj.call("square", three())?;

    obj.preset("square", CallArgs::positional([7i64]), || -1)?;
    let preset_value = obj.call("square", CallArgs::positional([7i64]))?;

    Ok(DemoReport {
        fib_n,
        fib_value,
        fib_body_runs: fib_runs.load(Ordering::Relaxed),
        square_body_runs: square_runs.load(Ordering::Relaxed),
        preset_value,
        stats: obj.stats(),
    })
}

/// Run the demo and print the report. Returns the process exit code.
pub fn run_demo(fib_n: i64, config: MemoConfig, json: bool) -> i32 {
    let report = match demo_report(fib_n, config) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Demo failed: {}", e);
            return 1;
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Failed to encode report: {}", e);
                return 1;
            }
        }
        return 0;
    }

    println!("fib({}) = {}", report.fib_n, report.fib_value);
    println!("  body runs: {} (one per distinct n)", report.fib_body_runs);
    println!("square: 2, 2, 3, reset(2), 2, 3");
    println!("  body runs: {}", report.square_body_runs);
    println!("square(7) after preset: {}", report.preset_value);
    println!(
        "cache: {} entries, {} hits, {} misses, {} presets, {} resets (hit ratio {:.2})",
        report.stats.entries,
        report.stats.hits,
        report.stats.misses,
        report.stats.presets,
        report.stats.resets,
        report.stats.hit_ratio()
    );
    0
}
