//! Quick per-tier timing of the dense kernels.

use std::hint::black_box;
use std::time::Instant;

use anyhow::{Result, ensure};
use comfy_table::Cell;
use serde::Serialize;
use simdist_core::dispatch::{self, Capabilities, Kernel, Tier};
use simdist_core::{Operation, PairKernel};

use crate::OutputFormat;
use crate::output::{self, Column, Format};

const OPERATIONS: [Operation; 3] = [Operation::F32Dot, Operation::F32Cosine, Operation::F32Sl2];

/// Timing of one kernel on one tier.
#[derive(Serialize)]
struct Timing {
    operation: Operation,
    tier: Tier,
    ns_per_call: f64,
    speedup: f64,
}

/// Deterministic pseudo-random vector in `[-1, 1)`.
fn vector(seed: u64, n: usize) -> Vec<f32> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 40) as f32 / (1u64 << 24) as f32 * 2.0 - 1.0
        })
        .collect()
}

fn time(kernel: PairKernel<f32>, a: &[f32], b: &[f32], iters: u32) -> f64 {
    let start = Instant::now();
    for _ in 0..iters {
        black_box(kernel(black_box(a), black_box(b)));
    }
    start.elapsed().as_nanos() as f64 / f64::from(iters)
}

fn measure(dims: usize, iters: u32) -> Vec<Timing> {
    let a = vector(1, dims);
    let b = vector(2, dims);
    let detected = dispatch::detect();
    let mut timings = Vec::new();

    for op in OPERATIONS {
        let mut baseline = None;
        let mut seen = Vec::new();
        for tier in detected.iter() {
            let selected = dispatch::select(op, Capabilities::from_tiers([tier]));
            // A tier without its own kernel falls back to one already timed.
            if seen.contains(&selected.tier) {
                continue;
            }
            seen.push(selected.tier);
            let Kernel::F32Pair(kernel) = selected.kernel else {
                continue;
            };
            let ns = time(kernel, &a, &b, iters);
            let base = *baseline.get_or_insert(ns);
            tracing::debug!(operation = %op, tier = %selected.tier, ns, "timed kernel");
            timings.push(Timing {
                operation: op,
                tier: selected.tier,
                ns_per_call: ns,
                speedup: base / ns,
            });
        }
    }
    timings
}

/// Run the bench command.
pub fn run(dims: usize, iters: u32, format: OutputFormat, quiet: bool) -> Result<()> {
    ensure!(iters > 0, "--iters must be positive");
    let timings = measure(dims, iters);

    match Format::from(format) {
        Format::Json => output::print_json(&timings, quiet)?,
        Format::Table => {
            let columns = [
                Column::text("Operation"),
                Column::text("Tier"),
                Column::numeric("ns/call"),
                Column::numeric("Speedup"),
            ];
            let rows = timings.iter().map(|t| {
                vec![
                    Cell::new(t.operation.name()),
                    output::tier_cell(t.tier),
                    Cell::new(format!("{:.1}", t.ns_per_call)),
                    Cell::new(format!("{:.2}x", t.speedup)),
                ]
            });
            output::print_table(&columns, rows, quiet);
        }
    }

    Ok(())
}
