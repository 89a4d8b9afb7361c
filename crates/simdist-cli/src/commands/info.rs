//! Dispatch information command.

use anyhow::Result;
use comfy_table::Cell;
use serde::Serialize;
use simdist_core::dispatch::{self, Tier};
use simdist_core::{Family, Operation};

use crate::OutputFormat;
use crate::output::{self, Column, Format};

/// Selected implementation of one operation.
#[derive(Serialize)]
struct Selection {
    operation: Operation,
    family: Family,
    tier: Tier,
}

/// Everything `info` reports.
#[derive(Serialize)]
struct InfoOutput {
    version: &'static str,
    arch: &'static str,
    detected: Vec<Tier>,
    best: Tier,
    selected: Vec<Selection>,
}

fn collect() -> InfoOutput {
    let detected = dispatch::detect();
    let selected = dispatch::report()
        .into_iter()
        .map(|(operation, tier)| Selection {
            operation,
            family: operation.family(),
            tier,
        })
        .collect();
    InfoOutput {
        version: env!("CARGO_PKG_VERSION"),
        arch: std::env::consts::ARCH,
        detected: detected.iter().collect(),
        best: detected.best(),
        selected,
    }
}

/// Run the info command.
pub fn run(format: OutputFormat, quiet: bool) -> Result<()> {
    let info = collect();

    match Format::from(format) {
        Format::Json => output::print_json(&info, quiet)?,
        Format::Table => {
            let detected = info
                .detected
                .iter()
                .map(|t| t.name())
                .collect::<Vec<_>>()
                .join(", ");
            let items = vec![
                ("Version", info.version.to_string()),
                ("Architecture", info.arch.to_string()),
                ("Detected tiers", detected),
                ("Best tier", info.best.to_string()),
            ];
            output::print_key_value_table(&items, quiet);

            let columns = [
                Column::text("Operation"),
                Column::text("Family"),
                Column::text("Tier"),
                Column::text("Class"),
            ];
            let rows = info.selected.iter().map(|s| {
                vec![
                    Cell::new(s.operation.name()),
                    Cell::new(s.family.name()),
                    output::tier_cell(s.tier),
                    Cell::new(s.tier.class()),
                ]
            });
            output::print_table(&columns, rows, quiet);
        }
    }

    Ok(())
}
