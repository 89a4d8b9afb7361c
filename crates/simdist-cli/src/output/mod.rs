//! Output formatting for CLI commands.

use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table, presets};
use serde::Serialize;
use simdist_core::dispatch::Tier;

/// Output format selection.
#[derive(Clone, Copy)]
pub enum Format {
    Table,
    Json,
}

impl From<crate::OutputFormat> for Format {
    fn from(f: crate::OutputFormat) -> Self {
        match f {
            crate::OutputFormat::Table => Format::Table,
            crate::OutputFormat::Json => Format::Json,
        }
    }
}

/// Print data as pretty JSON.
pub fn print_json<T: Serialize>(data: &T, quiet: bool) -> anyhow::Result<()> {
    if !quiet {
        println!("{}", serde_json::to_string_pretty(data)?);
    }
    Ok(())
}

/// A column of a results table.
#[derive(Clone, Copy)]
pub struct Column {
    header: &'static str,
    numeric: bool,
}

impl Column {
    /// A left-aligned text column.
    pub const fn text(header: &'static str) -> Self {
        Self {
            header,
            numeric: false,
        }
    }

    /// A right-aligned numeric column.
    pub const fn numeric(header: &'static str) -> Self {
        Self {
            header,
            numeric: true,
        }
    }
}

/// Renders a tier name, highlighting anything above the scalar baseline.
pub fn tier_cell(tier: Tier) -> Cell {
    let cell = Cell::new(tier.name());
    if tier == Tier::Scalar {
        cell
    } else {
        cell.fg(Color::Green)
    }
}

fn render(columns: &[Column], rows: impl IntoIterator<Item = Vec<Cell>>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            columns
                .iter()
                .map(|c| Cell::new(c.header).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    for row in rows {
        table.add_row(row);
    }
    for (i, column) in columns.iter().enumerate() {
        if column.numeric
            && let Some(col) = table.column_mut(i)
        {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

/// Print rows under `columns` (respects quiet mode).
pub fn print_table(columns: &[Column], rows: impl IntoIterator<Item = Vec<Cell>>, quiet: bool) {
    if !quiet {
        println!("{}", render(columns, rows));
    }
}

/// Print a key-value table (for info displays).
pub fn print_key_value_table(items: &[(&str, String)], quiet: bool) {
    let rows = items
        .iter()
        .map(|(key, value)| vec![Cell::new(key).fg(Color::Green), Cell::new(value)]);
    print_table(&[Column::text("Property"), Column::text("Value")], rows, quiet);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_output_format() {
        assert!(matches!(Format::from(crate::OutputFormat::Json), Format::Json));
        assert!(matches!(Format::from(crate::OutputFormat::Table), Format::Table));
    }

    #[test]
    fn test_render_headers_and_rows() {
        let columns = [
            Column::text("Operation"),
            Column::text("Tier"),
            Column::numeric("ns/call"),
        ];
        let rows = vec![
            vec![Cell::new("f32_dot"), tier_cell(Tier::V3), Cell::new("12.5")],
            vec![Cell::new("binary_sl2"), tier_cell(Tier::Scalar), Cell::new("3.0")],
        ];
        let output = render(&columns, rows).to_string();
        for text in ["Operation", "ns/call", "f32_dot", "v3", "binary_sl2", "scalar", "12.5"] {
            assert!(output.contains(text), "missing {text}");
        }
    }

    #[test]
    fn test_numeric_columns_align_right() {
        let columns = [Column::text("Operation"), Column::numeric("Speedup")];
        let rows = vec![vec![Cell::new("f32_dot"), Cell::new("2x")]];
        let output = render(&columns, rows).to_string();
        assert!(output.contains("2x │"), "{output}");
        assert!(!output.contains(" 2x  "), "{output}");
    }

    #[test]
    fn test_tier_cell_text() {
        assert_eq!(tier_cell(Tier::V4).content(), "v4");
        assert_eq!(tier_cell(Tier::Scalar).content(), "scalar");
    }
}
