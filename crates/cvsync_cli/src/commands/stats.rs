use std::sync::Arc;

use clap::ValueEnum;
use cvsync::{Store, TableCount, db};
use serde::Serialize;
use tabled::Tabled;

/// Output format for table statistics.
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Display as a formatted table (default)
    #[default]
    Table,
    /// Display as JSON
    Json,
}

#[derive(Debug, Serialize, Tabled)]
struct CountRow {
    #[tabled(rename = "Table")]
    table: &'static str,
    #[tabled(rename = "Rows")]
    rows: u64,
}

/// Print row counts for every synchronized table.
pub(crate) async fn handle_stats(
    output: OutputFormat,
    database_url: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = db::connect(database_url).await?;
    let counts = Store::new(Arc::new(db)).table_counts().await?;
    print_counts(&counts, output)?;
    Ok(())
}

fn print_counts(counts: &[TableCount], output: OutputFormat) -> Result<(), serde_json::Error> {
    match output {
        OutputFormat::Table => {
            let total: u64 = counts.iter().map(|c| c.rows).sum();
            let rows = counts
                .iter()
                .map(|c| CountRow {
                    table: c.table,
                    rows: c.rows,
                })
                .chain(std::iter::once(CountRow {
                    table: "TOTAL",
                    rows: total,
                }));
            let mut table = tabled::Table::new(rows);
            table.with(tabled::settings::Style::rounded());
            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(counts)?);
        }
    }
    Ok(())
}
