use console::style;
use cvsync::{SyncOutcome, SyncSummary};
use tabled::Tabled;

use crate::commands::shared::build_engine;
use crate::config::Config;

pub(crate) async fn handle_run(
    config: &Config,
    database_url: &str,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let engine = build_engine(config, database_url, force).await?;

    match engine.run_full_sync().await? {
        SyncOutcome::Skipped { local_hour } => {
            println!(
                "Outside the operating window ({local_hour}h local). Use --force to run anyway."
            );
        }
        SyncOutcome::Completed(summary) => print_summary(&summary),
    }

    Ok(())
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Resource")]
    resource: &'static str,
    #[tabled(rename = "Fetched")]
    fetched: usize,
    #[tabled(rename = "Written")]
    written: usize,
    #[tabled(rename = "Pages")]
    pages: u32,
    #[tabled(rename = "Status")]
    status: String,
}

pub(crate) fn print_summary(summary: &SyncSummary) {
    let rows: Vec<SummaryRow> = summary
        .resources
        .iter()
        .map(|r| SummaryRow {
            resource: r.resource,
            fetched: r.stats.fetched,
            written: r.stats.written,
            pages: r.stats.pages,
            status: match (&r.error, r.stats.capped) {
                (Some(e), _) => format!("failed: {e}"),
                (None, true) => "cap reached".to_string(),
                (None, false) => "ok".to_string(),
            },
        })
        .collect();

    let mut table = tabled::Table::new(rows);
    table.with(tabled::settings::Style::rounded());
    println!("{table}");

    let degraded = summary.degraded().count();
    let headline = format!(
        "{} rows written in {:.1}s",
        summary.total_written(),
        summary.duration.as_secs_f64()
    );
    if degraded == 0 {
        println!("{}", style(headline).green());
    } else {
        println!(
            "{} ({degraded} secondary resource(s) incomplete)",
            style(headline).yellow()
        );
    }
}
