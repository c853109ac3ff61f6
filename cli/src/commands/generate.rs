use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use clap::Args;
use config::{ConfigLayer, PipelineLayer};
use indicatif::{ProgressBar, ProgressStyle};
use pipeline::ReportRequest;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::runtime::{load_config, report_service};
use crate::output;

const DEFAULT_LOOKBACK_DAYS: u64 = 90;

#[derive(Args)]
pub struct GenerateArgs {
    #[arg(long, help = "Member identifier of the technician")]
    pub member: String,

    #[arg(long, help = "First day of the range (YYYY-MM-DD), defaults to 90 days ago")]
    pub start: Option<NaiveDate>,

    #[arg(long, help = "Last day of the range (YYYY-MM-DD), defaults to today")]
    pub end: Option<NaiveDate>,

    #[arg(long, help = "Name used in the report, defaults to the member identifier")]
    pub name: Option<String>,

    #[arg(long, help = "Provider as provider or provider:model")]
    pub provider: Option<String>,

    #[arg(long, short, default_value = "quarterly_summary.md", help = "File to write")]
    pub output: PathBuf,

    #[arg(long, help = "Parallel detail fetches")]
    pub concurrency: Option<usize>,

    #[arg(long, help = "Stop fetching details after this many seconds")]
    pub deadline: Option<u64>
}

impl GenerateArgs {
    /// Flag values as a configuration layer above file and env.
    fn overrides(&self) -> Option<ConfigLayer> {
        let layer = ConfigLayer {
            pipeline: PipelineLayer {
                concurrency_limit: self.concurrency,
                deadline_seconds: self.deadline
            },
            ..Default::default()
        };
        (!layer.is_empty()).then_some(layer)
    }
}

fn resolve_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate
) -> (NaiveDate, NaiveDate) {
    let end = end.unwrap_or(today);
    let start = start.unwrap_or_else(|| {
        today
            .checked_sub_days(Days::new(DEFAULT_LOOKBACK_DAYS))
            .unwrap_or(today)
    });
    (start, end)
}

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

pub async fn run(config_path: Option<&Path>, args: GenerateArgs) -> Result<()> {
    let config = load_config(config_path, args.overrides())?;
    let service = report_service(&config)?;

    let (start, end) = resolve_range(args.start, args.end, Local::now().date_naive());
    let mut request = ReportRequest::new(&args.member, start.to_string(), end.to_string());
    if let Some(name) = &args.name {
        request = request.with_technician_name(name);
    }
    if let Some(provider) = &args.provider {
        request = request.with_provider(provider);
    }

    output::info(&format!(
        "Fetching tickets for {} from {start} to {end}",
        args.member
    ));
    let bar = spinner("Fetching ticket details and generating report");
    let result = service.generate(&request).await;
    bar.finish_and_clear();
    let report = result?;

    if let Some(msg) = output::dropped_tickets(report.processed_count, report.ticket_count) {
        output::warn(&msg);
    }

    println!("{}", report.report);

    std::fs::write(&args.output, &report.report)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    output::success(&format!(
        "Report for {} tickets written to {}",
        report.processed_count,
        args.output.display()
    ));

    Ok(())
}
