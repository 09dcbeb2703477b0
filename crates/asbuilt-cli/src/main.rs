//! asbuilt-report CLI - As-built installation reports
//!
//! Reads a report request (JSON) from a file or stdin and writes the
//! workbook or PDF it names.

mod output;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use asbuilt_core::{Renderer, Report, ReportFormat, ReportRequest, Targets};
use asbuilt_render::{ExcelRenderer, PdfRenderer};

#[derive(Parser)]
#[command(name = "asbuilt-report")]
#[command(author, version, about = "As-built installation report generator", long_about = None)]
struct Cli {
    /// Report request JSON (stdin if not specified)
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output format; overrides the request and the output file extension
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Crane efficiency target, percent
    #[arg(long, value_name = "PCT", env = "ASBUILT_EFFICIENCY_TARGET", default_value_t = 85.0)]
    efficiency_target: f64,

    /// Phase completion target, percent
    #[arg(long, value_name = "PCT", env = "ASBUILT_COMPLETION_TARGET", default_value_t = 100.0)]
    completion_target: f64,

    /// Leave charts out of the workbook
    #[arg(long)]
    no_charts: bool,

    /// Start each phase on a new page (PDF)
    #[arg(long)]
    page_per_phase: bool,

    /// Also write the computed metrics as JSON
    #[arg(long, value_name = "FILE")]
    metrics: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Xlsx,
    Pdf,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Xlsx => ReportFormat::Xlsx,
            FormatArg::Pdf => ReportFormat::Pdf,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let request = read_request(cli.input.as_deref())?;
    let format = cli
        .format
        .map(ReportFormat::from)
        .unwrap_or_else(|| request.resolved_format());
    let output_path = request.output_path.clone();

    let report = Report::from_request(request).with_targets(Targets {
        crane_efficiency: cli.efficiency_target,
        completion: cli.completion_target,
    });
    tracing::info!(
        project = %report.project_name,
        phases = report.rendered_phases().count(),
        format = format.extension(),
        "rendering report"
    );

    let bytes = match format {
        ReportFormat::Xlsx => {
            let mut renderer = ExcelRenderer::new();
            if cli.no_charts {
                renderer = renderer.no_charts();
            }
            renderer.render(&report)
        }
        ReportFormat::Pdf => {
            let mut renderer = PdfRenderer::new();
            if cli.page_per_phase {
                renderer = renderer.page_per_phase();
            }
            renderer.render(&report)
        }
    }
    .with_context(|| format!("Failed to render {} report", format.extension()))?;

    match &cli.metrics {
        Some(path) => {
            let json = serde_json::to_vec_pretty(&report.metrics).context("Failed to serialize metrics")?;
            // The report goes last so it only appears alongside its metrics
            output::write_all_atomic(&[(path.as_path(), json.as_slice()), (output_path.as_path(), bytes.as_slice())])
                .with_context(|| format!("Failed to write {} and {}", path.display(), output_path.display()))?;
        }
        None => output::write_atomic(&output_path, &bytes)
            .with_context(|| format!("Failed to write {}", output_path.display()))?,
    }

    println!("Report written: {}", output_path.display());
    Ok(())
}

/// Log to stderr; `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn read_request(input: Option<&Path>) -> Result<ReportRequest> {
    match input {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
            ReportRequest::from_reader(BufReader::new(file))
                .with_context(|| format!("Invalid report request in {}", path.display()))
        }
        None => ReportRequest::from_reader(io::stdin().lock()).context("Invalid report request on stdin"),
    }
}
