//! Analyze a local file and print the result as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use analytica::analysis::TableAnalyzer;
use analytica::config::AnalysisRequest;
use analytica::logging::setup::{init_logging, LoggingConfig};
use analytica::sources::TableLoader;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV, TSV, Parquet or Excel file to analyze
    file: PathBuf,

    /// Number of leading rows included in the preview
    #[arg(default_value_t = 20)]
    max_preview_rows: usize,

    /// Maximum number of columns in the correlation matrix
    #[arg(default_value_t = 20)]
    max_corr_cols: usize,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Args {
    /// The file name the upload is identified by.
    fn filename(&self) -> String {
        self.file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.file.display().to_string())
    }

    fn request(&self) -> AnalysisRequest {
        AnalysisRequest::new(self.filename())
            .with_max_preview_rows(self.max_preview_rows)
            .with_max_corr_cols(self.max_corr_cols)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let logging = LoggingConfig::default().with_json_format(args.json_logs);
    if let Err(e) = init_logging(logging) {
        eprintln!("logging disabled: {e}");
    }

    let bytes = std::fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let table = TableLoader::new().load_from_upload(&args.filename(), &bytes)?;
    if table.num_rows() == 0 {
        warn!(file = %args.file.display(), "Upload has no data rows");
    }

    let result = TableAnalyzer::builder().build()?.analyze(&table, &args.request())?;
    println!("{}", result.to_json_pretty()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["analytica", "data/sales.csv"]).unwrap();
        let request = args.request();
        assert_eq!(request.filename, "sales.csv");
        assert_eq!(request.max_preview_rows, 20);
        assert_eq!(request.max_corr_cols, 20);
        assert!(!args.json_logs);
    }

    #[test]
    fn test_positional_limits() {
        let args = Args::try_parse_from(["analytica", "a.parquet", "5", "3", "--json-logs"]).unwrap();
        let request = args.request();
        assert_eq!(request.max_preview_rows, 5);
        assert_eq!(request.max_corr_cols, 3);
        assert!(args.json_logs);
    }

    #[test]
    fn test_rejects_negative_limit() {
        assert!(Args::try_parse_from(["analytica", "a.csv", "-1"]).is_err());
        assert!(Args::try_parse_from(["analytica"]).is_err());
    }
}
