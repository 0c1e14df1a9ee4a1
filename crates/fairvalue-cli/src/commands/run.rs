use std::sync::Arc;

use fairvalue::{
    AlphaVantageProvider, FairValuePipeline, ParquetStore, PipelineError, PipelineInput,
    PipelineOutput,
};
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::cli::RunArgs;
use crate::config::AppConfig;
use crate::error::CliError;

pub(crate) async fn run(args: &RunArgs, config: &AppConfig) -> Result<(), CliError> {
    info!(
        output_dir = %config.output_dir.display(),
        log_level = %config.log_level,
        tickers = args.tickers.len(),
        "Configuration loaded"
    );
    if config.uses_mock_api() {
        warn!(base_url = %config.base_url, "Using mock API server");
    } else {
        info!(base_url = %config.base_url, "Using live Alpha Vantage API");
    }

    let pipeline = FairValuePipeline::with_alpha_vantage(
        AlphaVantageProvider::new(config.api_key.as_str()).with_base_url(config.base_url.as_str()),
        Arc::new(ParquetStore::new(config.output_dir.clone())),
    );

    let inputs = inputs_from_args(args);
    let results = join_all(inputs.iter().map(|input| pipeline.run(input))).await;

    let mut failed = 0;
    for (input, result) in inputs.iter().zip(&results) {
        if let Err(e) = result {
            failed += 1;
            error!(symbol = %input.symbol, stage = %e.stage, error = %e.source, "Pipeline failed");
        }
        print!("{}", report(input, result));
    }

    if failed > 0 {
        return Err(CliError::RunsFailed {
            failed,
            total: inputs.len(),
        });
    }
    Ok(())
}

/// One pipeline input per distinct ticker, in argument order.
fn inputs_from_args(args: &RunArgs) -> Vec<PipelineInput> {
    let mut inputs: Vec<PipelineInput> = Vec::with_capacity(args.tickers.len());
    for ticker in &args.tickers {
        let mut input = PipelineInput::new(ticker.as_str());
        if inputs.iter().any(|i| i.symbol == input.symbol) {
            continue;
        }
        input.start_date = args.start.clone();
        input.end_date = args.end.clone();
        inputs.push(input);
    }
    inputs
}

fn report(input: &PipelineInput, result: &Result<PipelineOutput, PipelineError>) -> String {
    let mut out = format!("{}\n", input.symbol);
    match result {
        Ok(output) => {
            for line in &output.logs {
                out.push_str(&format!("  {line}\n"));
            }
            out.push_str(&format!(
                "  {} daily prices written to {}\n",
                output.record_count,
                output.file_path.display()
            ));
        }
        Err(e) => out.push_str(&format!("  error: {e}\n")),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fairvalue::{DataError, PipelineStage};
    use std::path::PathBuf;

    fn args(tickers: &[&str]) -> RunArgs {
        RunArgs {
            tickers: tickers.iter().map(|t| t.to_string()).collect(),
            start: Some("2015-01-01".to_string()),
            end: None,
            output_dir: PathBuf::from("."),
            mock_api: true,
            config: None,
        }
    }

    #[test]
    fn test_inputs_dedupe_symbols() {
        let inputs = inputs_from_args(&args(&["aapl", "MSFT", "AAPL"]));
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].symbol.as_str(), "AAPL");
        assert_eq!(inputs[1].symbol.as_str(), "MSFT");
        assert_eq!(inputs[1].start_date.as_deref(), Some("2015-01-01"));
        assert!(inputs[1].end_date.is_none());
    }

    #[test]
    fn test_report_success() {
        let input = PipelineInput::new("IBM");
        let output = PipelineOutput {
            record_count: 2,
            file_path: PathBuf::from("/tmp/IBM.parquet"),
            combined: Vec::new(),
            logs: vec!["Successfully wrote 3 combined records to Parquet file".to_string()],
        };

        let text = report(&input, &Ok(output));
        assert_eq!(
            text,
            "IBM\n  Successfully wrote 3 combined records to Parquet file\n  2 daily prices written to /tmp/IBM.parquet\n"
        );
    }

    #[test]
    fn test_report_failure() {
        let input = PipelineInput::new("IBM");
        let err = PipelineError {
            stage: PipelineStage::FetchEarnings,
            source: DataError::Network("timeout".to_string()),
        };

        let text = report(&input, &Err(err));
        assert!(text.starts_with("IBM\n  error: annual earnings fetch failed"));
        assert!(text.contains("timeout"));
    }
}
