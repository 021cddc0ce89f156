//! sieve: generate tasks, process them on a worker pool, report fresh vs stale.

mod cli;
mod sink;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use sieve_core::Pipeline;
use sieve_core::impls::{NoFault, OddNanosecondFault};
use sieve_core::ports::ResultSink;

use crate::cli::{Cli, CliError, FaultMode, OutputFormat};
use crate::sink::{JsonSink, TextSink};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("sieve: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.to_config()?;

    let mut builder = Pipeline::builder().config(config);
    builder = match cli.fault {
        FaultMode::Random => builder,
        FaultMode::OddNanosecond => builder.fault_injector(Arc::new(OddNanosecondFault)),
        FaultMode::Never => builder.fault_injector(Arc::new(NoFault)),
    };
    let pipeline = builder.build()?;
    if pipeline.config().termination.is_manual() {
        tracing::info!("running until interrupted (Ctrl-C)");
    }

    let handle = pipeline.start();

    // Ctrl-C はどの停止条件でも早期終了として扱う。drain はいつも通り行う。
    let stopper = handle.stopper();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            stopper.stop();
        }
    });

    let result = handle.wait().await;
    interrupt.abort();
    let report = result?;

    let mut sink: Box<dyn ResultSink> = match cli.output {
        OutputFormat::Text => Box::new(TextSink::new(io::stdout())),
        OutputFormat::Json => Box::new(JsonSink::new(io::stdout())),
    };
    sink.deliver(&report).await?;
    Ok(())
}

/// Initialise tracing subscriber with stderr output.
///
/// When `verbose` is true, sets filter to `debug`. Otherwise, respects
/// `RUST_LOG` environment variable (defaulting to `info`).
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
