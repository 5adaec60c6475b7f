use std::process::ExitCode;

use clap::Parser;
use kube_event_audit::{
    run, shutdown_signal, source, Auditor, Cli, EventSource, Exit, FileEventSource,
    KubeEventSource, Reporter, Settings,
};
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match audit(cli).await {
        Ok(exit) => exit.into(),
        Err(err) => {
            error!("{err:#}");
            Exit::ConfigError.into()
        }
    }
}

async fn audit(cli: Cli) -> anyhow::Result<Exit> {
    let settings = Settings::load(&cli)?;

    match &settings.events_file {
        Some(path) => {
            let source = FileEventSource::load(path)?;
            execute(source, &settings).await
        }
        None => {
            let client = source::connect(settings.context.as_deref()).await?;
            execute(KubeEventSource::new(client), &settings).await
        }
    }
}

async fn execute<S: EventSource>(source: S, settings: &Settings) -> anyhow::Result<Exit> {
    let reporter = Reporter::stdout(settings.output);
    let mut auditor = Auditor::new(source, settings.lookback_minutes, reporter);
    let exit = run(&mut auditor, settings.mode, shutdown_signal()).await?;
    tracing::debug!(?exit, mode = ?settings.mode, "finished");
    Ok(exit)
}

fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(cli.verbose >= 2),
        )
        .init();
}
