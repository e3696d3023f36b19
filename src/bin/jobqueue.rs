//! jobqueue CLI: drive a coalescing queue from the command line.

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use jobqueue::config::Config;
use jobqueue::telemetry::{TelemetryConfig, init_telemetry};
use jobqueue::{Error, JobQueue, QueueRequest};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[derive(Parser)]
#[command(name = "jobqueue", about = "Coalescing execution queue")]
struct Cli {
    /// Simulated work duration in milliseconds
    #[arg(long, global = true, default_value_t = 20)]
    work_ms: u64,
    /// Make every Nth execution fail
    #[arg(long, global = true)]
    fail_every: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Feed scripted bursts of requests and print the resulting stats
    Demo {
        /// Bursts separated by ';', request IDs within a burst by ','
        #[arg(long, default_value = "1;2,3,4;5")]
        bursts: String,
        /// Pause between bursts in milliseconds
        #[arg(long, default_value_t = 50)]
        gap_ms: u64,
    },
    /// Enqueue one request per stdin line until EOF or Ctrl-C
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let _guard = init_telemetry(TelemetryConfig {
        endpoint: config.otel_endpoint.clone(),
        service_name: "jobqueue".to_string(),
        log_level: config.log_level.clone(),
    })?;

    let lifecycle = CancellationToken::new();
    let queue = JobQueue::with_config(
        simulated_work(cli.work_ms, cli.fail_every),
        lifecycle.clone(),
        config.queue_config(),
    );

    let ctrl = lifecycle.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        ctrl.cancel();
    });

    match cli.command {
        Command::Demo { bursts, gap_ms } => cmd_demo(&queue, &bursts, gap_ms, cli.work_ms).await?,
        Command::Run => cmd_run(&queue, &lifecycle).await?,
    }

    queue.shutdown().await;
    println!("{}", serde_json::to_string_pretty(&queue.stats())?);
    Ok(())
}

type WorkFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// Work function that sleeps, failing on every `fail_every`th call.
fn simulated_work(
    work_ms: u64,
    fail_every: Option<u64>,
) -> impl Fn() -> WorkFuture + Send + Sync + 'static {
    let calls = Arc::new(AtomicU64::new(0));
    move || {
        let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
        let work: WorkFuture = Box::pin(async move {
            tokio::time::sleep(Duration::from_millis(work_ms)).await;
            match fail_every {
                Some(n) if n > 0 && call % n == 0 => {
                    anyhow::bail!("simulated failure on call {call}")
                }
                _ => Ok(()),
            }
        });
        work
    }
}

async fn cmd_demo(queue: &JobQueue, bursts: &str, gap_ms: u64, work_ms: u64) -> anyhow::Result<()> {
    for burst in parse_bursts(bursts) {
        info!(requests = ?burst, "submitting burst");
        for id in burst {
            queue.add_queue_request(QueueRequest::new(id)).await?;
        }
        tokio::time::sleep(Duration::from_millis(gap_ms)).await;
    }

    // Let the final run finish before shutting down.
    tokio::time::sleep(Duration::from_millis(work_ms)).await;
    Ok(())
}

async fn cmd_run(queue: &JobQueue, lifecycle: &CancellationToken) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            _ = lifecycle.cancelled() => break,
            line = lines.next_line() => line.context("failed to read stdin")?,
        };
        let Some(line) = line else {
            break;
        };
        let id = line.trim();
        if id.is_empty() {
            continue;
        }
        match queue.add_queue_request(QueueRequest::new(id)).await {
            Ok(()) => {}
            Err(Error::QueueStopped) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

fn parse_bursts(script: &str) -> Vec<Vec<String>> {
    script
        .split(';')
        .map(|burst| {
            burst
                .split(',')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|burst| !burst.is_empty())
        .collect()
}
