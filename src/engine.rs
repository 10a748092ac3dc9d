//! PollEngine - the endless fetch-and-persist loop
//!
//! Batches run strictly sequentially: fetch, save, report, pause. A failed
//! iteration reports and backs off longer, then the loop continues; the
//! only exit is the shutdown signal.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eyre::Result;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::batch::fetch_batch;
use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::writer::ResultWriter;

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollStatus {
    Running,
    Stopped,
}

/// Summary of one completed batch
#[derive(Debug)]
pub struct BatchOutcome {
    /// Batch sequence number, starting at 1
    pub batch: u64,

    /// Records fetched (always the configured count)
    pub total: usize,

    /// Records without an `error` field
    pub succeeded: usize,

    /// Wall-clock time spent fetching and saving
    pub elapsed: Duration,

    /// File the batch ended up in (the overflow file when rotation split it)
    pub file: PathBuf,
}

/// Drives batches of fetches into the result files until shut down
pub struct PollEngine {
    config: Config,
    fetcher: Fetcher,
    writer: ResultWriter,
    batch_num: u64,
    status: PollStatus,
}

impl PollEngine {
    /// Create an engine from validated configuration
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = Fetcher::new(config.endpoint.timeout())?;
        let writer = ResultWriter::new(config.storage.dir.clone(), config.storage.base.clone());

        Ok(Self {
            config,
            fetcher,
            writer,
            batch_num: 0,
            status: PollStatus::Running,
        })
    }

    /// Run batches until the shutdown channel fires.
    ///
    /// The signal is observed while a batch is in flight (the batch is
    /// dropped at its next suspension point) and during the inter-batch
    /// pause. Interruption is a clean exit, not an error.
    pub async fn run(&mut self, mut shutdown_rx: mpsc::Receiver<()>) -> Result<()> {
        info!(
            url = %self.config.endpoint.url,
            count = self.config.batch.count,
            concurrency = self.config.batch.concurrency,
            "poll engine starting"
        );

        while self.status == PollStatus::Running {
            // The counter advances on error iterations too
            self.batch_num += 1;

            let outcome = tokio::select! {
                result = self.run_batch(self.batch_num) => Some(result),
                _ = shutdown_rx.recv() => None,
            };

            let delay = match outcome {
                Some(Ok(outcome)) => {
                    println!(
                        "Batch {} done in {:.2}s: {}/{} ok, saved to {}",
                        outcome.batch,
                        outcome.elapsed.as_secs_f64(),
                        outcome.succeeded,
                        outcome.total,
                        outcome.file.display()
                    );
                    info!(
                        batch = outcome.batch,
                        succeeded = outcome.succeeded,
                        total = outcome.total,
                        elapsed_ms = outcome.elapsed.as_millis() as u64,
                        file = %outcome.file.display(),
                        "batch complete"
                    );
                    self.config.pacing.batch_delay()
                }
                Some(Err(e)) => {
                    println!("Batch {} failed: {e:#}", self.batch_num);
                    error!(batch = self.batch_num, error = %e, "batch failed");
                    self.config.pacing.error_delay()
                }
                None => {
                    self.status = PollStatus::Stopped;
                    break;
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown_rx.recv() => {
                    self.status = PollStatus::Stopped;
                }
            }
        }

        info!(batches = self.batch_num, "poll engine stopped");
        Ok(())
    }

    /// Execute one fetch-and-persist iteration
    async fn run_batch(&self, batch: u64) -> Result<BatchOutcome> {
        let started = Instant::now();

        let records = fetch_batch(
            &self.fetcher,
            &self.config.endpoint.url,
            self.config.batch.count,
            self.config.batch.concurrency,
        )
        .await;

        let succeeded = records.iter().filter(|r| !r.is_error()).count();
        let file = self.writer.save(&records).await?;

        Ok(BatchOutcome {
            batch,
            total: records.len(),
            succeeded,
            elapsed: started.elapsed(),
            file,
        })
    }

    /// Number of batches started so far
    pub fn batches_run(&self) -> u64 {
        self.batch_num
    }

    /// Current lifecycle state
    pub fn status(&self) -> PollStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::time::timeout;

    fn test_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        // Nothing listens on port 1, so every fetch fails fast
        config.endpoint.url = "http://127.0.0.1:1/".to_string();
        config.endpoint.timeout_ms = 2_000;
        config.batch.count = 3;
        config.batch.concurrency = 2;
        config.storage.dir = dir.to_path_buf();
        config.pacing.batch_delay_ms = 10;
        config.pacing.error_delay_ms = 10;
        config
    }

    #[tokio::test]
    async fn test_run_batch_persists_error_records() {
        let temp = tempdir().unwrap();
        let engine = PollEngine::new(test_config(temp.path())).unwrap();

        let outcome = engine.run_batch(1).await.unwrap();

        assert_eq!(outcome.batch, 1);
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.succeeded, 0);
        assert_eq!(outcome.file, temp.path().join("res.txt"));

        let content = std::fs::read_to_string(&outcome.file).unwrap();
        assert_eq!(content.lines().count(), 3);
    }

    #[tokio::test]
    async fn test_pending_shutdown_stops_the_loop() {
        let temp = tempdir().unwrap();
        let mut engine = PollEngine::new(test_config(temp.path())).unwrap();

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        shutdown_tx.send(()).await.unwrap();

        timeout(Duration::from_secs(10), engine.run(shutdown_rx))
            .await
            .expect("engine should stop promptly")
            .unwrap();

        assert_eq!(engine.status(), PollStatus::Stopped);
    }

    #[tokio::test]
    async fn test_batch_counter_advances_past_failed_iterations() {
        let temp = tempdir().unwrap();

        // Point storage at a file so every save fails
        let blocker = temp.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();

        let mut config = test_config(temp.path());
        config.storage.dir = blocker;
        config.pacing.error_delay_ms = 5_000;

        let mut engine = PollEngine::new(config).unwrap();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        {
            let run = engine.run(shutdown_rx);
            tokio::pin!(run);

            // Let the first batch fail and the engine settle into the error
            // pause, then interrupt it
            tokio::select! {
                _ = run.as_mut() => panic!("engine should not finish on its own"),
                _ = tokio::time::sleep(Duration::from_secs(2)) => {}
            }
            shutdown_tx.send(()).await.unwrap();

            timeout(Duration::from_secs(10), run)
                .await
                .expect("engine should stop promptly")
                .unwrap();
        }

        assert_eq!(engine.status(), PollStatus::Stopped);
        assert_eq!(engine.batches_run(), 1);
    }
}
