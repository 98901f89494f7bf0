use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use storyjobs::errors::JobError;
use storyjobs::exec::{EngineCommand, ExecutorBackend, JobOutcome};

/// A fake executor that:
/// - records every command it was asked to run
/// - answers with the outcome produced by `respond` (default: the joined argv)
/// - optionally sleeps to keep jobs `Running` for a while
/// - tracks the highest number of commands in flight at once
#[derive(Clone)]
pub struct FakeExecutor {
    executed: Arc<Mutex<Vec<EngineCommand>>>,
    respond: Arc<dyn Fn(&EngineCommand) -> JobOutcome + Send + Sync>,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self {
            executed: Arc::new(Mutex::new(Vec::new())),
            respond: Arc::new(|cmd: &EngineCommand| -> JobOutcome { Ok(cmd.args.join(" ")) }),
            delay: Duration::ZERO,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn responding<F>(mut self, f: F) -> Self
    where
        F: Fn(&EngineCommand) -> JobOutcome + Send + Sync + 'static,
    {
        self.respond = Arc::new(f);
        self
    }

    /// Every command fails as if the engine exited with `exit_code`.
    pub fn failing(self, exit_code: i32, output: &str) -> Self {
        let output = output.to_string();
        self.responding(move |_| {
            Err(JobError::ProcessFailed {
                exit_code,
                output: output.clone(),
            })
        })
    }

    pub fn executed(&self) -> Vec<EngineCommand> {
        self.executed.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for FakeExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutorBackend for FakeExecutor {
    fn execute(
        &self,
        command: EngineCommand,
    ) -> Pin<Box<dyn Future<Output = JobOutcome> + Send + '_>> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            self.executed.lock().unwrap().push(command.clone());
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            let outcome = (self.respond)(&command);

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        })
    }
}
