//! Task execution: runners and the executor that isolates their failures.

use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Mutex};
use std::time::{Duration, Instant};

use tracing::{error, info};

use exportq_core::{ExecutionError, JobId, TaskType};

use crate::config::DEFAULT_TASK_DURATION;

/// Performs the actual work of a job.
pub trait TaskRunner: Send + Sync {
    fn run(&self, job_id: &JobId, task_type: TaskType) -> Result<String, ExecutionError>;
}

impl<R: TaskRunner + ?Sized> TaskRunner for std::sync::Arc<R> {
    fn run(&self, job_id: &JobId, task_type: TaskType) -> Result<String, ExecutionError> {
        (**self).run(job_id, task_type)
    }
}

/// Handle used to interrupt a [`SimulatedExportRunner`] mid-wait.
#[derive(Debug, Clone)]
pub struct InterruptHandle {
    tx: mpsc::Sender<()>,
}

impl InterruptHandle {
    /// Interrupt the task currently waiting, if any.
    pub fn interrupt(&self) {
        let _ = self.tx.send(());
    }
}

/// Stand-in for real export logic: blocks the calling thread for a fixed
/// duration.
#[derive(Debug)]
pub struct SimulatedExportRunner {
    duration: Duration,
    tx: mpsc::Sender<()>,
    rx: Mutex<mpsc::Receiver<()>>,
}

impl SimulatedExportRunner {
    pub fn new(duration: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            duration,
            tx,
            rx: Mutex::new(rx),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle {
            tx: self.tx.clone(),
        }
    }
}

impl Default for SimulatedExportRunner {
    fn default() -> Self {
        Self::new(DEFAULT_TASK_DURATION)
    }
}

impl TaskRunner for SimulatedExportRunner {
    fn run(&self, job_id: &JobId, _task_type: TaskType) -> Result<String, ExecutionError> {
        let rx = self
            .rx
            .lock()
            .map_err(|_| ExecutionError::failed(job_id, "interrupt channel poisoned"))?;

        // Stale signals belong to tasks that already finished.
        while rx.try_recv().is_ok() {}

        info!(job_id = %job_id, duration_ms = self.duration.as_millis() as u64, "executing export task");

        match rx.recv_timeout(self.duration) {
            Err(mpsc::RecvTimeoutError::Timeout) => {
                Ok(format!("Export completed successfully for job: {job_id}"))
            }
            Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(ExecutionError::Interrupted {
                    job_id: job_id.clone(),
                })
            }
        }
    }
}

/// Runs tasks and converts runner faults into [`ExecutionError`]s.
///
/// A panicking runner is caught here so that one faulty task never takes
/// down the rest of the batch.
#[derive(Debug)]
pub struct TaskExecutor<R: TaskRunner> {
    runner: R,
}

impl<R: TaskRunner> TaskExecutor<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn execute(&self, job_id: &JobId, task_type: TaskType) -> Result<String, ExecutionError> {
        info!(job_id = %job_id, task_type = %task_type, "starting export task");
        let started = Instant::now();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.runner.run(job_id, task_type)))
            .unwrap_or_else(|payload| Err(ExecutionError::failed(job_id, panic_message(&*payload))));

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(result) => info!(job_id = %job_id, elapsed_ms, result = %result, "export task completed"),
            Err(ExecutionError::Interrupted { .. }) => {
                error!(job_id = %job_id, elapsed_ms, "export task interrupted")
            }
            Err(e) => error!(job_id = %job_id, elapsed_ms, error = %e, "export task execution failed"),
        }

        outcome
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    struct PanickingRunner;

    impl TaskRunner for PanickingRunner {
        fn run(&self, _job_id: &JobId, _task_type: TaskType) -> Result<String, ExecutionError> {
            panic!("disk full");
        }
    }

    #[test]
    fn simulated_runner_completes_after_duration() {
        let runner = SimulatedExportRunner::new(Duration::from_millis(20));
        let started = Instant::now();

        let result = runner.run(&JobId::new("J1"), TaskType::Export).unwrap();

        assert!(started.elapsed() >= Duration::from_millis(20));
        assert_eq!(result, "Export completed successfully for job: J1");
    }

    #[test]
    fn simulated_runner_can_be_interrupted() {
        let runner = Arc::new(SimulatedExportRunner::new(Duration::from_secs(30)));
        let handle = runner.interrupt_handle();

        let worker = {
            let runner = runner.clone();
            thread::spawn(move || runner.run(&JobId::new("J2"), TaskType::Export))
        };

        // Keep signalling until the wait observes one; an early signal is drained.
        while !worker.is_finished() {
            thread::sleep(Duration::from_millis(20));
            handle.interrupt();
        }

        let err = worker.join().unwrap().unwrap_err();
        assert_eq!(
            err,
            ExecutionError::Interrupted {
                job_id: JobId::new("J2")
            }
        );
    }

    #[test]
    fn stale_interrupts_are_discarded() {
        let runner = SimulatedExportRunner::new(Duration::from_millis(5));
        runner.interrupt_handle().interrupt();

        assert!(runner.run(&JobId::new("J3"), TaskType::Export).is_ok());
    }

    #[test]
    fn executor_converts_panics_into_failures() {
        let executor = TaskExecutor::new(PanickingRunner);

        let err = executor
            .execute(&JobId::new("J4"), TaskType::Export)
            .unwrap_err();

        assert_eq!(err, ExecutionError::failed(&JobId::new("J4"), "disk full"));
    }

    #[test]
    fn executor_returns_runner_result() {
        let executor = TaskExecutor::new(SimulatedExportRunner::new(Duration::ZERO));
        let result = executor.execute(&JobId::new("J5"), TaskType::Export).unwrap();
        assert!(result.contains("J5"));
    }
}
