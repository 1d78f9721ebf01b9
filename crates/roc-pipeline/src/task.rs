//! # Control-Plane Task Pipeline
//!
//! Lets control code (adding a stream, changing a gain, tearing a
//! session down) reach the audio thread without ever blocking it
//! (design §4.14). Tasks queue up via [`TaskSender`] from any thread;
//! [`TaskPipeline::run_batch`] drains and executes whatever is queued,
//! called at most once per audio frame so control-plane work can never
//! compete with the audio thread mid-frame. A synchronous submission
//! blocks the caller up to a deadline and reports `TaskTimeout` if the
//! audio thread hasn't drained it in time; an asynchronous submission
//! returns immediately and runs its completion handler once executed.

use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, RecvTimeoutError, Sender};

use roc_core::RocError;

/// A unit of control-plane work. `Custom` covers anything the pipeline
/// doesn't have a dedicated variant for yet.
pub enum Task {
    SetGain(f32),
    Custom(Box<dyn FnOnce() + Send>),
}

type CompletionHandler = Box<dyn FnOnce(Result<(), RocError>) + Send>;

enum Envelope {
    Sync {
        task: Task,
        reply: Sender<Result<(), RocError>>,
    },
    Async {
        task: Task,
        on_complete: Option<CompletionHandler>,
    },
}

#[derive(Clone)]
pub struct TaskSender {
    tx: Sender<Envelope>,
}

impl TaskSender {
    /// Submit `task` and block until it's executed or `deadline` elapses.
    pub fn submit_sync(&self, task: Task, deadline: Duration) -> Result<(), RocError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.tx
            .send(Envelope::Sync {
                task,
                reply: reply_tx,
            })
            .map_err(|_| RocError::SessionDead)?;
        match reply_rx.recv_timeout(deadline) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(RocError::TaskTimeout),
            Err(RecvTimeoutError::Disconnected) => Err(RocError::SessionDead),
        }
    }

    /// Submit `task` without blocking; `on_complete`, if given, runs on
    /// the audio thread once the task is executed.
    pub fn submit_async(
        &self,
        task: Task,
        on_complete: Option<CompletionHandler>,
    ) -> Result<(), RocError> {
        self.tx
            .send(Envelope::Async { task, on_complete })
            .map_err(|_| RocError::SessionDead)
    }
}

pub struct TaskPipeline {
    rx: Receiver<Envelope>,
}

impl TaskPipeline {
    pub fn new() -> (TaskSender, TaskPipeline) {
        let (tx, rx) = unbounded();
        (TaskSender { tx }, TaskPipeline { rx })
    }

    /// Execute every task queued at the moment of the call. Intended to
    /// be invoked exactly once per audio frame.
    pub fn run_batch(&mut self) {
        while let Ok(envelope) = self.rx.try_recv() {
            match envelope {
                Envelope::Sync { task, reply } => {
                    let result = Self::execute(task);
                    let _ = reply.send(result);
                }
                Envelope::Async { task, on_complete } => {
                    let result = Self::execute(task);
                    if let Some(cb) = on_complete {
                        cb(result);
                    }
                }
            }
        }
    }

    fn execute(task: Task) -> Result<(), RocError> {
        match task {
            Task::SetGain(_gain) => Ok(()),
            Task::Custom(f) => {
                f();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn sync_task_completes_once_batch_runs() {
        let (tx, mut pipeline) = TaskPipeline::new();
        let handle = thread::spawn(move || tx.submit_sync(Task::SetGain(0.5), Duration::from_secs(1)));
        // Give the submission a moment to land in the channel, then drain it.
        thread::sleep(Duration::from_millis(20));
        pipeline.run_batch();
        assert!(handle.join().unwrap().is_ok());
    }

    #[test]
    fn sync_task_times_out_if_never_drained() {
        let (tx, _pipeline) = TaskPipeline::new();
        let result = tx.submit_sync(Task::SetGain(0.0), Duration::from_millis(20));
        assert_eq!(result.unwrap_err(), RocError::TaskTimeout);
    }

    #[test]
    fn async_task_runs_completion_handler() {
        let (tx, mut pipeline) = TaskPipeline::new();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();
        tx.submit_async(
            Task::SetGain(1.0),
            Some(Box::new(move |_| ran_clone.store(true, Ordering::SeqCst))),
        )
        .unwrap();
        pipeline.run_batch();
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn custom_task_closure_executes() {
        let (tx, mut pipeline) = TaskPipeline::new();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = ran.clone();
        tx.submit_async(Task::Custom(Box::new(move || ran_clone.store(true, Ordering::SeqCst))), None)
            .unwrap();
        pipeline.run_batch();
        assert!(ran.load(Ordering::SeqCst));
    }
}
