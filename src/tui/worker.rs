//! Background analysis worker.
//!
//! The duration answer triggers the analysis step, which calls the
//! classifier. Running that submission on a worker thread keeps the TUI
//! responsive while the model scores.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::application::{Analyzer, ConsultationService, Interaction};
use crate::domain::StepInput;
use crate::ports::SessionStore;

/// Progress updates from the analysis worker.
#[derive(Debug, Clone)]
pub enum AnalysisProgress {
    /// Submission accepted by the worker; scoring under way
    Analyzing,
    /// Transition finished (the state may carry a degraded report)
    Complete(Box<Interaction>),
    /// The session could not be updated
    Error(String),
}

/// Handle to a running analysis worker.
pub struct AnalysisWorkerHandle {
    pub progress_rx: Receiver<AnalysisProgress>,
    _handle: JoinHandle<()>,
}

impl AnalysisWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    ///
    /// A worker that went away without reporting yields
    /// `AnalysisProgress::Error` so the caller never waits on it forever.
    #[must_use]
    pub fn try_recv(&self) -> Option<AnalysisProgress> {
        match self.progress_rx.try_recv() {
            Ok(progress) => Some(progress),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(AnalysisProgress::Error(
                "Analysis worker stopped unexpectedly".to_string(),
            )),
        }
    }
}

/// Runs a submission that ends in analysis off the UI thread.
pub struct AnalysisWorker;

impl AnalysisWorker {
    pub fn spawn<A, S>(
        service: ConsultationService<A, S>,
        session_id: String,
        input: StepInput,
    ) -> AnalysisWorkerHandle
    where
        A: Analyzer + 'static,
        S: SessionStore + 'static,
    {
        let (tx, rx) = mpsc::channel();

        let handle = thread::spawn(move || {
            Self::run(&service, &session_id, input, &tx);
        });

        AnalysisWorkerHandle {
            progress_rx: rx,
            _handle: handle,
        }
    }

    fn run<A, S>(
        service: &ConsultationService<A, S>,
        session_id: &str,
        input: StepInput,
        tx: &Sender<AnalysisProgress>,
    ) where
        A: Analyzer,
        S: SessionStore,
    {
        let _ = tx.send(AnalysisProgress::Analyzing);

        match service.submit(session_id, input) {
            Ok(interaction) => {
                let _ = tx.send(AnalysisProgress::Complete(Box::new(interaction)));
            }
            Err(e) => {
                let _ = tx.send(AnalysisProgress::Error(e.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_from(rx: Receiver<AnalysisProgress>) -> AnalysisWorkerHandle {
        AnalysisWorkerHandle {
            progress_rx: rx,
            _handle: thread::spawn(|| {}),
        }
    }

    #[test]
    fn test_pending_worker_reports_nothing() {
        let (_tx, rx) = mpsc::channel::<AnalysisProgress>();
        let handle = handle_from(rx);
        assert!(handle.try_recv().is_none());
    }

    #[test]
    fn test_vanished_worker_surfaces_error() {
        let (tx, rx) = mpsc::channel::<AnalysisProgress>();
        tx.send(AnalysisProgress::Analyzing).expect("Should send");
        drop(tx);

        let handle = handle_from(rx);
        assert!(matches!(handle.try_recv(), Some(AnalysisProgress::Analyzing)));
        assert!(matches!(handle.try_recv(), Some(AnalysisProgress::Error(_))));
    }
}
