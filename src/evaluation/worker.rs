use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use super::{EvaluationRecord, EvaluationRequest, EvaluationResult, EvaluationService};

/// Identifies one dispatched request and the session epoch it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluationTicket {
    pub id: u64,
    pub epoch: u64,
}

#[derive(Debug)]
pub struct EvaluationCompletion {
    pub ticket: EvaluationTicket,
    pub outcome: EvaluationResult<Vec<EvaluationRecord>>,
}

/// Runs each evaluation on its own thread and queues the completions for the
/// session thread to collect.
pub struct EvaluationWorker {
    service: Arc<dyn EvaluationService>,
    tx: mpsc::Sender<EvaluationCompletion>,
    rx: mpsc::Receiver<EvaluationCompletion>,
    next_id: u64,
    in_flight: usize,
}

impl EvaluationWorker {
    pub fn new(service: Arc<dyn EvaluationService>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            service,
            tx,
            rx,
            next_id: 1,
            in_flight: 0,
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn spawn(&mut self, request: EvaluationRequest, epoch: u64) -> EvaluationTicket {
        let ticket = EvaluationTicket {
            id: self.next_id,
            epoch,
        };
        self.next_id = self.next_id.saturating_add(1);
        self.in_flight += 1;

        let service = Arc::clone(&self.service);
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let outcome = service.calculate(&request);
            let _ = tx.send(EvaluationCompletion { ticket, outcome });
        });
        tracing::debug!(id = ticket.id, epoch, in_flight = self.in_flight, "evaluation dispatched");
        ticket
    }

    pub fn try_collect(&mut self) -> Vec<EvaluationCompletion> {
        let mut completed = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            completed.push(completion);
        }
        self.in_flight = self.in_flight.saturating_sub(completed.len());
        completed
    }

    /// Blocks until every in-flight request has reported, giving up once a
    /// single wait exceeds `timeout`.
    pub fn collect_blocking(&mut self, timeout: Duration) -> Vec<EvaluationCompletion> {
        let mut completed = Vec::new();
        while self.in_flight > 0 {
            match self.rx.recv_timeout(timeout) {
                Ok(completion) => {
                    self.in_flight -= 1;
                    completed.push(completion);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    tracing::warn!(in_flight = self.in_flight, "timed out waiting for evaluations");
                    break;
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct EchoService {
        seen: Mutex<Vec<usize>>,
    }

    impl EvaluationService for EchoService {
        fn calculate(&self, request: &EvaluationRequest) -> EvaluationResult<Vec<EvaluationRecord>> {
            self.seen.lock().unwrap().push(request.dict_of_vars.len());
            Ok(vec![EvaluationRecord {
                expr: request.image.clone(),
                result: "ok".to_string(),
                assign: false,
            }])
        }
    }

    fn request(tag: &str) -> EvaluationRequest {
        EvaluationRequest {
            image: tag.to_string(),
            dict_of_vars: Default::default(),
        }
    }

    #[test]
    fn spawned_requests_report_with_their_tickets() {
        let service = Arc::new(EchoService {
            seen: Mutex::new(Vec::new()),
        });
        let mut worker = EvaluationWorker::new(service.clone());
        let first = worker.spawn(request("a"), 0);
        let second = worker.spawn(request("b"), 1);
        assert_ne!(first.id, second.id);
        assert_eq!(worker.in_flight(), 2);

        let mut completed = worker.collect_blocking(Duration::from_secs(5));
        completed.sort_by_key(|completion| completion.ticket.id);
        assert_eq!(worker.in_flight(), 0);
        assert_eq!(completed.len(), 2);
        assert_eq!(completed[0].ticket, first);
        assert_eq!(completed[1].ticket.epoch, 1);
        let records = completed[1].outcome.as_ref().unwrap();
        assert_eq!(records[0].expr, "b");
        assert_eq!(service.seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn try_collect_without_requests_is_empty() {
        let service = Arc::new(EchoService {
            seen: Mutex::new(Vec::new()),
        });
        let mut worker = EvaluationWorker::new(service);
        assert!(worker.try_collect().is_empty());
        assert!(worker.collect_blocking(Duration::from_millis(10)).is_empty());
    }
}
