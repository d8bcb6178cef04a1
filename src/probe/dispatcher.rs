use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::timeout;

use super::error::DispatchError;
use super::limiter::ConcurrencyLimiter;
use super::prelude::*;
use super::ranker::rank;

/// Receives `(completed, total)` once per finished probe, in increasing order of `completed`.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

impl<F> ProgressObserver for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_progress(&self, completed: usize, total: usize) {
        self(completed, total)
    }
}

struct Progress {
    completed: Mutex<usize>,
    total: usize,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl Progress {
    fn advance(&self) {
        // The observer is called under the lock so reported counts never go backwards.
        let mut completed = match self.completed.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *completed += 1;
        if let Some(observer) = &self.observer {
            observer.on_progress(*completed, self.total);
        }
    }
}

/// Fans candidates out to a [`Prober`] under a [`ConcurrencyLimiter`] and ranks the results.
pub struct Dispatcher<P> {
    prober: Arc<P>,
    observer: Option<Arc<dyn ProgressObserver>>,
}

impl<P: Prober> Dispatcher<P> {
    pub fn new(prober: P) -> Self {
        Self {
            prober: Arc::new(prober),
            observer: None,
        }
    }

    pub fn with_progress(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    /// Probes every candidate once and returns the ranked report.
    ///
    /// Individual probe failures never abort the run. A report in which every
    /// probe failed is still returned as `Ok`; see [`RunReport::into_result`].
    pub async fn run(
        &self,
        candidates: &[Candidate],
        concurrency_limit: usize,
        probe_timeout: Duration,
    ) -> Result<RunReport, DispatchError> {
        let candidates_by_id = validate(candidates, probe_timeout)?;
        let limiter = ConcurrencyLimiter::new(concurrency_limit)?;

        log::info!(
            "Probing {} candidates, {} at a time, timeout {:?}",
            candidates.len(),
            limiter.capacity(),
            probe_timeout
        );

        let progress = Arc::new(Progress {
            completed: Mutex::new(0),
            total: candidates.len(),
            observer: self.observer.clone(),
        });

        let mut handles = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let prober = Arc::clone(&self.prober);
            let limiter = limiter.clone();
            let progress = Arc::clone(&progress);
            let candidate_id = candidate.id.clone();
            let candidate = candidate.clone();

            let handle = tokio::spawn(async move {
                let outcome = {
                    let _admission = limiter.acquire().await?;
                    probe_bounded(prober.as_ref(), &candidate, probe_timeout).await
                };
                progress.advance();
                Ok::<_, DispatchError>(outcome)
            });

            handles.push((candidate_id, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (candidate_id, handle) in handles {
            match handle.await {
                Ok(Ok(outcome)) => outcomes.push(outcome),
                Ok(Err(e)) => return Err(e),
                Err(e) if e.is_panic() => {
                    log::warn!("[{candidate_id}] probe panicked, recording as failed");
                    progress.advance();
                    outcomes.push(ProbeOutcome::failure(candidate_id, FailureReason::ProcessError));
                }
                Err(e) => return Err(DispatchError::Scheduling(e.to_string())),
            }
        }

        let report = rank(&outcomes, &candidates_by_id);
        log::info!(
            "Probing finished: {} of {} candidates answered",
            report.succeeded,
            report.total
        );
        Ok(report)
    }
}

/// Runs one probe under the deadline so a prober that overruns still yields `Timeout`,
/// and pins the outcome to the candidate that was probed.
async fn probe_bounded<P: Prober>(
    prober: &P,
    candidate: &Candidate,
    probe_timeout: Duration,
) -> ProbeOutcome {
    match timeout(probe_timeout, prober.probe(candidate, probe_timeout)).await {
        Ok(outcome) if outcome.candidate_id() == candidate.id => outcome,
        Ok(outcome) => {
            log::warn!(
                "[{}] prober answered for {}, treating as unparseable",
                candidate.id,
                outcome.candidate_id()
            );
            ProbeOutcome::failure(candidate.id.clone(), FailureReason::ParseError)
        }
        Err(_) => ProbeOutcome::failure(candidate.id.clone(), FailureReason::Timeout),
    }
}

fn validate(
    candidates: &[Candidate],
    probe_timeout: Duration,
) -> Result<HashMap<String, Candidate>, DispatchError> {
    if candidates.is_empty() {
        return Err(DispatchError::InvalidArgument(
            "no candidates to probe".to_string(),
        ));
    }
    if probe_timeout.is_zero() {
        return Err(DispatchError::InvalidArgument(
            "probe timeout must be greater than zero".to_string(),
        ));
    }

    let mut by_id = HashMap::with_capacity(candidates.len());
    for candidate in candidates {
        if by_id
            .insert(candidate.id.clone(), candidate.clone())
            .is_some()
        {
            return Err(DispatchError::InvalidArgument(format!(
                "duplicate candidate id {}",
                candidate.id
            )));
        }
    }
    Ok(by_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProber;

    impl Prober for FixedProber {
        async fn probe(&self, candidate: &Candidate, _timeout: Duration) -> ProbeOutcome {
            ProbeOutcome::success(candidate.id.clone(), 1.0)
        }
    }

    #[tokio::test]
    async fn test_empty_candidates_rejected() {
        let result = Dispatcher::new(FixedProber)
            .run(&[], 4, Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(DispatchError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_zero_concurrency_rejected() {
        let result = Dispatcher::new(FixedProber)
            .run(&[Candidate::new("a", "a")], 0, Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(DispatchError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_zero_timeout_rejected() {
        let result = Dispatcher::new(FixedProber)
            .run(&[Candidate::new("a", "a")], 1, Duration::ZERO)
            .await;
        assert!(matches!(result, Err(DispatchError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_duplicate_ids_rejected() {
        let candidates = [Candidate::new("a", "one"), Candidate::new("a", "two")];
        let result = Dispatcher::new(FixedProber)
            .run(&candidates, 1, Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(DispatchError::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_progress_reaches_total() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = Arc::clone(&seen);
        let dispatcher = Dispatcher::new(FixedProber).with_progress(move |done: usize, total: usize| {
            recorder.lock().expect("lock").push((done, total));
        });

        let candidates: Vec<Candidate> = (0..5)
            .map(|i| Candidate::new(format!("c{i}"), format!("c{i}.relays.example")))
            .collect();
        let report = dispatcher
            .run(&candidates, 2, Duration::from_secs(1))
            .await
            .expect("run");

        assert_eq!(report.succeeded, 5);
        let seen = seen.lock().expect("lock");
        assert_eq!(*seen, (1..=5).map(|done| (done, 5)).collect::<Vec<_>>());
    }
}
