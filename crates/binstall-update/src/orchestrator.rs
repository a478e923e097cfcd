//! Bounded worker pool over update plans

use crate::error::BinaryFailure;
use crate::pipeline::{CheckOutcome, Outcome, UpdatePipeline, UpdatePlan};
use async_trait::async_trait;
use binstall_core::BinarySpec;
use futures::stream::{self, StreamExt};
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// The two halves of a pipeline as seen by the orchestrator
#[async_trait]
pub trait PlanExecutor: Send + Sync {
    async fn check(&self, spec: &BinarySpec) -> Result<CheckOutcome, BinaryFailure>;

    async fn execute(&self, plan: UpdatePlan) -> Outcome;
}

#[async_trait]
impl PlanExecutor for UpdatePipeline {
    async fn check(&self, spec: &BinarySpec) -> Result<CheckOutcome, BinaryFailure> {
        UpdatePipeline::check(self, spec).await
    }

    async fn execute(&self, plan: UpdatePlan) -> Outcome {
        self.install(plan).await
    }
}

/// Notified as each outcome arrives
pub trait OutcomeObserver: Send + Sync {
    fn on_outcome(&self, completed: usize, total: usize, outcome: &Outcome);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl OutcomeObserver for NoopObserver {
    fn on_outcome(&self, _completed: usize, _total: usize, _outcome: &Outcome) {}
}

/// Outcomes of a run, in completion order
#[derive(Debug, Default)]
pub struct Report {
    pub outcomes: Vec<Outcome>,
}

impl Report {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(Outcome::is_success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }

    pub fn successes(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes.iter().filter(|o| o.is_success())
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Runs many pipelines with bounded parallelism
pub struct Orchestrator {
    executor: Arc<dyn PlanExecutor>,
    parallel: usize,
}

impl Orchestrator {
    pub fn new(executor: Arc<dyn PlanExecutor>, parallel: usize) -> Self {
        Self {
            executor,
            parallel: parallel.max(1),
        }
    }

    /// Number of workers used for `plans` plans
    pub fn worker_count(&self, plans: usize) -> usize {
        self.parallel.clamp(1, plans.max(1))
    }

    /// Check every spec, at most `parallel` at a time, preserving input order
    pub async fn check_all(
        &self,
        specs: Vec<BinarySpec>,
    ) -> Vec<Result<CheckOutcome, BinaryFailure>> {
        stream::iter(specs)
            .map(|spec| {
                let executor = self.executor.clone();
                async move { executor.check(&spec).await }
            })
            .buffered(self.parallel)
            .collect()
            .await
    }

    /// Execute every plan and collect exactly one outcome per plan
    pub async fn run(&self, plans: Vec<UpdatePlan>, observer: &dyn OutcomeObserver) -> Report {
        let total = plans.len();
        if total == 0 {
            return Report::default();
        }

        let workers = self.worker_count(total);
        debug!("Running {} plans on {} workers", total, workers);

        let pending = plans.clone();
        let queue = Arc::new(Mutex::new(VecDeque::from(plans)));
        let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();

        let mut join_set = JoinSet::new();
        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let tx = tx.clone();
            let executor = Arc::clone(&self.executor);

            join_set.spawn(async move {
                loop {
                    let next = queue
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner())
                        .pop_front();
                    let Some(plan) = next else {
                        break;
                    };

                    debug!("Worker {} picked {}", worker, plan.name());
                    let outcome = executor.execute(plan).await;
                    if tx.send(outcome).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
            if let Some(last) = outcomes.last() {
                observer.on_outcome(outcomes.len(), total, last);
            }
        }

        while let Some(joined) = join_set.join_next().await {
            if let Err(e) = joined {
                warn!("Worker task failed: {}", e);
            }
        }

        let reported: HashSet<String> = outcomes.iter().map(|o| o.name.clone()).collect();
        for plan in pending.iter().filter(|p| !reported.contains(p.name())) {
            warn!("{}: no outcome reported, marking as failed", plan.name());
            outcomes.push(Outcome::aborted(plan, "worker stopped before reporting"));
            if let Some(last) = outcomes.last() {
                observer.on_outcome(outcomes.len(), total, last);
            }
        }

        Report { outcomes }
    }
}
