//! Interactive plan execution.
//!
//! The plan is walked depth-first. Each step is confirmed (or auto-confirmed),
//! its operation runs, then its children are walked in order. Skipping a step
//! drops its whole subtree; aborting unwinds the whole walk as [`Flow::Abort`]
//! so the caller decides how to exit.

use std::cell::RefCell;
use std::time::{Duration, Instant};

use anyhow::Result;
use futures::FutureExt;
use futures::future::LocalBoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, info, warn};

use super::prompt::{Choice, Prompter, prompt_text};
use super::step::Step;
use crate::operations::OperationContext;

/// Whether the walk goes on after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Abort,
}

/// What happened to a visited step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Completed,
    Skipped,
}

/// A visited step, in visit order.
#[derive(Debug, Clone)]
pub struct StepRecord {
    pub description: String,
    pub depth: usize,
    pub outcome: StepOutcome,
    pub elapsed: Duration,
}

/// Result of walking a plan to its end or to an abort.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub records: Vec<StepRecord>,
    pub aborted: bool,
}

impl ExecutionReport {
    pub fn completed(&self) -> usize {
        self.count(StepOutcome::Completed)
    }

    pub fn skipped(&self) -> usize {
        self.count(StepOutcome::Skipped)
    }

    fn count(&self, outcome: StepOutcome) -> usize {
        self.records.iter().filter(|r| r.outcome == outcome).count()
    }
}

/// Walks a plan, asking the operator before each step that needs confirmation.
pub struct Executor<'a, P: Prompter> {
    ctx: &'a OperationContext,
    prompter: RefCell<P>,
    records: RefCell<Vec<StepRecord>>,
    auto_approve: bool,
    concurrent: bool,
}

impl<'a, P: Prompter> Executor<'a, P> {
    pub fn new(ctx: &'a OperationContext, prompter: P) -> Self {
        Self {
            ctx,
            prompter: RefCell::new(prompter),
            records: RefCell::new(Vec::new()),
            auto_approve: false,
            concurrent: false,
        }
    }

    /// Treat every step as not requiring confirmation.
    pub fn auto_approve(mut self, auto_approve: bool) -> Self {
        self.auto_approve = auto_approve;
        self
    }

    /// Run consecutive parallel siblings concurrently.
    pub fn concurrent(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    #[cfg(test)]
    pub fn into_prompter(self) -> P {
        self.prompter.into_inner()
    }

    /// Walk the plan. Operation failures are returned untouched.
    pub async fn apply_plan(&self, plan: &Step) -> Result<ExecutionReport> {
        self.records.borrow_mut().clear();

        let flow = self.apply_step(plan, 0).await?;

        Ok(ExecutionReport {
            records: self.records.take(),
            aborted: flow == Flow::Abort,
        })
    }

    fn apply_step<'s>(&'s self, step: &'s Step, depth: usize) -> LocalBoxFuture<'s, Result<Flow>> {
        async move {
            match self.confirm(step)? {
                Choice::Continue => {
                    let started = Instant::now();
                    if let Some(operation) = step.operation() {
                        debug!("Running {}", operation);
                    }
                    step.run(self.ctx).await?;
                    self.record(step, depth, StepOutcome::Completed, started.elapsed());

                    self.apply_children(step, depth + 1).await
                }
                Choice::Skip => {
                    info!("Skipped {}", step.description());
                    self.record(step, depth, StepOutcome::Skipped, Duration::ZERO);
                    Ok(Flow::Continue)
                }
                Choice::Abort => {
                    info!("Aborting plan");
                    Ok(Flow::Abort)
                }
            }
        }
        .boxed_local()
    }

    async fn apply_children(&self, step: &Step, depth: usize) -> Result<Flow> {
        let children = step.children();
        let mut index = 0;

        while index < children.len() {
            let batch = if self.concurrent {
                children[index..]
                    .iter()
                    .take_while(|child| child.is_parallel())
                    .count()
            } else {
                0
            };

            let flow = if batch > 1 {
                let flow = self
                    .apply_batch(&children[index..index + batch], depth)
                    .await?;
                index += batch;
                flow
            } else {
                let flow = self.apply_step(&children[index], depth).await?;
                index += 1;
                flow
            };

            if flow == Flow::Abort {
                return Ok(Flow::Abort);
            }
        }

        Ok(Flow::Continue)
    }

    /// Walk parallel siblings concurrently on this task.
    ///
    /// Prompts stay one at a time. Returning early drops the other siblings,
    /// which cancels their in-flight work.
    async fn apply_batch(&self, batch: &[Step], depth: usize) -> Result<Flow> {
        debug!("Running {} parallel steps concurrently", batch.len());

        let mut pending: FuturesUnordered<_> = batch
            .iter()
            .map(|step| self.apply_step(step, depth))
            .collect();

        while let Some(result) = pending.next().await {
            if result? == Flow::Abort {
                return Ok(Flow::Abort);
            }
        }

        Ok(Flow::Continue)
    }

    /// Ask until the operator gives a valid answer.
    fn confirm(&self, step: &Step) -> Result<Choice> {
        let prompt = prompt_text(step.description());
        let mut prompter = self.prompter.borrow_mut();

        if self.auto_approve || !step.requires_confirmation() {
            prompter.announce(&prompt);
            return Ok(Choice::Continue);
        }

        loop {
            let answer = prompter.ask(&prompt)?;
            match Choice::parse(&answer) {
                Some(choice) => return Ok(choice),
                None => warn!("No valid input provided!"),
            }
        }
    }

    fn record(&self, step: &Step, depth: usize, outcome: StepOutcome, elapsed: Duration) {
        self.records.borrow_mut().push(StepRecord {
            description: step.description().to_string(),
            depth,
            outcome,
            elapsed,
        });
    }
}
