// src/services/messaging_service.rs
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing;
use uuid::Uuid;

use crate::{
    errors::{AdmissionsError as AppError, AdmissionsResult},
    models::messages::DeepLink,
    utils::phone,
};

pub const DEFAULT_BATCH_SIZE: usize = 6;
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(600);

/// Side effect that hands a deep link to whatever opens it (browser, composer, terminal).
pub trait LinkOpener: Send + Sync {
    fn open(&self, link: &DeepLink) -> AdmissionsResult<()>;
}

/// Prints each link on its own line, for piping into an opener.
#[derive(Debug, Default)]
pub struct StdoutLinkOpener;

impl LinkOpener for StdoutLinkOpener {
    fn open(&self, link: &DeepLink) -> AdmissionsResult<()> {
        println!("{}", link);
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LoggingLinkOpener;

impl LinkOpener for LoggingLinkOpener {
    fn open(&self, link: &DeepLink) -> AdmissionsResult<()> {
        tracing::info!("[{}] Would open link for {}: {}", link.channel, link.recipient, link);
        Ok(())
    }
}

/// Source of the inter-batch delay.
#[async_trait]
pub trait Scheduler: Send + Sync {
    async fn sleep(&self, delay: Duration);
}

#[derive(Debug, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchPolicy {
    pub batch_size: usize,
    pub delay: Duration,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delay: DEFAULT_BATCH_DELAY,
        }
    }
}

impl BatchPolicy {
    pub fn new(batch_size: usize, delay: Duration) -> Self {
        Self { batch_size, delay }
    }

    pub fn validate(&self) -> AdmissionsResult<()> {
        if self.batch_size == 0 {
            return Err(AppError::invalid_field("batch_size", self.batch_size, "must be greater than zero"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    DispatchingBatch,
    Waiting,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchStep {
    Batch(Vec<DeepLink>),
    Wait(Duration),
    Done,
}

/// Batching state machine. Each call to `next_step` advances one transition:
/// `Idle|Waiting -> DispatchingBatch` hands out the next batch,
/// `DispatchingBatch -> Waiting` asks for the delay while links remain,
/// and everything ends in `Done`.
#[derive(Debug)]
pub struct DispatchPlan {
    links: Vec<DeepLink>,
    policy: BatchPolicy,
    cursor: usize,
    state: DispatchState,
}

impl DispatchPlan {
    pub fn new(links: Vec<DeepLink>, policy: BatchPolicy) -> AdmissionsResult<Self> {
        policy.validate()?;
        Ok(Self {
            links,
            policy,
            cursor: 0,
            state: DispatchState::Idle,
        })
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn remaining(&self) -> usize {
        self.links.len() - self.cursor
    }

    pub fn next_step(&mut self) -> DispatchStep {
        match self.state {
            DispatchState::Idle | DispatchState::Waiting => {
                if self.remaining() == 0 {
                    self.state = DispatchState::Done;
                    return DispatchStep::Done;
                }
                let end = (self.cursor + self.policy.batch_size).min(self.links.len());
                let batch = self.links[self.cursor..end].to_vec();
                self.cursor = end;
                self.state = DispatchState::DispatchingBatch;
                DispatchStep::Batch(batch)
            }
            DispatchState::DispatchingBatch => {
                if self.remaining() > 0 {
                    self.state = DispatchState::Waiting;
                    DispatchStep::Wait(self.policy.delay)
                } else {
                    self.state = DispatchState::Done;
                    DispatchStep::Done
                }
            }
            DispatchState::Done => DispatchStep::Done,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchSummary {
    pub run_id: Uuid,
    pub batch_sizes: Vec<usize>,
    pub waits: Vec<Duration>,
    pub opened: usize,
    pub failed: usize,
}

/// Opens one WhatsApp link per recipient, a batch at a time, pausing between
/// batches so popup blockers are not tripped.
#[derive(Clone)]
pub struct BatchDispatcher {
    opener: Arc<dyn LinkOpener>,
    scheduler: Arc<dyn Scheduler>,
    policy: BatchPolicy,
}

impl BatchDispatcher {
    pub fn new(opener: Arc<dyn LinkOpener>, scheduler: Arc<dyn Scheduler>, policy: BatchPolicy) -> Self {
        Self { opener, scheduler, policy }
    }

    pub fn with_tokio(opener: Arc<dyn LinkOpener>, policy: BatchPolicy) -> Self {
        Self::new(opener, Arc::new(TokioScheduler), policy)
    }

    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    pub fn build_plan(numbers: &[String], message: &str, policy: BatchPolicy) -> AdmissionsResult<DispatchPlan> {
        let links = numbers
            .iter()
            .map(|number| DeepLink::whatsapp(&phone::normalize(number), message))
            .collect();
        DispatchPlan::new(links, policy)
    }

    /// Runs the whole dispatch with the configured policy and waits for it to finish.
    pub async fn run(&self, numbers: &[String], message: &str) -> AdmissionsResult<DispatchSummary> {
        self.run_with(numbers, message, self.policy).await
    }

    pub async fn run_with(
        &self,
        numbers: &[String],
        message: &str,
        policy: BatchPolicy,
    ) -> AdmissionsResult<DispatchSummary> {
        let mut plan = Self::build_plan(numbers, message, policy)?;
        let mut summary = self.start(numbers.len(), policy);
        self.drive(&mut plan, &mut summary).await;
        Ok(summary)
    }

    /// Fire-and-forget: the first batch opens before this returns, the rest is
    /// spawned on the current runtime. There is no cancellation; every batch
    /// eventually fires unless the runtime shuts down.
    pub fn dispatch(&self, numbers: Vec<String>, message: String, policy: BatchPolicy) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::error!("WhatsApp dispatch requested outside a tokio runtime, dropping");
            return;
        };

        let mut plan = match Self::build_plan(&numbers, &message, policy) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::error!("WhatsApp dispatch aborted: {}", e);
                return;
            }
        };
        let mut summary = self.start(numbers.len(), policy);

        // Idle only ever yields a batch or Done
        if let DispatchStep::Batch(batch) = plan.next_step() {
            self.open_batch(&batch, &mut summary);
        }

        let dispatcher = self.clone();
        handle.spawn(async move {
            dispatcher.drive(&mut plan, &mut summary).await;
        });
    }

    fn start(&self, recipients: usize, policy: BatchPolicy) -> DispatchSummary {
        let summary = DispatchSummary {
            run_id: Uuid::new_v4(),
            batch_sizes: Vec::new(),
            waits: Vec::new(),
            opened: 0,
            failed: 0,
        };

        tracing::info!(
            "Dispatch {} starting: {} recipients, batch size {}, delay {:?}",
            summary.run_id,
            recipients,
            policy.batch_size,
            policy.delay
        );
        summary
    }

    fn open_batch(&self, batch: &[DeepLink], summary: &mut DispatchSummary) {
        summary.batch_sizes.push(batch.len());
        for link in batch {
            match self.opener.open(link) {
                Ok(()) => {
                    tracing::debug!("Opened {}", link);
                    summary.opened += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to open link for {}: {}", link.recipient, e);
                    summary.failed += 1;
                }
            }
        }
    }

    /// Steps the plan until it reaches `Done`.
    async fn drive(&self, plan: &mut DispatchPlan, summary: &mut DispatchSummary) {
        loop {
            match plan.next_step() {
                DispatchStep::Batch(batch) => self.open_batch(&batch, summary),
                DispatchStep::Wait(delay) => {
                    summary.waits.push(delay);
                    self.scheduler.sleep(delay).await;
                }
                DispatchStep::Done => break,
            }
        }

        tracing::info!(
            "Dispatch {} finished: {} batches, {} links opened",
            summary.run_id,
            summary.batch_sizes.len(),
            summary.opened
        );
    }
}

/// Opens one `sms:` link per recipient immediately. SMS composers are not
/// popup-blocked, so there is no batching and numbers are used as typed.
#[derive(Clone)]
pub struct SmsDispatcher {
    opener: Arc<dyn LinkOpener>,
}

impl SmsDispatcher {
    pub fn new(opener: Arc<dyn LinkOpener>) -> Self {
        Self { opener }
    }

    /// Returns how many links were opened.
    pub fn dispatch(&self, numbers: &[String], message: &str) -> usize {
        let mut opened = 0;
        for number in numbers {
            let link = DeepLink::sms(number, message);
            match self.opener.open(&link) {
                Ok(()) => opened += 1,
                Err(e) => tracing::warn!("Failed to open SMS link for {}: {}", number, e),
            }
        }
        tracing::info!("Opened {} of {} SMS links", opened, numbers.len());
        opened
    }
}
