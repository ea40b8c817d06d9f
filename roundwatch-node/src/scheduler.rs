//! One refresh loop per data category.
//!
//! Every loop fires once right away and then on its own interval. A loop
//! runs at most one fetch at a time: ticks that come due while a fetch is
//! still in flight are skipped, and shutdown cancels the fetch.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use roundwatch_state::{Category, StateHandle};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::aggregator::Aggregator;

/// Shared pause flag. While set, ticks start no new fetches; a fetch
/// already in flight still completes and is applied.
#[derive(Debug, Clone, Default)]
pub struct PauseSwitch(Arc<AtomicBool>);

impl PauseSwitch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set_paused(&self, paused: bool) {
        self.0.store(paused, Ordering::SeqCst);
    }

    /// Flip the flag and return the new value
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshIntervals {
    pub consensus: Duration,
    pub chain_validators: Duration,
    pub status: Duration,
    pub upgrade: Duration,
    pub block_time: Duration,
}

pub struct Scheduler {
    aggregator: Arc<Aggregator>,
    state: StateHandle,
    intervals: RefreshIntervals,
    pause: PauseSwitch,
}

impl Scheduler {
    pub fn new(aggregator: Arc<Aggregator>, state: StateHandle, intervals: RefreshIntervals, pause: PauseSwitch) -> Self {
        Self {
            aggregator,
            state,
            intervals,
            pause,
        }
    }

    /// Start every refresh loop. Each one exits when `shutdown` fires.
    pub fn spawn(self, shutdown: &broadcast::Sender<()>) -> Vec<JoinHandle<()>> {
        let Scheduler {
            aggregator,
            state,
            intervals,
            pause,
        } = self;

        let loops: [(Category, Duration); 5] = [
            (Category::Consensus, intervals.consensus),
            (Category::ChainValidators, intervals.chain_validators),
            (Category::Status, intervals.status),
            (Category::Upgrade, intervals.upgrade),
            (Category::BlockTime, intervals.block_time),
        ];

        loops
            .into_iter()
            .map(|(category, period)| {
                let aggregator = aggregator.clone();
                let state = state.clone();
                spawn_loop(category, period, pause.clone(), shutdown.subscribe(), move || {
                    let aggregator = aggregator.clone();
                    let state = state.clone();
                    async move { refresh(category, &aggregator, &state).await }
                })
            })
            .collect()
    }
}

fn spawn_loop<F, Fut>(
    category: Category,
    period: Duration,
    pause: PauseSwitch,
    mut shutdown: broadcast::Receiver<()>,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        log::info!("Refreshing {} every {:?}", category, period);

        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    log::info!("{} refresh loop shutting down", category);
                    break;
                }
                _ = interval.tick() => {
                    if pause.is_paused() {
                        log::trace!("Paused, not refreshing {}", category);
                        continue;
                    }

                    tokio::select! {
                        _ = shutdown.recv() => {
                            log::info!("{} refresh loop shutting down, dropping the fetch in flight", category);
                            break;
                        }
                        _ = job() => {}
                    }
                }
            }
        }
    })
}

/// Run one fetch for `category` and apply its result to the state.
pub async fn refresh(category: Category, aggregator: &Aggregator, state: &StateHandle) {
    match category {
        Category::Consensus | Category::Validators => refresh_consensus(aggregator, state).await,
        Category::ChainValidators => {
            let result = aggregator.fetch_chain_validators().await;
            state.update(|s| s.ingest_chain_validators(result)).await;
        }
        Category::Status => {
            let result = aggregator.fetch_status().await;
            state.update(|s| s.ingest_status(result)).await;
        }
        Category::Upgrade => {
            let result = aggregator.fetch_upgrade().await;
            state.update(|s| s.ingest_upgrade(result)).await;
        }
        Category::BlockTime => {
            let result = aggregator.fetch_block_time().await;
            state.update(|s| s.ingest_block_time(result)).await;
        }
    }
}

async fn refresh_consensus(aggregator: &Aggregator, state: &StateHandle) {
    match aggregator.fetch_consensus_and_votes().await {
        Ok((round_state, validators)) => {
            let now = Utc::now();
            // conversion failures land in the consensus error slot
            let _ = state
                .update(|s| s.apply_consensus(&round_state, &validators, now))
                .await;
        }
        Err(e) => state.update(|s| s.record_error(e.category(), &e)).await,
    }
}
