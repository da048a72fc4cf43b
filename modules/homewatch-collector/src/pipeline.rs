//! Per-message pipeline and the worker pool that runs it.
//!
//! Messages are routed to a worker by hashing the topic's sensor-id segment,
//! so events from one sensor are always processed in arrival order on one
//! worker, while distinct sensors proceed in parallel.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use homewatch_common::{topic, validate};

use crate::dispatch::ClaimDispatcher;
use crate::fanout::Fanout;
use crate::ingress::InboundMessage;

pub struct Pipeline {
    fanout: Arc<Fanout>,
    dispatcher: Arc<ClaimDispatcher>,
}

impl Pipeline {
    pub fn new(fanout: Arc<Fanout>, dispatcher: Arc<ClaimDispatcher>) -> Self {
        Self { fanout, dispatcher }
    }

    /// Run one message through validate → fan-out → classify → dispatch.
    ///
    /// Validation failure drops the message: no store writes, no claim.
    /// Partial persistence failure does not stop classification; the
    /// reading is analyzed for damage regardless.
    pub async fn handle(&self, msg: InboundMessage) {
        let reading = match validate(&msg.topic, &msg.payload) {
            Ok(reading) => reading,
            Err(e) => {
                warn!(topic = %msg.topic, error = %e, "Dropping invalid message");
                return;
            }
        };
        debug!(
            sensor_id = %reading.sensor_id,
            sensor_type = %reading.sensor_type,
            location = %reading.location,
            "Reading validated"
        );

        self.fanout.persist(&reading).await;

        if let Some(verdict) = homewatch_rules::classify(&reading) {
            info!(
                sensor_id = %reading.sensor_id,
                location = %reading.location,
                classification = %verdict.classification,
                estimated_cost = %verdict.estimated_cost,
                "Damage condition detected"
            );
            self.dispatcher.dispatch(&verdict, &reading).await;
        }
    }

    /// Spawn the worker pool. Each worker owns one bounded queue; submission
    /// routes by sensor id to preserve per-sensor ordering.
    pub fn spawn_workers(self: &Arc<Self>, workers: usize, queue_depth: usize) -> WorkerPool {
        let workers = workers.max(1);
        let mut senders = Vec::with_capacity(workers);
        let mut handles = Vec::with_capacity(workers);

        for worker in 0..workers {
            let (tx, mut rx) = mpsc::channel::<InboundMessage>(queue_depth.max(1));
            let pipeline = Arc::clone(self);
            handles.push(tokio::spawn(async move {
                while let Some(msg) = rx.recv().await {
                    pipeline.handle(msg).await;
                }
                debug!(worker, "Worker drained");
            }));
            senders.push(tx);
        }

        WorkerPool { senders, handles }
    }
}

pub struct WorkerPool {
    senders: Vec<mpsc::Sender<InboundMessage>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Queue a message on the worker owning its sensor. Awaits when the
    /// worker's queue is full: backpressure, not drop.
    pub async fn submit(&self, msg: InboundMessage) {
        let idx = worker_index(&msg.topic, self.senders.len());
        if self.senders[idx].send(msg).await.is_err() {
            warn!(worker = idx, "Worker queue closed, message lost");
        }
    }

    /// Close all queues and wait for in-flight and queued messages to finish.
    pub async fn drain(self) {
        drop(self.senders);
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Worker task panicked during drain");
            }
        }
        info!("All workers drained");
    }
}

/// Stable worker assignment from the topic's sensor-id segment.
pub fn worker_index(msg_topic: &str, workers: usize) -> usize {
    let info = topic::route(msg_topic);
    let mut hasher = DefaultHasher::new();
    info.sensor_id.hash(&mut hasher);
    (hasher.finish() % workers.max(1) as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_sensor_always_lands_on_the_same_worker() {
        let a = worker_index("home/bathroom/water_leak_001/sensor", 4);
        let b = worker_index("home/kitchen/water_leak_001/sensor", 4);
        assert_eq!(a, b);

        for workers in 1..8 {
            let idx = worker_index("home/bathroom/water_leak_001/sensor", workers);
            assert!(idx < workers);
        }
    }
}
