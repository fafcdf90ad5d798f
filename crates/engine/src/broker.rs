// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort, in-memory event fan-out. Grounded in the shape of the
//! teacher's WAL-backed `EventBus`/`EventReader` split (a producer side and a
//! dispatch-owned consuming side), but backed by bounded `tokio::sync::mpsc`
//! channels instead of a WAL: broker delivery here is explicitly best-effort,
//! not a durability boundary (see §4.1 of the design).

use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use syncd_core::Event;
use tokio::sync::mpsc;

const INGRESS_CAPACITY: usize = 100;
const SUBSCRIBER_CAPACITY: usize = 10;

struct Subscriber {
    id: u64,
    tx: mpsc::Sender<Event>,
}

/// A live subscription. Drop (or explicit `unsubscribe`) removes it from the
/// broker's fan-out set.
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<Event>,
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.subscribers.write().retain(|s| s.id != self.id);
    }
}

#[derive(Clone)]
pub struct Broker {
    ingress: mpsc::Sender<Event>,
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<AtomicU64>,
}

impl Broker {
    pub fn new() -> Self {
        let (ingress, mut ingress_rx) = mpsc::channel::<Event>(INGRESS_CAPACITY);
        let subscribers: Arc<RwLock<Vec<Subscriber>>> = Arc::new(RwLock::new(Vec::new()));

        let dispatch_subscribers = Arc::clone(&subscribers);
        tokio::spawn(async move {
            while let Some(event) = ingress_rx.recv().await {
                let subs = dispatch_subscribers.read();
                for sub in subs.iter() {
                    if sub.tx.try_send(event.clone()).is_err() {
                        tracing::debug!(subscriber_id = sub.id, kind = ?event.kind(), "dropped event for slow subscriber");
                    }
                }
            }
        });

        Self { ingress, subscribers, next_id: Arc::new(AtomicU64::new(1)) }
    }

    /// Non-blocking: if the ingress queue is full the event is dropped and a
    /// warning logged. Never back-pressures the publisher.
    pub fn publish(&self, event: Event) {
        if self.ingress.try_send(event.clone()).is_err() {
            tracing::warn!(kind = ?event.kind(), "broker ingress queue full, event dropped");
        }
    }

    pub fn subscribe(&self) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        self.subscribers.write().push(Subscriber { id, tx });
        Subscription { id, rx, subscribers: Arc::clone(&self.subscribers) }
    }

    pub fn unsubscribe(&self, id: u64) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncd_core::{ConnectionId, TaskId};

    fn task_updated() -> Event {
        Event::TaskUpdated { connection_id: ConnectionId::new(), task_id: TaskId::new() }
    }

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let broker = Broker::new();
        let mut sub = broker.subscribe();
        broker.publish(task_updated());
        let event = tokio::time::timeout(std::time::Duration::from_secs(1), sub.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.kind(), syncd_core::EventKind::TaskUpdated);
    }

    #[tokio::test]
    async fn unsubscribe_removes_from_fanout() {
        let broker = Broker::new();
        let sub = broker.subscribe();
        assert_eq!(broker.subscriber_count(), 1);
        broker.unsubscribe(sub.id());
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert_eq!(broker.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn dropping_subscription_unsubscribes() {
        let broker = Broker::new();
        {
            let _sub = broker.subscribe();
            assert_eq!(broker.subscriber_count(), 1);
        }
        assert_eq!(broker.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn slow_subscriber_does_not_block_others() {
        let broker = Broker::new();
        let mut slow = broker.subscribe();
        let mut fast = broker.subscribe();
        for _ in 0..20 {
            broker.publish(task_updated());
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        // fast subscriber still gets at least one event even though slow's buffer overflowed.
        assert!(fast.recv().await.is_some());
        assert!(slow.recv().await.is_some());
    }

    #[tokio::test]
    async fn multiple_subscribers_each_get_events() {
        let broker = Broker::new();
        let mut a = broker.subscribe();
        let mut b = broker.subscribe();
        broker.publish(task_updated());
        assert!(a.recv().await.is_some());
        assert!(b.recv().await.is_some());
    }
}
