//! In-process broker implementing the broker seam.
//!
//! Routes with topic semantics (`*` matches one word, `#` matches zero or
//! more), buffers messages for queues without a consumer, requeues to the
//! back of the queue, and re-routes discarded messages through the queue's
//! dead-letter exchange. Exact keys degrade to exact matching, so a
//! direct-style exchange needs no special casing.
//!
//! Tests drive the real publish/subscribe code paths against this backend
//! and assert on its resolution log; nothing here talks to a network.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::{
    BrokerConnection, BrokerConsumer, BrokerDelivery, BrokerError, BrokerSession, Disposition,
    QueueInfo, QueueProfile,
};

#[derive(Debug, Clone)]
struct Message {
    routing_key: String,
    content_type: String,
    body: Vec<u8>,
}

struct QueueState {
    profile: QueueProfile,
    dead_letter_exchange: String,
    pending: VecDeque<Message>,
    consumer: Option<mpsc::UnboundedSender<Message>>,
}

struct Binding {
    exchange: String,
    pattern: String,
    queue: String,
}

#[derive(Default)]
struct Inner {
    queues: HashMap<String, QueueState>,
    bindings: Vec<Binding>,
    resolutions: Vec<(String, Disposition)>,
}

impl Inner {
    /// Delivers to the queue's consumer if one is attached, otherwise
    /// buffers. A consumer whose receiver has gone away counts as detached.
    fn enqueue(&mut self, queue_name: &str, msg: Message) {
        let Some(queue) = self.queues.get_mut(queue_name) else {
            return;
        };
        if let Some(tx) = &queue.consumer {
            if tx.send(msg.clone()).is_ok() {
                return;
            }
            queue.consumer = None;
        }
        queue.pending.push_back(msg);
    }

    /// Fans `msg` out to every queue bound to `exchange` with a matching
    /// pattern. Unroutable messages are silently dropped, like a
    /// non-mandatory publish.
    fn route(&mut self, exchange: &str, msg: Message) {
        let targets: Vec<String> = self
            .bindings
            .iter()
            .filter(|b| b.exchange == exchange && topic_matches(&b.pattern, &msg.routing_key))
            .map(|b| b.queue.clone())
            .collect();
        for queue in targets {
            self.enqueue(&queue, msg.clone());
        }
    }
}

/// An in-memory broker. Cloning yields another handle to the same broker.
#[derive(Clone, Default)]
pub struct MemoryBroker {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryBroker {
    /// Creates an empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// The profile a queue was declared with, if it exists.
    pub fn queue_profile(&self, queue: &str) -> Option<QueueProfile> {
        self.lock().queues.get(queue).map(|q| q.profile)
    }

    /// Every (queue, disposition) resolution observed so far, in order.
    pub fn resolutions(&self) -> Vec<(String, Disposition)> {
        self.lock().resolutions.clone()
    }

    /// Bodies currently buffered on `queue` (consumerless queues only see
    /// buffered messages, which makes dead-letter assertions easy).
    pub fn pending_bodies(&self, queue: &str) -> Vec<Vec<u8>> {
        self.lock()
            .queues
            .get(queue)
            .map(|q| q.pending.iter().map(|m| m.body.clone()).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BrokerConnection for MemoryBroker {
    type Session = MemorySession;

    async fn open_session(&self) -> Result<MemorySession, BrokerError> {
        Ok(MemorySession {
            broker: self.clone(),
        })
    }
}

/// A session over a [`MemoryBroker`].
pub struct MemorySession {
    broker: MemoryBroker,
}

impl BrokerSession for MemorySession {
    type Consumer = MemoryConsumer;

    async fn declare_queue(
        &self,
        name: &str,
        profile: QueueProfile,
        dead_letter_exchange: &str,
    ) -> Result<QueueInfo, BrokerError> {
        let mut inner = self.broker.lock();
        let queue = inner
            .queues
            .entry(name.to_string())
            .or_insert_with(|| QueueState {
                profile,
                dead_letter_exchange: dead_letter_exchange.to_string(),
                pending: VecDeque::new(),
                consumer: None,
            });
        // Redeclaration keeps buffered messages but refreshes the policy.
        queue.profile = profile;
        queue.dead_letter_exchange = dead_letter_exchange.to_string();

        Ok(QueueInfo {
            name: name.to_string(),
            message_count: queue.pending.len() as u32,
            consumer_count: u32::from(queue.consumer.is_some()),
        })
    }

    async fn bind_queue(
        &self,
        queue: &str,
        exchange: &str,
        routing_key: &str,
    ) -> Result<(), BrokerError> {
        let mut inner = self.broker.lock();
        if !inner.queues.contains_key(queue) {
            return Err(BrokerError::Refused(format!("no such queue: {queue}")));
        }
        let duplicate = inner
            .bindings
            .iter()
            .any(|b| b.queue == queue && b.exchange == exchange && b.pattern == routing_key);
        if !duplicate {
            inner.bindings.push(Binding {
                exchange: exchange.to_string(),
                pattern: routing_key.to_string(),
                queue: queue.to_string(),
            });
        }
        Ok(())
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<(), BrokerError> {
        self.broker.lock().route(
            exchange,
            Message {
                routing_key: routing_key.to_string(),
                content_type: content_type.to_string(),
                body,
            },
        );
        Ok(())
    }

    async fn consume(&self, queue: &str) -> Result<MemoryConsumer, BrokerError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.broker.lock();
        let Some(state) = inner.queues.get_mut(queue) else {
            return Err(BrokerError::Refused(format!("no such queue: {queue}")));
        };
        for msg in state.pending.drain(..) {
            // The receiver end is still in scope, send cannot fail.
            let _ = tx.send(msg);
        }
        state.consumer = Some(tx);
        Ok(MemoryConsumer {
            queue: queue.to_string(),
            broker: self.broker.clone(),
            rx,
        })
    }
}

/// Consumer over one in-memory queue.
pub struct MemoryConsumer {
    queue: String,
    broker: MemoryBroker,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl BrokerConsumer for MemoryConsumer {
    type Delivery = MemoryDelivery;

    async fn next_delivery(&mut self) -> Option<MemoryDelivery> {
        let message = self.rx.recv().await?;
        Some(MemoryDelivery {
            queue: self.queue.clone(),
            broker: self.broker.clone(),
            message,
        })
    }
}

/// One in-memory delivery with its acknowledgment handle.
pub struct MemoryDelivery {
    queue: String,
    broker: MemoryBroker,
    message: Message,
}

impl BrokerDelivery for MemoryDelivery {
    fn body(&self) -> &[u8] {
        &self.message.body
    }

    fn content_type(&self) -> Option<&str> {
        Some(&self.message.content_type)
    }

    async fn resolve(self, disposition: Disposition) -> Result<(), BrokerError> {
        let mut inner = self.broker.lock();
        inner.resolutions.push((self.queue.clone(), disposition));
        match disposition {
            Disposition::Ack => {}
            Disposition::NackRequeue => {
                // Back of the queue; AMQP brokers don't promise FIFO-exact
                // placement after a requeue either.
                inner.enqueue(&self.queue, self.message);
            }
            Disposition::NackDiscard => {
                let dlx = inner
                    .queues
                    .get(&self.queue)
                    .map(|q| q.dead_letter_exchange.clone());
                if let Some(dlx) = dlx {
                    inner.route(&dlx, self.message);
                }
            }
        }
        Ok(())
    }
}

/// AMQP topic matching: `*` matches exactly one dot-separated word, `#`
/// matches zero or more.
fn topic_matches(pattern: &str, key: &str) -> bool {
    fn matches(pattern: &[&str], key: &[&str]) -> bool {
        match pattern.first() {
            None => key.is_empty(),
            Some(&"#") => {
                matches(&pattern[1..], key) || (!key.is_empty() && matches(pattern, &key[1..]))
            }
            Some(&"*") => !key.is_empty() && matches(&pattern[1..], &key[1..]),
            Some(&word) => {
                key.first().is_some_and(|k| *k == word) && matches(&pattern[1..], &key[1..])
            }
        }
    }
    let pattern: Vec<&str> = pattern.split('.').collect();
    let key: Vec<&str> = key.split('.').collect();
    matches(&pattern, &key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_key_matches_itself() {
        assert!(topic_matches("pause", "pause"));
        assert!(!topic_matches("pause", "resume"));
        assert!(!topic_matches("pause", "pause.alice"));
    }

    #[test]
    fn test_star_matches_one_word() {
        assert!(topic_matches("army_moves.*", "army_moves.alice"));
        assert!(!topic_matches("army_moves.*", "army_moves"));
        assert!(!topic_matches("army_moves.*", "army_moves.alice.extra"));
        assert!(!topic_matches("army_moves.*", "war.alice"));
    }

    #[test]
    fn test_hash_matches_zero_or_more() {
        assert!(topic_matches("#", "anything.at.all"));
        assert!(topic_matches("game_logs.#", "game_logs"));
        assert!(topic_matches("game_logs.#", "game_logs.alice.extra"));
        assert!(!topic_matches("game_logs.#", "war.alice"));
    }
}
