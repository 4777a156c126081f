use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::message::{BroadcastMessage, MessageKind};

/// Queue slack per viewer on top of a full replay.
const VIEWER_QUEUE_HEADROOM: usize = 512;

/// A published message together with its serialized wire form.
#[derive(Debug, Clone)]
pub struct Frame {
    pub message: Arc<BroadcastMessage>,
    pub json: Arc<str>,
}

/// Bounded FIFO of replayable messages; the oldest entry is evicted first.
#[derive(Debug)]
pub struct ReplayBuffer {
    entries: VecDeque<Frame>,
    capacity: usize,
}

impl ReplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, frame: Frame) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.entries.iter()
    }
}

/// Receiving side of one viewer registration.
pub struct Viewer {
    id: Uuid,
    rx: mpsc::Receiver<Frame>,
}

impl Viewer {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Next frame, or `None` once the hub dropped this viewer.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    /// Next frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.rx.try_recv().ok()
    }
}

struct HubInner {
    viewers: HashMap<Uuid, mpsc::Sender<Frame>>,
    replay: ReplayBuffer,
}

/// Viewer registry, replay buffer and fan-out.
///
/// `register`, `unregister` and `publish` are serialized by one lock, so a
/// viewer sees each replayable message exactly once: either in its replay or
/// live, in publish order.
#[derive(Clone)]
pub struct BroadcastHub {
    inner: Arc<Mutex<HubInner>>,
    queue_capacity: usize,
}

impl BroadcastHub {
    pub fn new(replay_capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HubInner {
                viewers: HashMap::new(),
                replay: ReplayBuffer::new(replay_capacity),
            })),
            queue_capacity: replay_capacity + VIEWER_QUEUE_HEADROOM,
        }
    }

    /// Add a viewer and queue the current replay buffer for it.
    pub async fn register(&self) -> Viewer {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel(self.queue_capacity);

        let mut inner = self.inner.lock().await;
        for frame in inner.replay.iter() {
            // Fresh queue is larger than the replay buffer.
            if tx.try_send(frame.clone()).is_err() {
                warn!(viewer = %id, "Replay truncated for new viewer");
                break;
            }
        }
        let replayed = inner.replay.len();
        inner.viewers.insert(id, tx);

        info!(viewer = %id, replayed, viewers = inner.viewers.len(), "Viewer registered");

        Viewer { id, rx }
    }

    /// Remove a viewer. Returns whether it was still registered.
    pub async fn unregister(&self, id: Uuid) -> bool {
        let mut inner = self.inner.lock().await;
        let removed = inner.viewers.remove(&id).is_some();
        if removed {
            info!(viewer = %id, viewers = inner.viewers.len(), "Viewer unregistered");
        }
        removed
    }

    /// Record (if replayable) and fan out a message.
    ///
    /// A viewer whose queue is closed or full is dropped without affecting
    /// delivery to the others. Returns the number of viewers reached.
    pub async fn publish(&self, message: BroadcastMessage) -> usize {
        let json: Arc<str> = match serde_json::to_string(&message) {
            Ok(json) => json.into(),
            Err(e) => {
                error!("Failed to serialize broadcast message: {}", e);
                return 0;
            }
        };
        let frame = Frame {
            message: Arc::new(message),
            json,
        };

        let mut inner = self.inner.lock().await;

        if frame.message.kind.is_replayed() {
            inner.replay.push(frame.clone());
        }

        let mut failed = Vec::new();
        for (id, tx) in &inner.viewers {
            if let Err(e) = tx.try_send(frame.clone()) {
                debug!(viewer = %id, "Send failed: {}", e);
                failed.push(*id);
            }
        }

        for id in &failed {
            inner.viewers.remove(id);
            warn!(viewer = %id, "Dropped viewer after failed send");
        }

        inner.viewers.len()
    }

    pub async fn viewer_count(&self) -> usize {
        self.inner.lock().await.viewers.len()
    }

    pub async fn replay_len(&self) -> usize {
        self.inner.lock().await.replay.len()
    }

    /// Text of the buffered final messages, oldest first.
    pub async fn final_lines(&self) -> Vec<String> {
        let inner = self.inner.lock().await;
        inner
            .replay
            .iter()
            .filter(|f| f.message.kind == MessageKind::Final)
            .map(|f| f.message.text.clone())
            .collect()
    }
}
