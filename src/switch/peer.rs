// Peers - Connection handles and the registry that resolves them
//
// A Peer is the sending half of a connection: one bounded queue per channel.
// The receiving half (PeerReceiver) belongs to whoever drains the connection.

use crate::switch::{ChannelDescriptor, ChannelId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};

/// Identifier of a peer in the overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId([u8; 20]);

impl PeerId {
    /// Generate a random peer ID
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut bytes = [0u8; 20];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Sending half of a peer connection
#[derive(Debug)]
pub struct Peer {
    id: PeerId,
    queues: HashMap<ChannelId, mpsc::Sender<Vec<u8>>>,
    running: AtomicBool,
}

impl Peer {
    /// Create a peer with one bounded send queue per channel
    pub fn new(id: PeerId, channels: &[ChannelDescriptor]) -> (Self, PeerReceiver) {
        let mut queues = HashMap::new();
        let mut receivers = HashMap::new();

        for desc in channels {
            let (tx, rx) = mpsc::channel(desc.send_queue_capacity);
            queues.insert(desc.id, tx);
            receivers.insert(desc.id, rx);
        }

        let peer = Self {
            id,
            queues,
            running: AtomicBool::new(true),
        };
        (peer, PeerReceiver { id, receivers })
    }

    /// Get the peer ID
    pub fn id(&self) -> &PeerId {
        &self.id
    }

    /// Check if the connection still accepts writes
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Mark the connection as closed; later sends are refused
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    /// Queue `bytes` on `channel` without blocking.
    ///
    /// Returns false if the channel is unknown, the queue is full, or the
    /// connection is no longer writable.
    pub fn try_send(&self, channel: ChannelId, bytes: Vec<u8>) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(queue) = self.queues.get(&channel) else {
            return false;
        };

        match queue.try_send(bytes) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Closed(_)) => false,
        }
    }

    /// Number of free slots left in the queue for `channel`
    pub fn remaining_capacity(&self, channel: ChannelId) -> usize {
        self.queues
            .get(&channel)
            .map(|q| q.capacity())
            .unwrap_or(0)
    }
}

/// Receiving half of a peer connection
#[derive(Debug)]
pub struct PeerReceiver {
    id: PeerId,
    receivers: HashMap<ChannelId, mpsc::Receiver<Vec<u8>>>,
}

impl PeerReceiver {
    /// ID of the peer this receiver drains
    pub fn id(&self) -> &PeerId {
        &self.id
    }

    /// Take the next queued message on `channel`, if any
    pub fn try_recv(&mut self, channel: ChannelId) -> Option<Vec<u8>> {
        let rx = self.receivers.get_mut(&channel)?;
        match rx.try_recv() {
            Ok(bytes) => Some(bytes),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Take every message currently queued on `channel`
    pub fn drain(&mut self, channel: ChannelId) -> Vec<Vec<u8>> {
        let mut out = Vec::new();
        while let Some(bytes) = self.try_recv(channel) {
            out.push(bytes);
        }
        out
    }
}

/// Registry of connected peers.
///
/// Shared with the connection layer, which adds and removes peers at any
/// time. Lookups return a snapshot that may be stale by the time it is used.
#[derive(Debug, Default)]
pub struct PeerSet {
    peers: RwLock<HashMap<PeerId, Arc<Peer>>>,
}

impl PeerSet {
    /// Create an empty peer set
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a peer ID to its connection handle
    pub fn get(&self, id: &PeerId) -> Option<Arc<Peer>> {
        self.peers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Check if a peer is connected
    pub fn has(&self, id: &PeerId) -> bool {
        self.peers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Number of connected peers
    pub fn size(&self) -> usize {
        self.peers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Snapshot of all connected peers
    pub fn list(&self) -> Vec<Arc<Peer>> {
        self.peers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Insert a peer; returns false if one with the same ID is present
    pub(crate) fn add(&self, peer: Arc<Peer>) -> bool {
        let mut peers = self.peers.write().unwrap_or_else(PoisonError::into_inner);
        if peers.contains_key(peer.id()) {
            return false;
        }
        peers.insert(*peer.id(), peer);
        true
    }

    pub(crate) fn remove(&self, id: &PeerId) -> Option<Arc<Peer>> {
        self.peers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }
}
