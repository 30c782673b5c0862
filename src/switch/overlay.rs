// Switch - Owns the peer set and the registered reactors
//
// Reactors are wired before the switch is shared; peers come and go
// afterwards through `add_peer` / `stop_peer`.

use crate::switch::{ChannelDescriptor, ChannelId, Peer, PeerId, PeerReceiver, PeerSet};
use crate::sync::ConsensusReactor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

/// Switch-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwitchError {
    #[error("Cannot add self as a peer")]
    CannotAddSelf,

    #[error("Peer already connected: {0}")]
    DuplicatePeer(PeerId),

    #[error("Maximum peers reached")]
    MaxPeersReached,

    #[error("Reactor already registered: {0}")]
    DuplicateReactor(String),

    #[error("Channel 0x{0:02X} already claimed by another reactor")]
    DuplicateChannel(ChannelId),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A subsystem that communicates over one or more switch channels
pub trait Reactor: Send + Sync {
    /// Channels this reactor sends and receives on
    fn channels(&self) -> Vec<ChannelDescriptor>;

    /// The consensus handoff capability, if this reactor has one
    fn into_consensus(self: Arc<Self>) -> Option<Arc<dyn ConsensusReactor>> {
        None
    }
}

/// Configuration for the switch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// Maximum number of simultaneously connected peers
    pub max_peers: usize,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self { max_peers: 50 }
    }
}

impl SwitchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_peers(mut self, max: usize) -> Self {
        self.max_peers = max;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), SwitchError> {
        if self.max_peers == 0 {
            return Err(SwitchError::InvalidConfig("max_peers cannot be 0".to_string()));
        }
        Ok(())
    }
}

/// The overlay switch
pub struct Switch {
    node_id: PeerId,
    config: SwitchConfig,
    peers: PeerSet,
    reactors: HashMap<String, Arc<dyn Reactor>>,
    channels: Vec<ChannelDescriptor>,
}

impl Switch {
    /// Create a switch for the local node
    pub fn new(node_id: PeerId, config: SwitchConfig) -> Result<Self, SwitchError> {
        config.validate()?;
        Ok(Self {
            node_id,
            config,
            peers: PeerSet::new(),
            reactors: HashMap::new(),
            channels: Vec::new(),
        })
    }

    /// Get the local node ID
    pub fn node_id(&self) -> &PeerId {
        &self.node_id
    }

    /// Register a reactor under `name` and claim its channels
    pub fn add_reactor(&mut self, name: &str, reactor: Arc<dyn Reactor>) -> Result<(), SwitchError> {
        if self.reactors.contains_key(name) {
            return Err(SwitchError::DuplicateReactor(name.to_string()));
        }

        let descriptors = reactor.channels();
        for desc in &descriptors {
            desc.validate().map_err(SwitchError::InvalidConfig)?;
            if self.channels.iter().any(|c| c.id == desc.id) {
                return Err(SwitchError::DuplicateChannel(desc.id));
            }
        }

        debug!(reactor = name, channels = descriptors.len(), "Registered reactor");
        self.channels.extend(descriptors);
        self.reactors.insert(name.to_string(), reactor);
        Ok(())
    }

    /// Look up a reactor by name
    pub fn reactor(&self, name: &str) -> Option<Arc<dyn Reactor>> {
        self.reactors.get(name).cloned()
    }

    /// All channels claimed by registered reactors
    pub fn channels(&self) -> &[ChannelDescriptor] {
        &self.channels
    }

    /// The set of connected peers
    pub fn peers(&self) -> &PeerSet {
        &self.peers
    }

    /// Connect a peer, opening a send queue on every registered channel.
    ///
    /// Returns the receiving half of the new connection.
    pub fn add_peer(&self, id: PeerId) -> Result<PeerReceiver, SwitchError> {
        if id == self.node_id {
            return Err(SwitchError::CannotAddSelf);
        }
        if self.peers.size() >= self.config.max_peers {
            return Err(SwitchError::MaxPeersReached);
        }

        let (peer, receiver) = Peer::new(id, &self.channels);
        if !self.peers.add(Arc::new(peer)) {
            return Err(SwitchError::DuplicatePeer(id));
        }

        debug!(peer = %id, "Added peer");
        Ok(receiver)
    }

    /// Disconnect a peer. Handles already resolved by callers stop accepting
    /// writes.
    pub fn stop_peer(&self, id: &PeerId) -> bool {
        match self.peers.remove(id) {
            Some(peer) => {
                peer.stop();
                debug!(peer = %id, "Stopped peer");
                true
            }
            None => false,
        }
    }

    /// Queue `bytes` on `channel` for every connected peer.
    ///
    /// Each peer is tried independently; a full or closed queue drops the
    /// message for that peer only. Returns how many peers accepted it.
    pub fn broadcast(&self, channel: ChannelId, bytes: Vec<u8>) -> usize {
        let peers = self.peers.list();
        let mut queued = 0;

        for peer in &peers {
            if peer.try_send(channel, bytes.clone()) {
                queued += 1;
            } else {
                debug!(peer = %peer.id(), channel, "Broadcast dropped for peer");
            }
        }

        trace!(channel, queued, total = peers.len(), "Broadcast fan-out");
        queued
    }
}
