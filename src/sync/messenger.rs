// Messenger - Fast-sync's view of the network
//
// Every send resolves the peer, builds one message, encodes it once and
// tries to queue it on the blockchain channel without blocking. Nothing is
// retried here: the sync scheduler decides whether to try another peer.

use crate::chain::{Block, ChainState};
use crate::switch::{Peer, PeerId, Switch};
use crate::sync::handoff::ConsensusReactor;
use crate::sync::protocol::{BlockchainMessage, EncodingError, BLOCKCHAIN_CHANNEL};
use crate::sync::reactor::{BlockchainConfig, ConfigError};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace};

/// Errors returned by send operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncIoError {
    #[error("Peer not found: {0}")]
    PeerNotFound(PeerId),

    #[error("Encoding failed: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Send queue full for peer {0}")]
    QueueFull(PeerId),
}

impl SyncIoError {
    /// Check if the failure is tied to the target peer, so another peer may
    /// succeed
    pub fn is_peer_error(&self) -> bool {
        matches!(self, Self::PeerNotFound(_) | Self::QueueFull(_))
    }
}

/// Network operations used by the fast-sync scheduler
pub trait SyncIo {
    /// Ask `peer` for the block at `height`
    fn send_block_request(&self, peer: &PeerId, height: i64) -> Result<(), SyncIoError>;

    /// Send a block to `peer`.
    ///
    /// # Panics
    ///
    /// Panics if `block` is `None`: answering a request without a block is a
    /// caller bug, use `send_block_not_found` instead.
    fn send_block_to_peer(&self, block: Option<&Block>, peer: &PeerId) -> Result<(), SyncIoError>;

    /// Tell `peer` we do not have the block at `height`
    fn send_block_not_found(&self, height: i64, peer: &PeerId) -> Result<(), SyncIoError>;

    /// Tell `peer` our latest height
    fn send_status_response(&self, height: i64, peer: &PeerId) -> Result<(), SyncIoError>;

    /// Ask every connected peer for its status.
    ///
    /// Succeeds once the fan-out is started; peers whose queues refuse the
    /// message are skipped silently.
    fn broadcast_status_request(&self, base: i64, height: i64) -> Result<(), SyncIoError>;

    /// Hand control to the consensus engine, if this node runs one
    fn try_switch_to_consensus(&self, state: ChainState, blocks_synced: usize);
}

/// `SyncIo` backed by the overlay switch
pub struct SwitchIo {
    switch: Arc<Switch>,
    consensus: Option<Arc<dyn ConsensusReactor>>,
    config: BlockchainConfig,
}

impl SwitchIo {
    /// Create a messenger on `switch`.
    ///
    /// The consensus reactor is looked up once, here, under the configured
    /// name; register reactors before creating the messenger.
    pub fn new(switch: Arc<Switch>, config: BlockchainConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let consensus = switch
            .reactor(&config.consensus_reactor)
            .and_then(|reactor| reactor.into_consensus());

        Ok(Self {
            switch,
            consensus,
            config,
        })
    }

    /// Use `consensus` as the handoff target instead of the switch registry
    pub fn with_consensus(mut self, consensus: Arc<dyn ConsensusReactor>) -> Self {
        self.consensus = Some(consensus);
        self
    }

    /// Check if a consensus handoff target is wired
    pub fn has_consensus(&self) -> bool {
        self.consensus.is_some()
    }

    /// Get the configuration
    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }

    fn resolve(&self, peer_id: &PeerId) -> Result<Arc<Peer>, SyncIoError> {
        self.switch
            .peers()
            .get(peer_id)
            .ok_or(SyncIoError::PeerNotFound(*peer_id))
    }

    fn send(&self, peer: &Peer, msg: &BlockchainMessage) -> Result<(), SyncIoError> {
        let bytes = msg.encode(self.config.max_msg_bytes)?;
        let size = bytes.len();

        if !peer.try_send(BLOCKCHAIN_CHANNEL, bytes) {
            return Err(SyncIoError::QueueFull(*peer.id()));
        }

        trace!(peer = %peer.id(), msg_type = ?msg.message_type(), size, "Queued message");
        Ok(())
    }
}

impl SyncIo for SwitchIo {
    fn send_block_request(&self, peer_id: &PeerId, height: i64) -> Result<(), SyncIoError> {
        let peer = self.resolve(peer_id)?;
        self.send(&peer, &BlockchainMessage::BlockRequest { height })
    }

    fn send_block_to_peer(&self, block: Option<&Block>, peer_id: &PeerId) -> Result<(), SyncIoError> {
        let peer = self.resolve(peer_id)?;
        let Some(block) = block else {
            panic!("trying to send nil block");
        };
        let msg = BlockchainMessage::BlockResponse {
            block: block.clone(),
        };
        self.send(&peer, &msg)
    }

    fn send_block_not_found(&self, height: i64, peer_id: &PeerId) -> Result<(), SyncIoError> {
        let peer = self.resolve(peer_id)?;
        self.send(&peer, &BlockchainMessage::NoBlockResponse { height })
    }

    fn send_status_response(&self, height: i64, peer_id: &PeerId) -> Result<(), SyncIoError> {
        let peer = self.resolve(peer_id)?;
        self.send(&peer, &BlockchainMessage::StatusResponse { height })
    }

    fn broadcast_status_request(&self, base: i64, height: i64) -> Result<(), SyncIoError> {
        let msg = BlockchainMessage::StatusRequest { base, height };
        let bytes = msg.encode(self.config.max_msg_bytes)?;

        let queued = self.switch.broadcast(BLOCKCHAIN_CHANNEL, bytes);
        trace!(base, height, queued, "Broadcast status request");
        Ok(())
    }

    fn try_switch_to_consensus(&self, state: ChainState, blocks_synced: usize) {
        match &self.consensus {
            Some(consensus) => {
                info!(
                    height = state.last_block_height(),
                    blocks_synced, "Switching to consensus"
                );
                consensus.switch_to_consensus(state, blocks_synced);
            }
            None => {
                debug!(blocks_synced, "No consensus reactor, staying in fast-sync");
            }
        }
    }
}
