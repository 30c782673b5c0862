// Protocol - Messages on the blockchain channel
//
// Five messages travel on channel 0x40:
// - BlockRequest / BlockResponse / NoBlockResponse: fetching blocks by height
// - StatusRequest / StatusResponse: advertising the range a peer can serve

use crate::chain::Block;
use crate::switch::ChannelId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Channel for blocks and status updates
pub const BLOCKCHAIN_CHANNEL: ChannelId = 0x40;

/// Largest block a peer may send
pub const MAX_BLOCK_SIZE_BYTES: usize = 104_857_600; // 100MB

const BLOCK_RESPONSE_PREFIX_SIZE: usize = 4;
const FIELD_OVERHEAD: usize = 2;

/// Largest encoded message accepted on the blockchain channel
pub const MAX_MSG_SIZE: usize = MAX_BLOCK_SIZE_BYTES + BLOCK_RESPONSE_PREFIX_SIZE + FIELD_OVERHEAD;

/// Types of messages on the blockchain channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    BlockRequest,
    BlockResponse,
    NoBlockResponse,
    StatusResponse,
    StatusRequest,
}

/// Failure to turn a message into bytes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodingError {
    #[error("Serialization failed: {0}")]
    Serialize(String),

    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },
}

/// Failure to accept bytes received from a peer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Deserialization failed")]
    DeserializationFailed,

    #[error("Invalid message format")]
    InvalidFormat,

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Message too large")]
    MessageTooLarge,
}

/// A message on the blockchain channel
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockchainMessage {
    /// Ask a peer for the block at `height`
    BlockRequest { height: i64 },
    /// A requested block
    BlockResponse { block: Block },
    /// The peer does not have the requested block
    NoBlockResponse { height: i64 },
    /// The sender's latest height
    StatusResponse { height: i64 },
    /// Ask peers for their status, advertising our own range
    StatusRequest { base: i64, height: i64 },
}

impl BlockchainMessage {
    /// Get the message type
    pub fn message_type(&self) -> MessageType {
        match self {
            Self::BlockRequest { .. } => MessageType::BlockRequest,
            Self::BlockResponse { .. } => MessageType::BlockResponse,
            Self::NoBlockResponse { .. } => MessageType::NoBlockResponse,
            Self::StatusResponse { .. } => MessageType::StatusResponse,
            Self::StatusRequest { .. } => MessageType::StatusRequest,
        }
    }

    /// Serialize to bytes, refusing anything larger than `max_bytes`
    pub fn encode(&self, max_bytes: usize) -> Result<Vec<u8>, EncodingError> {
        let bytes =
            postcard::to_allocvec(self).map_err(|e| EncodingError::Serialize(e.to_string()))?;
        if bytes.len() > max_bytes {
            return Err(EncodingError::MessageTooLarge {
                size: bytes.len(),
                max: max_bytes,
            });
        }
        Ok(bytes)
    }

    /// Deserialize bytes received from a peer and check the result
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() > MAX_MSG_SIZE {
            return Err(ProtocolError::MessageTooLarge);
        }

        let (msg, rest): (Self, &[u8]) =
            postcard::take_from_bytes(bytes).map_err(|_| ProtocolError::DeserializationFailed)?;
        if !rest.is_empty() {
            return Err(ProtocolError::InvalidFormat);
        }

        msg.validate_basic()?;
        Ok(msg)
    }

    /// Stateless sanity checks on a received message
    pub fn validate_basic(&self) -> Result<(), ProtocolError> {
        match self {
            Self::BlockRequest { height }
            | Self::NoBlockResponse { height }
            | Self::StatusResponse { height } => {
                if *height < 0 {
                    return Err(ProtocolError::InvalidMessage("negative height".to_string()));
                }
            }
            Self::BlockResponse { block } => {
                if block.height() < 0 {
                    return Err(ProtocolError::InvalidMessage(
                        "negative block height".to_string(),
                    ));
                }
            }
            Self::StatusRequest { base, height } => {
                if *base < 0 {
                    return Err(ProtocolError::InvalidMessage("negative base".to_string()));
                }
                if *height < 0 {
                    return Err(ProtocolError::InvalidMessage("negative height".to_string()));
                }
                if base > height {
                    return Err(ProtocolError::InvalidMessage(format!(
                        "base {} cannot be greater than height {}",
                        base, height
                    )));
                }
            }
        }
        Ok(())
    }
}
