// Blockchain Reactor - Claims the blockchain channel on the switch

use crate::switch::{ChannelDescriptor, Reactor};
use crate::sync::protocol::{BLOCKCHAIN_CHANNEL, MAX_MSG_SIZE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name the blockchain reactor is registered under on the switch
pub const BLOCKCHAIN_REACTOR: &str = "BLOCKCHAIN";

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for the blockchain channel and messenger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainConfig {
    /// Send priority of the blockchain channel
    pub priority: u8,
    /// Outbound queue size per peer, in messages
    pub send_queue_capacity: usize,
    /// Receive buffer size in bytes
    pub recv_buffer_capacity: usize,
    /// Largest encoded message sent or received
    pub max_msg_bytes: usize,
    /// Switch name of the reactor that takes over after sync
    pub consensus_reactor: String,
}

impl Default for BlockchainConfig {
    fn default() -> Self {
        Self {
            priority: 5,
            send_queue_capacity: 1000,
            recv_buffer_capacity: 50 * 4096,
            max_msg_bytes: MAX_MSG_SIZE,
            consensus_reactor: crate::sync::CONSENSUS_REACTOR.to_string(),
        }
    }
}

impl BlockchainConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_send_queue_capacity(mut self, capacity: usize) -> Self {
        self.send_queue_capacity = capacity;
        self
    }

    pub fn with_max_msg_bytes(mut self, max: usize) -> Self {
        self.max_msg_bytes = max;
        self
    }

    pub fn with_consensus_reactor(mut self, name: &str) -> Self {
        self.consensus_reactor = name.to_string();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.send_queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "send_queue_capacity cannot be 0".to_string(),
            ));
        }
        if self.max_msg_bytes == 0 {
            return Err(ConfigError::Invalid("max_msg_bytes cannot be 0".to_string()));
        }
        if self.max_msg_bytes > MAX_MSG_SIZE {
            return Err(ConfigError::Invalid(format!(
                "max_msg_bytes cannot exceed {}",
                MAX_MSG_SIZE
            )));
        }
        Ok(())
    }

    /// Descriptor of the blockchain channel under this configuration
    pub fn channel_descriptor(&self) -> ChannelDescriptor {
        ChannelDescriptor::new(BLOCKCHAIN_CHANNEL)
            .with_priority(self.priority)
            .with_send_queue_capacity(self.send_queue_capacity)
            .with_recv_buffer_capacity(self.recv_buffer_capacity)
            .with_recv_message_capacity(self.max_msg_bytes)
    }
}

/// Switch-side presence of fast-sync: owns the blockchain channel
#[derive(Debug, Clone)]
pub struct BlockchainReactor {
    config: BlockchainConfig,
}

impl BlockchainReactor {
    pub fn new(config: BlockchainConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BlockchainConfig {
        &self.config
    }
}

impl Reactor for BlockchainReactor {
    fn channels(&self) -> Vec<ChannelDescriptor> {
        vec![self.config.channel_descriptor()]
    }
}
