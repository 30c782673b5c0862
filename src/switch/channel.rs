// Channels - Logical sub-streams multiplexed over each peer connection

use serde::{Deserialize, Serialize};

/// Identifier of a logical channel on a peer connection
pub type ChannelId = u8;

/// Describes one channel a reactor communicates on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDescriptor {
    pub id: ChannelId,
    /// Relative send priority among channels of the same peer
    pub priority: u8,
    /// Number of messages that may wait in a peer's outbound queue
    pub send_queue_capacity: usize,
    /// Receive buffer size in bytes
    pub recv_buffer_capacity: usize,
    /// Largest message accepted on this channel
    pub recv_message_capacity: usize,
}

impl ChannelDescriptor {
    pub fn new(id: ChannelId) -> Self {
        Self {
            id,
            priority: 1,
            send_queue_capacity: 1,
            recv_buffer_capacity: 4096,
            recv_message_capacity: 22020096, // 21MB
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_send_queue_capacity(mut self, capacity: usize) -> Self {
        self.send_queue_capacity = capacity;
        self
    }

    pub fn with_recv_buffer_capacity(mut self, capacity: usize) -> Self {
        self.recv_buffer_capacity = capacity;
        self
    }

    pub fn with_recv_message_capacity(mut self, capacity: usize) -> Self {
        self.recv_message_capacity = capacity;
        self
    }

    /// Validate the descriptor
    pub fn validate(&self) -> Result<(), String> {
        if self.send_queue_capacity == 0 {
            return Err(format!(
                "channel 0x{:02X}: send_queue_capacity cannot be 0",
                self.id
            ));
        }
        if self.recv_message_capacity == 0 {
            return Err(format!(
                "channel 0x{:02X}: recv_message_capacity cannot be 0",
                self.id
            ));
        }
        Ok(())
    }
}
