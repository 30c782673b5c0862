// Sync module - HOW FAST-SYNC TALKS
// Blockchain channel protocol, the peer messenger, and the consensus handoff

mod handoff;
mod messenger;
mod protocol;
mod reactor;

pub use handoff::{ConsensusReactor, CONSENSUS_REACTOR};
pub use messenger::{SwitchIo, SyncIo, SyncIoError};
pub use protocol::{
    BlockchainMessage, EncodingError, MessageType, ProtocolError, BLOCKCHAIN_CHANNEL,
    MAX_BLOCK_SIZE_BYTES, MAX_MSG_SIZE,
};
pub use reactor::{BlockchainConfig, BlockchainReactor, ConfigError, BLOCKCHAIN_REACTOR};
