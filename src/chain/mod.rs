// Chain module - WHAT GETS SYNCED
// Blocks and the chain state snapshot handed to consensus after fast-sync

mod block;
mod state;

pub use block::{Block, BlockHeader, BlockId};
pub use state::ChainState;
