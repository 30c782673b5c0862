// Chain State - Snapshot of the synced chain
//
// Handed to consensus when fast-sync completes.

use crate::chain::{Block, BlockId};
use serde::{Deserialize, Serialize};

/// Snapshot of the chain after the last applied block
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainState {
    chain_id: String,
    initial_height: i64,
    last_block_height: i64,
    last_block_id: Option<BlockId>,
    app_hash: Vec<u8>,
}

impl ChainState {
    /// Create the state of an empty chain starting at `initial_height`
    pub fn new(chain_id: &str, initial_height: i64) -> Self {
        Self {
            chain_id: chain_id.to_string(),
            initial_height,
            last_block_height: initial_height - 1,
            last_block_id: None,
            app_hash: Vec::new(),
        }
    }

    /// Set the application hash
    pub fn with_app_hash(mut self, app_hash: Vec<u8>) -> Self {
        self.app_hash = app_hash;
        self
    }

    /// Record `block` as the latest applied block
    pub fn advance(&mut self, block: &Block) {
        self.last_block_height = block.height();
        self.last_block_id = Some(block.id());
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn initial_height(&self) -> i64 {
        self.initial_height
    }

    pub fn last_block_height(&self) -> i64 {
        self.last_block_height
    }

    pub fn last_block_id(&self) -> Option<&BlockId> {
        self.last_block_id.as_ref()
    }

    pub fn app_hash(&self) -> &[u8] {
        &self.app_hash
    }

    /// Height of the next block to sync
    pub fn next_height(&self) -> i64 {
        self.last_block_height + 1
    }
}
