// Block - The unit of fast-sync transfer
//
// Blocks are produced and verified elsewhere; this crate only carries them
// between peers, so the model is deliberately small: a header plus raw txs.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Hash identifying a block
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId([u8; 32]);

impl BlockId {
    /// Create from raw bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0[..8]))
    }
}

/// Block header
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    chain_id: String,
    height: i64,
    /// Unix timestamp in milliseconds
    time_ms: u64,
    last_block_id: Option<BlockId>,
    /// SHA-256 over the block's transactions
    data_hash: [u8; 32],
}

impl BlockHeader {
    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn height(&self) -> i64 {
        self.height
    }

    pub fn time_ms(&self) -> u64 {
        self.time_ms
    }

    pub fn last_block_id(&self) -> Option<&BlockId> {
        self.last_block_id.as_ref()
    }

    pub fn data_hash(&self) -> &[u8; 32] {
        &self.data_hash
    }
}

/// A block: header plus opaque transactions
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    header: BlockHeader,
    txs: Vec<Vec<u8>>,
}

impl Block {
    /// Create a new block at `height` on top of `last_block_id`
    pub fn new(
        chain_id: &str,
        height: i64,
        last_block_id: Option<BlockId>,
        txs: Vec<Vec<u8>>,
    ) -> Self {
        let time_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let header = BlockHeader {
            chain_id: chain_id.to_string(),
            height,
            time_ms,
            last_block_id,
            data_hash: Self::hash_txs(&txs),
        };

        Self { header, txs }
    }

    /// Get the header
    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    /// Get the height
    pub fn height(&self) -> i64 {
        self.header.height
    }

    /// Get the transactions
    pub fn txs(&self) -> &[Vec<u8>] {
        &self.txs
    }

    /// Hash of the header, used as the block's identity
    pub fn id(&self) -> BlockId {
        let mut hasher = Sha256::new();
        hasher.update(b"block:");
        hasher.update(postcard::to_allocvec(&self.header).unwrap_or_default());
        let result = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        BlockId(bytes)
    }

    /// Check the header's data hash against the carried transactions
    pub fn has_consistent_data(&self) -> bool {
        Self::hash_txs(&self.txs) == self.header.data_hash
    }

    fn hash_txs(txs: &[Vec<u8>]) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"txs:");
        for tx in txs {
            hasher.update((tx.len() as u64).to_le_bytes());
            hasher.update(tx);
        }
        let result = hasher.finalize();
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&result);
        bytes
    }
}
