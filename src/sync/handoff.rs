// Consensus Handoff - Leaving fast-sync
//
// When fast-sync catches up, control of block production moves to the
// consensus engine. A node without one (a pure sync client) just stays put.

use crate::chain::ChainState;

/// Name the consensus reactor is registered under on the switch
pub const CONSENSUS_REACTOR: &str = "CONSENSUS";

/// Capability of accepting control once fast-sync completes
pub trait ConsensusReactor: Send + Sync {
    /// Take over from fast-sync with the synced `state`
    fn switch_to_consensus(&self, state: ChainState, blocks_synced: usize);
}
