// blocksync demo - wires an in-process switch and exercises the messenger

use blocksync::chain::{Block, ChainState};
use blocksync::switch::{
    ChannelDescriptor, PeerId, PeerReceiver, Reactor, Switch, SwitchConfig,
};
use blocksync::sync::{
    BlockchainConfig, BlockchainMessage, BlockchainReactor, ConsensusReactor, SwitchIo, SyncIo,
    BLOCKCHAIN_CHANNEL, BLOCKCHAIN_REACTOR, CONSENSUS_REACTOR,
};
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "blocksync", about = "Fast-sync network I/O demo")]
struct Args {
    /// Number of connected peers
    #[arg(long, default_value_t = 3)]
    peers: usize,

    /// Lowest block height this node stores
    #[arg(long, default_value_t = 1)]
    base: i64,

    /// Latest block height this node stores
    #[arg(long, default_value_t = 10)]
    height: i64,

    /// Outbound queue size per peer
    #[arg(long, default_value_t = 1000)]
    queue_capacity: usize,

    /// Register a consensus reactor to hand off to
    #[arg(long)]
    with_consensus: bool,
}

/// Consensus stand-in that just logs the handoff
struct LoggingConsensus;

impl Reactor for LoggingConsensus {
    fn channels(&self) -> Vec<ChannelDescriptor> {
        Vec::new()
    }

    fn into_consensus(self: Arc<Self>) -> Option<Arc<dyn ConsensusReactor>> {
        Some(self)
    }
}

impl ConsensusReactor for LoggingConsensus {
    fn switch_to_consensus(&self, state: ChainState, blocks_synced: usize) {
        info!(
            chain_id = state.chain_id(),
            height = state.last_block_height(),
            blocks_synced,
            "Consensus took over"
        );
    }
}

fn report(receivers: &mut [PeerReceiver]) {
    for rx in receivers.iter_mut() {
        let id = *rx.id();
        for bytes in rx.drain(BLOCKCHAIN_CHANNEL) {
            match BlockchainMessage::decode(&bytes) {
                Ok(msg) => info!(peer = %id, size = bytes.len(), ?msg, "Peer received"),
                Err(e) => warn!(peer = %id, error = %e, "Undecodable message"),
            }
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = BlockchainConfig::new().with_send_queue_capacity(args.queue_capacity);

    let mut switch = Switch::new(
        PeerId::generate(),
        SwitchConfig::new().with_max_peers(args.peers.max(1)),
    )?;
    switch.add_reactor(
        BLOCKCHAIN_REACTOR,
        Arc::new(BlockchainReactor::new(config.clone())?),
    )?;
    if args.with_consensus {
        switch.add_reactor(CONSENSUS_REACTOR, Arc::new(LoggingConsensus))?;
    }

    let mut receivers = Vec::with_capacity(args.peers);
    for _ in 0..args.peers {
        receivers.push(switch.add_peer(PeerId::generate())?);
    }
    let peer_ids: Vec<PeerId> = receivers.iter().map(|rx| *rx.id()).collect();

    let switch = Arc::new(switch);
    let io = SwitchIo::new(switch, config)?;
    info!(peers = peer_ids.len(), "Switch ready");

    io.broadcast_status_request(args.base, args.height)?;

    let mut state = ChainState::new("blocksync-demo", args.base);
    let mut last_id = None;
    for (i, peer) in peer_ids.iter().enumerate() {
        let height = args.base + i as i64;
        if height > args.height {
            io.send_block_not_found(height, peer)?;
            continue;
        }

        io.send_block_request(peer, height + 1)?;
        let block = Block::new(state.chain_id(), height, last_id, vec![vec![i as u8; 32]]);
        io.send_block_to_peer(Some(&block), peer)?;
        io.send_status_response(args.height, peer)?;

        state.advance(&block);
        last_id = Some(block.id());
    }

    report(&mut receivers);

    let synced = (state.last_block_height() - args.base + 1).max(0) as usize;
    io.try_switch_to_consensus(state, synced);
    Ok(())
}
