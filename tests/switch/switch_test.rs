// Switch Tests
// Tests for the overlay: peer registry, send queues, reactors and broadcast

use blocksync::switch::{
    ChannelDescriptor, ChannelId, PeerId, Reactor, Switch, SwitchConfig, SwitchError,
};
use std::sync::Arc;

const CHANNEL: ChannelId = 0x40;

struct TestReactor {
    capacity: usize,
}

impl Reactor for TestReactor {
    fn channels(&self) -> Vec<ChannelDescriptor> {
        vec![ChannelDescriptor::new(CHANNEL).with_send_queue_capacity(self.capacity)]
    }
}

fn create_switch(capacity: usize) -> Switch {
    let mut sw = Switch::new(PeerId::generate(), SwitchConfig::default()).unwrap();
    sw.add_reactor("TEST", Arc::new(TestReactor { capacity })).unwrap();
    sw
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn test_switch_config_default() {
    let config = SwitchConfig::default();
    assert!(config.max_peers > 0);
    assert!(config.validate().is_ok());
}

#[test]
fn test_switch_config_zero_peers_invalid() {
    let config = SwitchConfig::new().with_max_peers(0);
    assert!(matches!(
        config.validate(),
        Err(SwitchError::InvalidConfig(_))
    ));
}

// ============================================================================
// REACTORS
// ============================================================================

#[test]
fn test_reactor_lookup() {
    let sw = create_switch(4);

    assert!(sw.reactor("TEST").is_some());
    assert!(sw.reactor("MISSING").is_none());
    assert_eq!(sw.channels().len(), 1);
    assert_eq!(sw.channels()[0].id, CHANNEL);
}

#[test]
fn test_reactor_with_invalid_channel_rejected() {
    let mut sw = Switch::new(PeerId::generate(), SwitchConfig::default()).unwrap();
    let result = sw.add_reactor("BAD", Arc::new(TestReactor { capacity: 0 }));

    assert!(matches!(result, Err(SwitchError::InvalidConfig(_))));
    assert!(sw.reactor("BAD").is_none());
}

#[test]
fn test_plain_reactor_has_no_consensus_capability() {
    let sw = create_switch(4);
    let reactor = sw.reactor("TEST").unwrap();

    assert!(reactor.into_consensus().is_none());
}

// ============================================================================
// PEERS
// ============================================================================

#[test]
fn test_add_and_resolve_peer() {
    let sw = create_switch(4);
    let id = PeerId::generate();
    let _rx = sw.add_peer(id).unwrap();

    let peer = sw.peers().get(&id).unwrap();
    assert_eq!(peer.id(), &id);
    assert!(peer.is_running());
    assert_eq!(peer.remaining_capacity(CHANNEL), 4);
}

#[test]
fn test_duplicate_peer_rejected() {
    let sw = create_switch(4);
    let id = PeerId::generate();
    let _rx = sw.add_peer(id).unwrap();

    assert_eq!(sw.add_peer(id).unwrap_err(), SwitchError::DuplicatePeer(id));
    assert_eq!(sw.peers().size(), 1);
}

#[test]
fn test_peer_queue_round_trip() {
    let sw = create_switch(4);
    let id = PeerId::generate();
    let mut rx = sw.add_peer(id).unwrap();

    let peer = sw.peers().get(&id).unwrap();
    assert!(peer.try_send(CHANNEL, b"hello".to_vec()));

    assert_eq!(rx.try_recv(CHANNEL), Some(b"hello".to_vec()));
    assert_eq!(rx.try_recv(CHANNEL), None);
}

#[test]
fn test_stop_peer_removes_from_set() {
    let sw = create_switch(4);
    let id = PeerId::generate();
    let _rx = sw.add_peer(id).unwrap();

    assert!(sw.stop_peer(&id));
    assert!(!sw.peers().has(&id));
    assert!(sw.peers().get(&id).is_none());
}

// ============================================================================
// BROADCAST
// ============================================================================

#[test]
fn test_broadcast_reaches_every_peer() {
    let sw = create_switch(4);
    let mut receivers: Vec<_> = (0..3).map(|_| sw.add_peer(PeerId::generate()).unwrap()).collect();

    assert_eq!(sw.broadcast(CHANNEL, vec![7, 7, 7]), 3);

    for rx in receivers.iter_mut() {
        assert_eq!(rx.drain(CHANNEL), vec![vec![7, 7, 7]]);
    }
}

#[test]
fn test_broadcast_with_no_peers() {
    let sw = create_switch(4);
    assert_eq!(sw.broadcast(CHANNEL, vec![1]), 0);
}

#[test]
fn test_broadcast_skips_closed_peer() {
    let sw = create_switch(4);
    let _rx_a = sw.add_peer(PeerId::generate()).unwrap();
    let rx_b = sw.add_peer(PeerId::generate()).unwrap();
    drop(rx_b);

    assert_eq!(sw.broadcast(CHANNEL, vec![1]), 1);
}
