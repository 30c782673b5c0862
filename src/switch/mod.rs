// Switch module - THE OVERLAY
// Peer registry, per-channel send queues, reactor registry and broadcast

mod channel;
mod peer;
mod overlay;

pub use channel::{ChannelDescriptor, ChannelId};
pub use peer::{Peer, PeerId, PeerReceiver, PeerSet};
pub use overlay::{Reactor, Switch, SwitchConfig, SwitchError};
