// blocksync - Network I/O for blockchain fast-sync
//
// Turns fast-sync actions into messages on the blockchain channel of a
// peer-to-peer overlay, and hands control to consensus once synced.

pub mod chain;
pub mod switch;
pub mod sync;
