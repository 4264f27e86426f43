pub mod consensus;
pub mod peers;

pub use peers::{announce_block, join_network, register_peer};
