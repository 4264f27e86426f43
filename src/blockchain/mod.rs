pub mod block;
pub mod model;

pub use block::{Block, Record};
pub use model::Blockchain;

/// Proof-of-Work difficulty: required count of leading zero hex characters
/// in an admissible block hash. Fixed for the life of the process.
pub const POW_DIFFICULTY: u32 = 2;
