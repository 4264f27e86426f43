use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// An opaque record payload carried by the ledger. The engine stores and
/// hashes records but never interprets their contents.
pub type Record = Value;

/// A single block in the ledger holding a batch of records plus the
/// Proof-of-Work that admitted it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub records: Vec<Record>,
    pub timestamp: i64, // Unix timestamp (UTC)
    pub previous_hash: String,
    pub local_accuracy: f64, // carried, never interpreted
    pub model_params: Value, // carried, never interpreted
    pub nonce: u64,          // Proof-of-Work nonce
    pub hash: String,        // assigned only when a proof is accepted
}

impl Block {
    /// Create the genesis block (first block in the chain).
    /// Difficulty-exempt; its hash is computed once and never re-mined.
    pub fn genesis() -> Self {
        let mut block = Self {
            index: 0,
            records: Vec::new(),
            timestamp: Utc::now().timestamp(),
            previous_hash: String::from("0"),
            local_accuracy: 0.0,
            model_params: Value::Null,
            nonce: 0,
            hash: String::new(),
        };
        block.hash = block.compute_digest();
        block
    }

    /// Create a candidate block (not mined yet). Call `find_proof` to
    /// perform PoW before submitting it for admission.
    pub fn candidate(index: u64, previous_hash: String, records: Vec<Record>) -> Self {
        Self {
            index,
            records,
            timestamp: Utc::now().timestamp(),
            previous_hash,
            local_accuracy: 0.0,
            model_params: Value::Null,
            nonce: 0,
            hash: String::new(),
        }
    }

    /// Compute the SHA-256 digest of this block's content, excluding the
    /// `hash` field itself. The preimage is JSON with sorted keys
    /// (serde_json's default object map), so the form is canonical.
    pub fn compute_digest(&self) -> String {
        let content = serde_json::json!({
            "index": self.index,
            "records": self.records,
            "timestamp": self.timestamp,
            "previous_hash": self.previous_hash,
            "local_accuracy": self.local_accuracy,
            "model_params": self.model_params,
            "nonce": self.nonce,
        });
        let mut hasher = Sha256::new();
        hasher.update(serde_json::to_vec(&content).expect("serialize block content"));
        hex::encode(hasher.finalize())
    }

    /// Perform Proof-of-Work: walk the nonce from 0 upward until the digest
    /// has `difficulty` leading zeros (in hex), and return that digest.
    /// Brute-force and unbounded by design; the returned value always
    /// passes the prefix test.
    pub fn find_proof(&mut self, difficulty: u32) -> String {
        let target_prefix = "0".repeat(difficulty as usize);
        self.nonce = 0;
        loop {
            let digest = self.compute_digest();
            if digest.starts_with(&target_prefix) {
                return digest;
            }
            self.nonce = self.nonce.wrapping_add(1);
        }
    }

    /// Validate a claimed hash against this block: it must meet the PoW
    /// difficulty AND equal the recomputed digest. Both conditions are
    /// required. (Does NOT validate chain linkage.)
    pub fn is_valid_proof(&self, claimed_hash: &str, difficulty: u32) -> bool {
        let target_prefix = "0".repeat(difficulty as usize);
        claimed_hash.starts_with(&target_prefix) && claimed_hash == self.compute_digest()
    }
}
