use log::{debug, warn};

use super::{Block, Record};

/// In-memory ledger engine: the accepted chain plus the mempool of
/// pending records, guarded by a single Proof-of-Work admission gate.
#[derive(Debug)]
pub struct Blockchain {
    pub chain: Vec<Block>,
    pub mempool: Vec<Record>,
    pub difficulty: u32,
}

impl Blockchain {
    /// Initialize a new ledger with a genesis block and fixed difficulty.
    pub fn new(difficulty: u32) -> Self {
        let mut bc = Self {
            chain: Vec::new(),
            mempool: Vec::new(),
            difficulty,
        };
        bc.chain.push(Block::genesis());
        bc
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.chain
            .last()
            .expect("chain always holds at least the genesis block")
    }

    /// Append a pending record to the mempool. No shape validation here;
    /// that is the transport layer's job.
    pub fn add_record(&mut self, record: Record) {
        self.mempool.push(record);
    }

    /// The single admission gate: verify linkage against the current head,
    /// then the claimed proof. On success the proof becomes the block's
    /// hash and the block joins the chain. Failure leaves the chain
    /// untouched.
    pub fn append_block(&mut self, mut block: Block, proof: String) -> bool {
        if block.previous_hash != self.last_block().hash {
            debug!(
                "rejected block #{}: previous_hash does not match head",
                block.index
            );
            return false;
        }
        if !block.is_valid_proof(&proof, self.difficulty) {
            debug!("rejected block #{}: invalid proof", block.index);
            return false;
        }
        block.hash = proof;
        self.chain.push(block);
        true
    }

    /// Mine the pending records into a new block. Returns `None` when the
    /// mempool is empty (nothing to mine — not an error). The mempool is
    /// cleared only after the mined block is actually admitted.
    pub fn mine(&mut self) -> Option<u64> {
        if self.mempool.is_empty() {
            return None;
        }

        let (index, previous_hash) = {
            let head = self.last_block();
            (head.index + 1, head.hash.clone())
        };
        let mut candidate = Block::candidate(index, previous_hash, self.mempool.clone());
        let proof = candidate.find_proof(self.difficulty);

        if !self.append_block(candidate, proof) {
            // Unreachable with single-owner mutation; keep the mempool so
            // nothing pending is lost.
            warn!("mined block #{index} failed admission, keeping mempool");
            return None;
        }
        self.mempool.clear();
        Some(self.last_block().index)
    }

    /// Validate an externally supplied chain block-by-block: genesis shape
    /// and digest, then linkage + proof for every later block. Pure check;
    /// never mutates the candidate. Stops at the first failing block.
    pub fn check_chain_validity(&self, chain: &[Block]) -> bool {
        let Some(genesis) = chain.first() else {
            return false;
        };

        // Genesis is difficulty-exempt: fixed shape plus digest integrity.
        if genesis.index != 0
            || genesis.previous_hash != "0"
            || genesis.hash != genesis.compute_digest()
        {
            return false;
        }

        let mut previous_hash = genesis.hash.as_str();
        for block in &chain[1..] {
            if block.previous_hash != previous_hash
                || !block.is_valid_proof(&block.hash, self.difficulty)
            {
                return false;
            }
            previous_hash = block.hash.as_str();
        }
        true
    }

    /// Rebuild a ledger from a peer's chain dump. The genesis block is
    /// trusted as-is; every later block must pass the admission gate with
    /// its embedded hash as the proof. All-or-nothing: any rejection fails
    /// the whole reconstruction.
    pub fn from_dump(blocks: Vec<Block>, difficulty: u32) -> Result<Self, String> {
        let mut dump = blocks.into_iter();
        let genesis = dump.next().ok_or_else(|| "chain dump is empty".to_string())?;

        let mut bc = Self {
            chain: vec![genesis],
            mempool: Vec::new(),
            difficulty,
        };
        for block in dump {
            let proof = block.hash.clone();
            if !bc.append_block(block, proof) {
                return Err("chain dump tampered".to_string());
            }
        }
        Ok(bc)
    }

    /// Swap in a replacement chain wholesale (consensus adoption or a
    /// network join). The mempool survives: pending records were never
    /// part of the adopted chain.
    pub fn replace_chain(&mut self, chain: Vec<Block>) {
        self.chain = chain;
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }
}
