use crate::block_header::{hash_header, BlockHeader, ChainEntry};
use crate::constants::chain::HEADER_SIZE;
use crate::constants::config::{QUIET, VERBOSE};
use crate::error::ChainError;
use crate::header_store::HeaderStore;
use crate::logger::log;
use crate::verifier::ChainVerifier;

/// Result of a single connection attempt.
#[derive(Debug)]
pub enum ConnectOutcome {
    /// The candidate chain was verified and persisted.
    Connected,
    /// The header at this height must be fetched before the candidate can
    /// anchor to the local chain.
    NeedsEarlier(i64),
    /// Verification or store failure; the candidate is left unconnected
    /// and the caller decides whether to retry.
    Failed(ChainError),
}

/// Connects headers and chunks arriving from the network to the local
/// store, walking backward through reorgs until a common ancestor anchors
/// the candidate chain.
pub struct ChainSync {
    store: HeaderStore,
    verifier: ChainVerifier,
    verify_chunks: bool,
}

impl ChainSync {
    pub fn new(store: HeaderStore, verifier: ChainVerifier) -> Self {
        Self {
            store,
            verifier,
            verify_chunks: true,
        }
    }

    /// Chunk verification is logically required; a bootstrap build may turn
    /// it off to ingest a trusted snapshot faster. Chunk geometry is
    /// checked either way.
    pub fn with_chunk_verification(mut self, verify_chunks: bool) -> Self {
        self.verify_chunks = verify_chunks;
        self
    }

    pub fn height(&self) -> i64 {
        self.store.height()
    }

    pub fn read_header(&self, height: i64) -> Result<Option<BlockHeader>, ChainError> {
        self.store.read_header(height)
    }

    /// Grows the candidate chain by one header and tries to connect it.
    /// The candidate is kept in decreasing-height order as headers arrive;
    /// on `NeedsEarlier` the caller fetches the requested height and calls
    /// again with the same, now longer, candidate.
    pub fn connect_header(
        &self,
        chain: &mut Vec<ChainEntry>,
        entry: ChainEntry,
    ) -> ConnectOutcome {
        let height = entry.block_height;
        let claimed_prev_hash = entry.header.prev_block_hash;
        chain.push(entry);

        // genesis anchors directly; everything else needs its predecessor
        if height > 0 {
            let previous_height = height - 1;
            let previous_header = match self.store.read_header(previous_height) {
                Ok(header) => header,
                Err(e) => return ConnectOutcome::Failed(e),
            };

            // Missing header, request it
            let previous_header = match previous_header {
                Some(header) => header,
                None => return ConnectOutcome::NeedsEarlier(previous_height),
            };

            // Does it connect to my chain?
            if hash_header(Some(&previous_header)) != claimed_prev_hash {
                log("reorg", QUIET);
                return ConnectOutcome::NeedsEarlier(previous_height);
            }
        }

        // The chain is anchored to the verified store. Verify it in
        // ascending height order, then persist.
        let ascending: Vec<ChainEntry> = chain.iter().rev().copied().collect();
        if let Err(e) = self.verifier.verify_chain(&self.store, &ascending) {
            return ConnectOutcome::Failed(e);
        }
        for entry in &ascending {
            if let Err(e) = self.store.save_header(&entry.header, entry.block_height) {
                return ConnectOutcome::Failed(e);
            }
        }
        log(&format!("new height: {}", self.store.height()), VERBOSE);
        ConnectOutcome::Connected
    }

    /// Verifies and persists one chunk of raw header records. Returns the
    /// next chunk index to fetch: `index + 1` on success, `index - 1` on
    /// failure so the caller re-requests the previous chunk instead of
    /// aborting.
    pub fn connect_chunk(&self, index: i64, data: &[u8]) -> i64 {
        match self.try_connect_chunk(index, data) {
            Ok(()) => {
                log(&format!("validated chunk {}", index), VERBOSE);
                index + 1
            }
            Err(e) => {
                log(&format!("connect chunk {} failed: {}", index, e), QUIET);
                index - 1
            }
        }
    }

    /// Hex transport form of `connect_chunk`.
    pub fn connect_chunk_hex(&self, index: i64, hexdata: &str) -> i64 {
        match hex::decode(hexdata) {
            Ok(data) => self.connect_chunk(index, &data),
            Err(e) => {
                log(&format!("chunk {} is not valid hex: {}", index, e), QUIET);
                index - 1
            }
        }
    }

    fn try_connect_chunk(&self, index: i64, data: &[u8]) -> Result<(), ChainError> {
        if index < 0 || data.len() % HEADER_SIZE != 0 {
            return Err(ChainError::MalformedHeader);
        }
        if self.verify_chunks {
            self.verifier.verify_chunk(&self.store, index, data)?;
        }
        self.store.save_chunk(index, data)
    }
}
