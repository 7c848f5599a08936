use crate::block_header::{hash_header, BlockHeader, ChainEntry};
use crate::constants::chain::{CHUNK_HEADERS, HEADER_SIZE};
use crate::difficulty::{DifficultyEngine, Target};
use crate::error::ChainError;
use crate::header_store::HeaderStore;
use crate::utility::double_hash;
use bitcoin_hashes::Hash;

/// Proof-of-work hash over the 80 serialized header bytes. This is a
/// separate seam from the block identity hash because several networks use
/// a different function for work than for identity.
pub trait PowHasher: Send + Sync {
    fn pow_hash(&self, raw_header: &[u8]) -> [u8; 32];
}

/// Bitcoin-style work function: same double SHA-256 as the identity hash.
pub struct DoubleSha256Pow;

impl PowHasher for DoubleSha256Pow {
    fn pow_hash(&self, raw_header: &[u8]) -> [u8; 32] {
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&double_hash(raw_header).to_byte_array());
        digest
    }
}

pub struct ChainVerifier {
    difficulty: DifficultyEngine,
    pow: Box<dyn PowHasher>,
}

// The digest integer reads the hash bytes in reversed (display) order.
fn exceeds_target(digest: &[u8; 32], target: &Target) -> bool {
    let mut big_endian = *digest;
    big_endian.reverse();
    big_endian > *target
}

impl ChainVerifier {
    pub fn new(difficulty: DifficultyEngine, pow: Box<dyn PowHasher>) -> Self {
        Self { difficulty, pow }
    }

    /// Checks one header against its predecessor and the expected
    /// difficulty: linkage, then bits, then proof of work. A digest exactly
    /// equal to the target is valid.
    pub fn verify_header(
        &self,
        header: &BlockHeader,
        prev_header: Option<&BlockHeader>,
        bits: u32,
        target: &Target,
    ) -> Result<(), ChainError> {
        let prev_hash = hash_header(prev_header);
        if prev_hash != header.prev_block_hash {
            return Err(ChainError::LinkageMismatch);
        }
        if bits != header.nbits {
            return Err(ChainError::DifficultyMismatch);
        }
        let pow_digest = self.pow.pow_hash(&header.serialize());
        if exceeds_target(&pow_digest, target) {
            return Err(ChainError::InsufficientWork);
        }
        Ok(())
    }

    /// Verifies an ascending run of headers. The predecessor of the first
    /// entry is read from the store; each later pair is checked in turn,
    /// stopping at the first failure.
    pub fn verify_chain(
        &self,
        store: &HeaderStore,
        chain: &[ChainEntry],
    ) -> Result<(), ChainError> {
        let first = match chain.first() {
            Some(entry) => entry,
            None => return Ok(()),
        };
        let mut prev_header = store.read_header(first.block_height - 1)?;
        for entry in chain {
            let (bits, target) =
                self.difficulty
                    .get_target(entry.block_height, &entry.header, prev_header.as_ref())?;
            self.verify_header(&entry.header, prev_header.as_ref(), bits, &target)?;
            prev_header = Some(entry.header);
        }
        Ok(())
    }

    /// Verifies a raw chunk blob. Record k of chunk `index` sits at global
    /// height `index * 2016 + k`; the predecessor for k = 0 is read from
    /// the store (absent for chunk 0). Genesis is exempt from the checks.
    pub fn verify_chunk(
        &self,
        store: &HeaderStore,
        index: i64,
        data: &[u8],
    ) -> Result<(), ChainError> {
        if data.len() % HEADER_SIZE != 0 {
            return Err(ChainError::MalformedHeader);
        }
        let mut prev_header = if index != 0 {
            store.read_header(index * CHUNK_HEADERS as i64 - 1)?
        } else {
            None
        };

        for (record, raw_header) in data.chunks(HEADER_SIZE).enumerate() {
            let height = index * CHUNK_HEADERS as i64 + record as i64;
            let header = BlockHeader::from_bytes(raw_header)?;
            if height != 0 {
                let (bits, target) =
                    self.difficulty
                        .get_target(height, &header, prev_header.as_ref())?;
                self.verify_header(&header, prev_header.as_ref(), bits, &target)?;
            }
            prev_header = Some(header);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PathProvider;
    use crate::constants::chain::GENESIS_BITS;
    use crate::difficulty::{bits_to_target, RetargetPolicy};
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct TestPaths(PathBuf);

    impl PathProvider for TestPaths {
        fn headers_file_path(&self) -> PathBuf {
            self.0.clone()
        }
    }

    fn test_store(dir: &TempDir) -> HeaderStore {
        HeaderStore::new(Box::new(TestPaths(dir.path().join("headers.dat"))))
    }

    // Constant-difficulty policy so non-genesis heights are checkable
    // without the real adjustment algorithm.
    struct FixedBits(u32);

    impl RetargetPolicy for FixedBits {
        fn retarget(
            &self,
            _height: i64,
            _header: &BlockHeader,
            _prev_header: Option<&BlockHeader>,
        ) -> Result<(u32, Target), ChainError> {
            Ok((self.0, bits_to_target(self.0)))
        }
    }

    // Returns a fixed digest so the work threshold can be pinned exactly.
    struct FixedPow([u8; 32]);

    impl PowHasher for FixedPow {
        fn pow_hash(&self, _raw_header: &[u8]) -> [u8; 32] {
            self.0
        }
    }

    // Zero digest, below any non-zero target.
    struct AlwaysValidPow;

    impl PowHasher for AlwaysValidPow {
        fn pow_hash(&self, _raw_header: &[u8]) -> [u8; 32] {
            [0u8; 32]
        }
    }

    fn verifier_with_pow(pow: Box<dyn PowHasher>) -> ChainVerifier {
        let engine = DifficultyEngine::new(Box::new(FixedBits(GENESIS_BITS)));
        ChainVerifier::new(engine, pow)
    }

    fn digest_for_target(target: &Target) -> [u8; 32] {
        let mut digest = *target;
        digest.reverse();
        digest
    }

    fn linked_header(prev_header: Option<&BlockHeader>, nonce: u32) -> BlockHeader {
        BlockHeader::new(
            1,
            hash_header(prev_header),
            [nonce as u8; 32],
            1681095600 + nonce,
            GENESIS_BITS,
            nonce,
        )
    }

    fn linked_chain(len: usize) -> Vec<ChainEntry> {
        let mut chain: Vec<ChainEntry> = Vec::new();
        for height in 0..len {
            let prev = chain.last().map(|entry| entry.header);
            chain.push(ChainEntry {
                block_height: height as i64,
                header: linked_header(prev.as_ref(), height as u32),
            });
        }
        chain
    }

    #[test]
    fn test_double_sha256_pow_matches_identity_hash() {
        let header = linked_header(None, 3);
        let digest = DoubleSha256Pow.pow_hash(&header.serialize());
        assert_eq!(digest, header.hash());
    }

    #[test]
    fn test_verify_header_linkage_mismatch() {
        let verifier = verifier_with_pow(Box::new(AlwaysValidPow));
        let prev = linked_header(None, 0);
        let target = bits_to_target(GENESIS_BITS);

        let good = linked_header(Some(&prev), 1);
        assert!(verifier
            .verify_header(&good, Some(&prev), GENESIS_BITS, &target)
            .is_ok());

        let mut bad = good;
        bad.prev_block_hash = [0xee; 32];
        assert!(matches!(
            verifier.verify_header(&bad, Some(&prev), GENESIS_BITS, &target),
            Err(ChainError::LinkageMismatch)
        ));
    }

    #[test]
    fn test_verify_header_genesis_links_to_zero_sentinel() {
        let verifier = verifier_with_pow(Box::new(AlwaysValidPow));
        let target = bits_to_target(GENESIS_BITS);

        let genesis = linked_header(None, 0);
        assert_eq!(genesis.prev_block_hash, [0u8; 32]);
        assert!(verifier
            .verify_header(&genesis, None, GENESIS_BITS, &target)
            .is_ok());
    }

    #[test]
    fn test_verify_header_bits_mismatch() {
        let verifier = verifier_with_pow(Box::new(AlwaysValidPow));
        let prev = linked_header(None, 0);
        let header = linked_header(Some(&prev), 1);
        let target = bits_to_target(GENESIS_BITS);

        assert!(matches!(
            verifier.verify_header(&header, Some(&prev), GENESIS_BITS + 1, &target),
            Err(ChainError::DifficultyMismatch)
        ));
    }

    #[test]
    fn test_verify_header_work_threshold_boundary() {
        let prev = linked_header(None, 0);
        let header = linked_header(Some(&prev), 1);
        let target = bits_to_target(GENESIS_BITS);

        // digest integer exactly equal to the target passes
        let verifier = verifier_with_pow(Box::new(FixedPow(digest_for_target(&target))));
        assert!(verifier
            .verify_header(&header, Some(&prev), GENESIS_BITS, &target)
            .is_ok());

        // one above the target fails
        let mut above = target;
        above[31] += 1;
        let verifier = verifier_with_pow(Box::new(FixedPow(digest_for_target(&above))));
        assert!(matches!(
            verifier.verify_header(&header, Some(&prev), GENESIS_BITS, &target),
            Err(ChainError::InsufficientWork)
        ));
    }

    #[test]
    fn test_verify_chain_reads_predecessor_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        let verifier = verifier_with_pow(Box::new(AlwaysValidPow));

        let chain = linked_chain(4);
        store.save_header(&chain[0].header, 0).unwrap();
        store.save_header(&chain[1].header, 1).unwrap();

        assert!(verifier.verify_chain(&store, &chain[2..]).is_ok());
        assert!(verifier.verify_chain(&store, &[]).is_ok());
    }

    #[test]
    fn test_verify_chain_short_circuits_on_broken_link() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        let verifier = verifier_with_pow(Box::new(AlwaysValidPow));

        let mut chain = linked_chain(3);
        chain[2].header.prev_block_hash = [0xee; 32];
        assert!(matches!(
            verifier.verify_chain(&store, &chain),
            Err(ChainError::LinkageMismatch)
        ));
    }

    #[test]
    fn test_verify_chunk_geometry_and_linkage() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        let verifier = verifier_with_pow(Box::new(AlwaysValidPow));

        let chain = linked_chain(5);
        let mut data = Vec::new();
        for entry in &chain {
            data.extend(entry.header.serialize());
        }
        assert!(verifier.verify_chunk(&store, 0, &data).is_ok());

        assert!(matches!(
            verifier.verify_chunk(&store, 0, &data[..data.len() - 1]),
            Err(ChainError::MalformedHeader)
        ));
    }

    #[test]
    fn test_verify_chunk_past_genesis_needs_store_predecessor() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        let verifier = verifier_with_pow(Box::new(AlwaysValidPow));

        // chunk 1 with no stored predecessor at height 2015: the first
        // record can only link against the zero sentinel, which fails
        let boundary = linked_header(None, 7);
        let next = linked_header(Some(&boundary), 8);
        assert!(matches!(
            verifier.verify_chunk(&store, 1, &next.serialize()),
            Err(ChainError::LinkageMismatch)
        ));

        // with the predecessor stored at the chunk boundary it verifies
        store
            .save_header(&boundary, CHUNK_HEADERS as i64 - 1)
            .unwrap();
        assert!(verifier.verify_chunk(&store, 1, &next.serialize()).is_ok());
    }

    #[test]
    fn test_verify_chunk_unimplemented_policy_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);
        let verifier = ChainVerifier::new(
            DifficultyEngine::default(),
            Box::new(AlwaysValidPow),
        );

        let chain = linked_chain(2);
        let mut data = Vec::new();
        for entry in &chain {
            data.extend(entry.header.serialize());
        }
        assert!(matches!(
            verifier.verify_chunk(&store, 0, &data),
            Err(ChainError::UnimplementedPolicy)
        ));
    }
}
