use crate::constants::chain::HEADER_SIZE;
use crate::error::ChainError;
use crate::utility::{double_hash, read_hash, EndianRead};
use bitcoin_hashes::Hash;
use std::io;
use std::io::Cursor;

//https://developer.bitcoin.org/reference/block_chain.html#block-headers
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: [u8; 32],
    pub merkle_root_hash: [u8; 32],
    pub timestamp: u32,
    pub nbits: u32,
    pub nonce: u32,
}

/// A header plus the chain position assigned to it by the caller or the
/// store. The height is not part of the 80-byte wire form.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ChainEntry {
    pub block_height: i64,
    pub header: BlockHeader,
}

impl BlockHeader {
    pub fn new(
        version: i32,
        prev_block_hash: [u8; 32],
        merkle_root_hash: [u8; 32],
        timestamp: u32,
        nbits: u32,
        nonce: u32,
    ) -> Self {
        Self {
            version,
            prev_block_hash,
            merkle_root_hash,
            timestamp,
            nbits,
            nonce,
        }
    }

    /// Decodes the fixed 80-byte wire form. Digest fields are kept in their
    /// stored byte order; see `utility::encode_hash` for the display form.
    pub fn from_bytes(bytes: &[u8]) -> Result<BlockHeader, ChainError> {
        if bytes.len() != HEADER_SIZE {
            return Err(ChainError::MalformedHeader);
        }
        let mut cursor = Cursor::new(bytes);
        Self::read_fields(&mut cursor).map_err(|_| ChainError::MalformedHeader)
    }

    fn read_fields(cursor: &mut Cursor<&[u8]>) -> Result<BlockHeader, io::Error> {
        let version = i32::from_le_stream(cursor)?;
        let prev_block_hash = read_hash(cursor)?;
        let merkle_root_hash = read_hash(cursor)?;
        let timestamp = u32::from_le_stream(cursor)?;
        let nbits = u32::from_le_stream(cursor)?;
        let nonce = u32::from_le_stream(cursor)?;

        Ok(BlockHeader::new(
            version,
            prev_block_hash,
            merkle_root_hash,
            timestamp,
            nbits,
            nonce,
        ))
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut header_bytes = vec![];
        header_bytes.extend(&self.version.to_le_bytes());
        header_bytes.extend(&self.prev_block_hash);
        header_bytes.extend(&self.merkle_root_hash);
        header_bytes.extend(&self.timestamp.to_le_bytes());
        header_bytes.extend(&self.nbits.to_le_bytes());
        header_bytes.extend(&self.nonce.to_le_bytes());
        header_bytes
    }

    /// Block identity hash over the serialized header.
    pub fn hash(&self) -> [u8; 32] {
        let hash = double_hash(&self.serialize());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash.to_byte_array());
        bytes
    }
}

/// Identity hash of an optional predecessor. The missing genesis
/// predecessor hashes to the all-zero sentinel.
pub fn hash_header(header: Option<&BlockHeader>) -> [u8; 32] {
    match header {
        Some(header) => header.hash(),
        None => [0u8; 32],
    }
}

impl Default for BlockHeader {
    fn default() -> Self {
        BlockHeader::new(0_i32, [0_u8; 32], [0_u8; 32], 0_u32, 0_u32, 0_u32)
    }
}
