use crate::error::ChainError;
use bitcoin_hashes::sha256;
use bitcoin_hashes::Hash;
use std::io;
use std::io::{Cursor, Read};

/// Double SHA-256, the block identity hash of the chain.
pub fn double_hash(bytes: &[u8]) -> sha256::Hash {
    let first_hash = sha256::Hash::hash(bytes);
    sha256::Hash::hash(&first_hash.to_byte_array())
}

pub trait EndianRead {
    fn from_le_stream(cursor: &mut Cursor<&[u8]>) -> Result<Self, io::Error>
    where
        Self: Sized;
}

// source: https://www.reddit.com/r/rust/comments/g0inzh/is_there_a_trait_for_from_le_bytes_from_be_bytes/
macro_rules! impl_EndianRead_for_ints (( $($int:ident),* ) => {
    $(
        impl EndianRead for $int {
            fn from_le_stream(cursor: &mut Cursor<&[u8]>) -> Result<Self, io::Error> {
                let mut buf = [0u8; std::mem::size_of::<Self>()];
                cursor.read_exact(&mut buf)?;
                Ok(Self::from_le_bytes(buf))
            }
        }
    )*
});

impl_EndianRead_for_ints!(u32, i32);

pub fn read_hash(cursor: &mut Cursor<&[u8]>) -> Result<[u8; 32], io::Error> {
    let mut hash = [0u8; 32];
    cursor.read_exact(&mut hash)?;
    Ok(hash)
}

/// Hex form of a digest as shown at the network/UI boundary, which reads
/// the bytes in reverse of their stored order.
pub fn encode_hash(hash: &[u8; 32]) -> String {
    let mut reversed = *hash;
    reversed.reverse();
    hex::encode(reversed)
}

/// Inverse of `encode_hash`; back to the stored byte order.
pub fn decode_hash(hex_str: &str) -> Result<[u8; 32], ChainError> {
    let bytes = hex::decode(hex_str).map_err(|_| ChainError::MalformedHeader)?;
    if bytes.len() != 32 {
        return Err(ChainError::MalformedHeader);
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&bytes);
    hash.reverse();
    Ok(hash)
}
