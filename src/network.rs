use crate::block_header::BlockHeader;
use std::io;

/// Untrusted source of raw header data, implemented by the transport
/// layer. Everything returned here is verified before it is persisted.
pub trait NetworkSource: Send + Sync {
    /// Raw 80-byte records for the 2016 headers starting at `index * 2016`.
    fn fetch_chunk(&self, index: i64) -> io::Result<Vec<u8>>;

    /// The single header at `height`.
    fn fetch_header(&self, height: i64) -> io::Result<BlockHeader>;

    /// A full initial headers file used to bootstrap an empty store.
    fn fetch_bootstrap_file(&self) -> io::Result<Vec<u8>>;
}
