pub mod chain {
    /// Serialized size of one block header record.
    pub const HEADER_SIZE: usize = 80;
    /// Headers per bulk synchronization chunk.
    pub const CHUNK_HEADERS: usize = 2016;
    /// Serialized size of one full chunk.
    pub const CHUNK_SIZE: usize = CHUNK_HEADERS * HEADER_SIZE;

    /// Compact difficulty of the genesis header.
    pub const GENESIS_BITS: u32 = 0x1e0ffff0;
    /// Full-width expansion of `GENESIS_BITS`
    /// (0x00000ffff0000000000000000000000000000000000000000000000000000000).
    pub const GENESIS_TARGET: [u8; 32] = [
        0x00, 0x00, 0x0f, 0xff, 0xf0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00,
    ];
    /// Easiest target the network permits; retarget policies clamp to it.
    pub const MAX_TARGET: [u8; 32] = [
        0x00, 0x00, 0x0f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff,
    ];
}

pub mod config {
    pub const PATH: &str = "headerchain.conf";
    pub const HEADERS_FILE: &str = "tmp/headers.dat";
    pub const LOG_FILE: &str = "tmp/log.txt";
    pub const QUIET: &str = "quiet";
    pub const VERBOSE: &str = "verbose";
}
