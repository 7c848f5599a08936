//! Lightweight (SPV) block-header chain manager. Keeps a local, verifiable
//! copy of the header sequence: headers arriving from an untrusted network
//! source are checked against linkage, difficulty and proof-of-work rules,
//! then persisted to a flat file of fixed 80-byte records.

pub mod block_header;
pub mod chain_sync;
pub mod config;
pub mod constants;
pub mod difficulty;
pub mod error;
pub mod header_store;
pub mod logger;
pub mod network;
pub mod utility;
pub mod verifier;

pub use block_header::{hash_header, BlockHeader, ChainEntry};
pub use chain_sync::{ChainSync, ConnectOutcome};
pub use config::{Config, PathProvider};
pub use difficulty::{bits_to_target, DifficultyEngine, RetargetPolicy, Target, UnimplementedRetarget};
pub use error::ChainError;
pub use header_store::{BootstrapHandle, BootstrapStatus, HeaderStore};
pub use network::NetworkSource;
pub use verifier::{ChainVerifier, DoubleSha256Pow, PowHasher};
