use crate::block_header::BlockHeader;
use crate::constants::chain::{GENESIS_BITS, GENESIS_TARGET};
use crate::error::ChainError;

/// Full-width proof-of-work threshold, big-endian.
pub type Target = [u8; 32];

/// Difficulty adjustment strategy. Given the height under validation, the
/// header itself and its predecessor, returns the compact bits the header
/// must carry and the full target its proof-of-work digest must not exceed.
pub trait RetargetPolicy: Send + Sync {
    fn retarget(
        &self,
        height: i64,
        header: &BlockHeader,
        prev_header: Option<&BlockHeader>,
    ) -> Result<(u32, Target), ChainError>;
}

/// Placeholder for the network's real difficulty adjustment, which has not
/// been ported. Returning an arbitrary accepted value here would disable
/// the proof-of-work check, so every call fails with `UnimplementedPolicy`
/// until an integrator supplies a real policy.
pub struct UnimplementedRetarget;

impl RetargetPolicy for UnimplementedRetarget {
    fn retarget(
        &self,
        _height: i64,
        _header: &BlockHeader,
        _prev_header: Option<&BlockHeader>,
    ) -> Result<(u32, Target), ChainError> {
        Err(ChainError::UnimplementedPolicy)
    }
}

pub struct DifficultyEngine {
    policy: Box<dyn RetargetPolicy>,
}

impl DifficultyEngine {
    pub fn new(policy: Box<dyn RetargetPolicy>) -> Self {
        Self { policy }
    }

    /// Expected difficulty for `height`. Height 0 is the genesis fixed
    /// point; every later height delegates to the retarget policy.
    pub fn get_target(
        &self,
        height: i64,
        header: &BlockHeader,
        prev_header: Option<&BlockHeader>,
    ) -> Result<(u32, Target), ChainError> {
        if height == 0 {
            return Ok((GENESIS_BITS, GENESIS_TARGET));
        }
        self.policy.retarget(height, header, prev_header)
    }
}

impl Default for DifficultyEngine {
    fn default() -> Self {
        Self::new(Box::new(UnimplementedRetarget))
    }
}

/// Expands the compact bits encoding into a full 32-byte target. The top
/// byte is the length of the significand in bytes, the low three bytes are
/// the significand itself. Out-of-range exponents yield the all-zero
/// target, which no digest can satisfy.
pub fn bits_to_target(bits: u32) -> Target {
    let exponent = (bits >> 24) as usize;
    let significand = bits & 0x00ff_ffff;

    let mut target = [0u8; 32];
    if exponent <= 3 {
        let shifted = significand >> (8 * (3 - exponent));
        target[29..].copy_from_slice(&shifted.to_be_bytes()[1..]);
    } else if exponent <= 32 {
        let start = 32 - exponent;
        let end = usize::min(start + 3, 32);
        target[start..end].copy_from_slice(&significand.to_be_bytes()[1..1 + (end - start)]);
    }
    target
}
