//! Splitting a 64-bit cell id into 32-bit halves for hosts that only carry
//! 32-bit copy numbers.
//!
//! Each half round-trips on its own. The two are never recombined into one id:
//! a 32-bit host value always maps back through the low-half convention.

use crate::types::CellId;

const HALF_BITS: u32 = 32;

/// Low 32 bits of `id`, reinterpreted as signed.
#[inline]
pub fn split_low(id: CellId) -> i32 {
    id.as_u64() as u32 as i32
}

/// High 32 bits of `id`, reinterpreted as signed.
#[inline]
pub fn split_high(id: CellId) -> i32 {
    (id.as_u64() >> HALF_BITS) as u32 as i32
}

/// Widen a low-half value back to 64 bits.
///
/// Sign-extends, matching a signed-to-unsigned widening cast. Negative values
/// therefore set every bit of the upper half.
#[inline]
pub fn from_low32(low: i32) -> CellId {
    CellId::new(low as i64 as u64)
}

/// Place a high-half value back into the top 32 bits.
#[inline]
pub fn from_high32(high: i32) -> CellId {
    CellId::new((high as u32 as u64) << HALF_BITS)
}
