//! Random byte sources.
//!
//! Sources here only produce bytes. There is no trait for feeding entropy
//! into a source: every source in this crate is [`Deterministic`], and
//! mixing in external bytes would break that guarantee.

use crate::PrfError;

/// A source of pseudo-random bytes.
pub trait RandomSource {
    /// Returns the name of the source.
    fn name(&self) -> &'static str;

    /// Returns the next byte.
    fn next_byte(&self) -> Result<u8, PrfError>;

    /// Writes the next `length` bytes into `dest[offset..offset + length]`.
    fn next_bytes(&self, dest: &mut [u8], offset: usize, length: usize) -> Result<(), PrfError>;

    /// Fills `dest` with the next bytes.
    fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), PrfError> {
        self.next_bytes(dest, 0, dest.len())
    }
}

/// A source whose output is fully determined by its initialization.
///
/// Deterministic sources never accept external entropy: two sources
/// initialized identically produce identical streams.
pub trait Deterministic: RandomSource {}

/// Draws a fixed number of bytes from a deterministic source.
pub(crate) fn draw<const N: usize, R>(source: &R) -> Result<[u8; N], PrfError>
where
    R: Deterministic + ?Sized,
{
    let mut out = [0u8; N];
    source.fill_bytes(&mut out)?;

    Ok(out)
}
