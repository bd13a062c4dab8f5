use tracing::trace;
use zeroize::Zeroizing;

use crate::{
    chain::{Combine, MacChain},
    mac::{HmacMd5, HmacSha1},
    PrfError,
};

/// Size of the output buffer, the LCM of the MD5 and SHA-1 output lengths.
pub const BUFFER_LEN: usize = 80;

#[derive(Clone)]
pub(crate) enum State {
    Uninitialized,
    Ready(Box<Stream>),
}

impl State {
    pub(crate) fn ready_mut(&mut self) -> Result<&mut Stream, PrfError> {
        match self {
            State::Ready(stream) => Ok(&mut **stream),
            State::Uninitialized => Err(PrfError::state("PRF not initialized")),
        }
    }

    pub(crate) fn ready(&self) -> Option<&Stream> {
        match self {
            State::Ready(stream) => Some(&**stream),
            State::Uninitialized => None,
        }
    }
}

/// The keyed PRF stream.
#[derive(Clone)]
pub(crate) struct Stream {
    md5: MacChain<HmacMd5>,
    sha1: MacChain<HmacSha1>,
    seed: Zeroizing<Vec<u8>>,
    buffer: Zeroizing<[u8; BUFFER_LEN]>,
    idx: usize,
}

impl Stream {
    /// Starts both chains on `seed` and fills the first buffer.
    pub(crate) fn new(
        mut md5: MacChain<HmacMd5>,
        mut sha1: MacChain<HmacSha1>,
        seed: Zeroizing<Vec<u8>>,
    ) -> Result<Self, PrfError> {
        debug_assert_eq!(BUFFER_LEN % md5.block_len(), 0);
        debug_assert_eq!(BUFFER_LEN % sha1.block_len(), 0);

        md5.start(&seed)?;
        sha1.start(&seed)?;

        let mut stream = Self {
            md5,
            sha1,
            seed,
            buffer: Zeroizing::new([0u8; BUFFER_LEN]),
            idx: BUFFER_LEN,
        };
        stream.fill()?;

        Ok(stream)
    }

    pub(crate) fn md5(&self) -> &MacChain<HmacMd5> {
        &self.md5
    }

    pub(crate) fn sha1(&self) -> &MacChain<HmacSha1> {
        &self.sha1
    }

    pub(crate) fn seed(&self) -> &Zeroizing<Vec<u8>> {
        &self.seed
    }

    /// Computes the next 80 bytes: five MD5 blocks written, then four SHA-1
    /// blocks XORed over them.
    fn fill(&mut self) -> Result<(), PrfError> {
        self.md5
            .expand(&self.seed, &mut self.buffer[..], Combine::Write)?;
        self.sha1
            .expand(&self.seed, &mut self.buffer[..], Combine::Xor)?;
        self.idx = 0;

        trace!("refilled prf buffer");

        Ok(())
    }

    /// Copies the next `out.len()` bytes of the stream into `out`.
    pub(crate) fn read(&mut self, out: &mut [u8]) -> Result<(), PrfError> {
        let mut count = 0;
        while count < out.len() {
            if self.idx >= BUFFER_LEN {
                self.fill()?;
            }

            let len = (BUFFER_LEN - self.idx).min(out.len() - count);
            out[count..count + len].copy_from_slice(&self.buffer[self.idx..self.idx + len]);
            self.idx += len;
            count += len;
        }

        Ok(())
    }
}
