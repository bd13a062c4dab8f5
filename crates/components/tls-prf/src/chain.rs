//! The `P_hash` expansion.
//!
//! P_hash is defined as:
//!
//! P_hash(secret, seed) = HMAC_hash(secret, A(1) + seed) +
//!                        HMAC_hash(secret, A(2) + seed) +
//!                        HMAC_hash(secret, A(3) + seed) + ...
//!
//! And A() is defined as:
//!
//! A(0) = seed
//! A(i) = HMAC_hash(secret, A(i-1))

use zeroize::Zeroizing;

use crate::{mac::KeyedMac, PrfError};

/// How a chain's output is combined into the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combine {
    /// Overwrite the destination.
    Write,
    /// XOR into the destination.
    Xor,
}

impl Combine {
    fn apply(self, dst: &mut [u8], src: &[u8]) {
        match self {
            Combine::Write => dst.copy_from_slice(src),
            Combine::Xor => dst.iter_mut().zip(src).for_each(|(d, s)| *d ^= s),
        }
    }
}

/// One `P_hash` expansion, keyed with one half of the PRF secret.
///
/// Holds the running `A(i)` so that successive calls to [`MacChain::expand`]
/// continue the same stream.
#[derive(Clone)]
pub(crate) struct MacChain<M> {
    mac: M,
    a: Zeroizing<Vec<u8>>,
}

impl<M> MacChain<M>
where
    M: KeyedMac + Clone,
{
    /// Creates a chain over `mac` keyed with `key`.
    pub(crate) fn new(mut mac: M, key: &[u8]) -> Result<Self, PrfError> {
        mac.init(key)?;

        Ok(Self {
            mac,
            a: Zeroizing::new(Vec::new()),
        })
    }

    /// Returns the block length of the chain.
    pub(crate) fn block_len(&self) -> usize {
        self.mac.mac_size()
    }

    /// Restarts the chain for `seed`, setting `A(1) = HMAC(seed)`.
    pub(crate) fn start(&mut self, seed: &[u8]) -> Result<(), PrfError> {
        self.mac.reset();
        self.mac.update_all(seed)?;
        self.a = Zeroizing::new(self.mac.digest()?);
        self.mac.reset();

        Ok(())
    }

    /// Expands the chain over `out`, one block per `A(i)`.
    ///
    /// A trailing partial block is truncated, and the chain still advances
    /// past it.
    pub(crate) fn expand(
        &mut self,
        seed: &[u8],
        out: &mut [u8],
        combine: Combine,
    ) -> Result<(), PrfError> {
        let block_len = self.block_len();
        for block in out.chunks_mut(block_len) {
            // P_hash[i] = HMAC_hash(secret, A(i) + seed)
            self.mac.update_all(&self.a)?;
            self.mac.update_all(seed)?;
            let p = Zeroizing::new(self.mac.digest()?);
            self.mac.reset();

            combine.apply(block, &p[..block.len()]);

            // A(i+1) = HMAC_hash(secret, A(i))
            self.mac.update_all(&self.a)?;
            self.a = Zeroizing::new(self.mac.digest()?);
            self.mac.reset();
        }

        Ok(())
    }
}
