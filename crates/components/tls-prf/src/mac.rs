//! Keyed MACs.
//!
//! HMAC is defined as
//!
//! HMAC(m) = H((key' xor opad) || H((key' xor ipad) || m))
//!
//! * H     - the underlying hash function
//! * key'  - key padded with zero bytes to the block size, or hashed first if
//!   it is longer than the block size
//! * opad  - block of 0x5c
//! * ipad  - block of 0x36
//! * m     - message
//!
//! [`HmacAdapter`] keeps a keyed template next to the pending computation, so
//! a reset is a clone of the template and never needs the raw key.

use core::fmt;

use hmac::{
    digest::{KeyInit, OutputSizeUser},
    Hmac, Mac,
};
use md5::Md5;
use sha1::Sha1;

use crate::{error::checked_range, hash::HashAlgorithm, PrfError};

/// A keyed message authentication code.
///
/// The lifecycle is `init(key)`, any number of `update` calls, `digest`, then
/// `reset` to start a new message with the same key.
pub trait KeyedMac {
    /// Returns the hash function this MAC is built on.
    fn algorithm(&self) -> HashAlgorithm;

    /// Returns the output length in bytes.
    fn mac_size(&self) -> usize;

    /// Keys the MAC, discarding any previous key and pending input.
    fn init(&mut self, key: &[u8]) -> Result<(), PrfError>;

    /// Appends `bytes[offset..offset + length]` to the pending message.
    fn update(&mut self, bytes: &[u8], offset: usize, length: usize) -> Result<(), PrfError>;

    /// Appends all of `bytes` to the pending message.
    fn update_all(&mut self, bytes: &[u8]) -> Result<(), PrfError> {
        self.update(bytes, 0, bytes.len())
    }

    /// Returns the MAC of the pending message.
    ///
    /// This does not reset the pending message.
    fn digest(&self) -> Result<Vec<u8>, PrfError>;

    /// Discards the pending message while keeping the key.
    fn reset(&mut self);
}

/// HMAC-MD5.
pub type HmacMd5 = HmacAdapter<Hmac<Md5>>;
/// HMAC-SHA1.
pub type HmacSha1 = HmacAdapter<Hmac<Sha1>>;

/// Adapts a RustCrypto [`Mac`] to [`KeyedMac`].
#[derive(Clone)]
pub struct HmacAdapter<M> {
    algorithm: HashAlgorithm,
    keyed: Option<Keyed<M>>,
}

#[derive(Clone)]
struct Keyed<M> {
    template: M,
    pending: M,
}

impl HmacMd5 {
    /// Creates an unkeyed HMAC-MD5.
    pub fn md5() -> Self {
        Self::new(HashAlgorithm::Md5)
    }
}

impl HmacSha1 {
    /// Creates an unkeyed HMAC-SHA1.
    pub fn sha1() -> Self {
        Self::new(HashAlgorithm::Sha1)
    }
}

impl<M> HmacAdapter<M> {
    fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            keyed: None,
        }
    }

    /// Returns `true` if the MAC has been keyed.
    pub fn is_keyed(&self) -> bool {
        self.keyed.is_some()
    }

    fn keyed(&self) -> Result<&Keyed<M>, PrfError> {
        self.keyed
            .as_ref()
            .ok_or_else(|| PrfError::state("MAC used before init"))
    }
}

impl<M> fmt::Debug for HmacAdapter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacAdapter")
            .field("algorithm", &self.algorithm)
            .field("keyed", &self.is_keyed())
            .finish_non_exhaustive()
    }
}

impl<M> KeyedMac for HmacAdapter<M>
where
    M: Mac + KeyInit + Clone,
{
    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn mac_size(&self) -> usize {
        <M as OutputSizeUser>::output_size()
    }

    fn init(&mut self, key: &[u8]) -> Result<(), PrfError> {
        let template = <M as KeyInit>::new_from_slice(key)
            .map_err(|_| PrfError::key(format!("invalid {} key", self.algorithm)))?;

        self.keyed = Some(Keyed {
            pending: template.clone(),
            template,
        });

        Ok(())
    }

    fn update(&mut self, bytes: &[u8], offset: usize, length: usize) -> Result<(), PrfError> {
        let range = checked_range(bytes.len(), offset, length)?;
        let keyed = self
            .keyed
            .as_mut()
            .ok_or_else(|| PrfError::state("MAC used before init"))?;

        keyed.pending.update(&bytes[range]);

        Ok(())
    }

    fn digest(&self) -> Result<Vec<u8>, PrfError> {
        let keyed = self.keyed()?;

        Ok(keyed.pending.clone().finalize().into_bytes().to_vec())
    }

    fn reset(&mut self) {
        if let Some(keyed) = self.keyed.as_mut() {
            keyed.pending = keyed.template.clone();
        }
    }
}
