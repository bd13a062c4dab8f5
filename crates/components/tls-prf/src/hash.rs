//! Hash functions used by the PRF.

use core::{fmt, str::FromStr};

use md5::{Digest, Md5};
use sha1::Sha1;

use crate::{
    mac::{HmacMd5, HmacSha1, KeyedMac},
    PrfError,
};

/// A hash function which parametrizes a [`KeyedMac`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// MD5, 128-bit output.
    Md5,
    /// SHA-1, 160-bit output.
    Sha1,
}

impl HashAlgorithm {
    /// Returns the canonical name of the algorithm.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
        }
    }

    /// Returns the output length in bytes.
    pub const fn output_len(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
        }
    }

    /// Returns an unkeyed HMAC over this hash function.
    pub fn new_mac(&self) -> Box<dyn KeyedMac + Send> {
        match self {
            Self::Md5 => Box::new(HmacMd5::md5()),
            Self::Sha1 => Box::new(HmacSha1::sha1()),
        }
    }

    /// Hashes `data`.
    pub fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5 => Md5::digest(data).to_vec(),
            Self::Sha1 => Sha1::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = PrfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("md5") {
            Ok(Self::Md5)
        } else if s.eq_ignore_ascii_case("sha1") || s.eq_ignore_ascii_case("sha-1") {
            Ok(Self::Sha1)
        } else {
            Err(PrfError::config(format!("unknown hash algorithm: {s}")))
        }
    }
}
