//! This crate implements the TLS 1.0/1.1 pseudo-random function.
//!
//! [`TlsPrf`] is a keyed byte stream computing
//!
//! PRF(secret, label, seed) = P_MD5(S1, label + seed) XOR
//!                            P_SHA-1(S2, label + seed)
//!
//! The caller concatenates the label in front of the seed. Key derivations
//! built on the stream are in [`derive`].

#![deny(missing_docs, unreachable_pub, unused_must_use)]
#![deny(clippy::all)]
#![forbid(unsafe_code)]

mod chain;
mod config;
pub mod derive;
mod error;
pub mod hash;
pub mod mac;
mod prf;
pub mod random;
#[cfg(test)]
mod test_utils;

pub use config::{PrfParams, PrfParamsBuilder, PrfParamsBuilderError, SECRET_OPTION, SEED_OPTION};
pub use error::PrfError;
pub use prf::{TlsPrf, BUFFER_LEN};
