//! TLS 1.0/1.1 key derivation on top of [`TlsPrf`].

use tracing::instrument;
use zeroize::Zeroizing;

use crate::{hash::HashAlgorithm, random::draw, PrfError, TlsPrf};

/// Label of the master secret derivation.
pub const MS_LABEL: &[u8] = b"master secret";
/// Label of the key block derivation.
pub const KEY_LABEL: &[u8] = b"key expansion";
/// Label of the client finished verify data.
pub const CF_LABEL: &[u8] = b"client finished";
/// Label of the server finished verify data.
pub const SF_LABEL: &[u8] = b"server finished";

/// Length of the master secret.
pub const MS_LEN: usize = 48;
/// Length of the finished verify data.
pub const VERIFY_DATA_LEN: usize = 12;
/// Length of the TLS 1.0/1.1 handshake hash, `MD5 ++ SHA-1`.
pub const HANDSHAKE_HASH_LEN: usize = 36;

/// Fills `out` with `PRF(secret, label, seed)`.
pub fn prf(out: &mut [u8], secret: &[u8], label: &[u8], seed: &[u8]) -> Result<(), PrfError> {
    TlsPrf::with_secret(secret, &label_seed(label, &[seed]))?.fill_bytes(out)
}

/// Computes the master secret from the pre-master secret.
#[instrument(level = "debug", skip_all, err)]
pub fn master_secret(
    pms: &[u8],
    client_random: &[u8; 32],
    server_random: &[u8; 32],
) -> Result<Zeroizing<[u8; MS_LEN]>, PrfError> {
    let seed = label_seed(
        MS_LABEL,
        &[client_random.as_slice(), server_random.as_slice()],
    );
    let prf = TlsPrf::with_secret(pms, &seed)?;

    draw(&prf).map(Zeroizing::new)
}

/// Computes the handshake hash over the handshake transcript.
pub fn handshake_hash(transcript: &[u8]) -> [u8; HANDSHAKE_HASH_LEN] {
    let mut hash = [0u8; HANDSHAKE_HASH_LEN];
    let (md5, sha1) = hash.split_at_mut(HashAlgorithm::Md5.output_len());
    md5.copy_from_slice(&HashAlgorithm::Md5.digest(transcript));
    sha1.copy_from_slice(&HashAlgorithm::Sha1.digest(transcript));
    hash
}

/// Derives the key block and finished verify data from a master secret.
///
/// One [`TlsPrf`] is keyed with the master secret and re-seeded for each
/// derivation. Each derivation re-seeds and reads under one lock, so a
/// deriver may be shared between threads.
pub struct KeyDeriver {
    prf: TlsPrf,
    key_seed: Vec<u8>,
}

opaque_debug::implement!(KeyDeriver);

impl KeyDeriver {
    /// Creates a new deriver.
    ///
    /// # Arguments
    ///
    /// * `master_secret` - The master secret.
    /// * `client_random` - The client random.
    /// * `server_random` - The server random.
    pub fn new(
        master_secret: &[u8],
        client_random: &[u8; 32],
        server_random: &[u8; 32],
    ) -> Result<Self, PrfError> {
        let key_seed = label_seed(
            KEY_LABEL,
            &[server_random.as_slice(), client_random.as_slice()],
        );
        let prf = TlsPrf::with_secret(master_secret, &key_seed)?;

        Ok(Self { prf, key_seed })
    }

    /// Returns the first `len` bytes of the key block.
    #[instrument(level = "debug", skip_all, fields(len = len), err)]
    pub fn key_block(&self, len: usize) -> Result<Zeroizing<Vec<u8>>, PrfError> {
        let mut out = Zeroizing::new(vec![0u8; len]);
        self.prf.reseed_and_fill(&self.key_seed, &mut out)?;

        Ok(out)
    }

    /// Computes the client finished verify data.
    ///
    /// # Arguments
    ///
    /// * `handshake_hash` - The handshake transcript hash.
    pub fn client_finished(
        &self,
        handshake_hash: &[u8; HANDSHAKE_HASH_LEN],
    ) -> Result<[u8; VERIFY_DATA_LEN], PrfError> {
        self.verify_data(CF_LABEL, handshake_hash)
    }

    /// Computes the server finished verify data.
    ///
    /// # Arguments
    ///
    /// * `handshake_hash` - The handshake transcript hash.
    pub fn server_finished(
        &self,
        handshake_hash: &[u8; HANDSHAKE_HASH_LEN],
    ) -> Result<[u8; VERIFY_DATA_LEN], PrfError> {
        self.verify_data(SF_LABEL, handshake_hash)
    }

    #[instrument(level = "debug", skip_all, err)]
    fn verify_data(
        &self,
        label: &[u8],
        handshake_hash: &[u8],
    ) -> Result<[u8; VERIFY_DATA_LEN], PrfError> {
        let mut out = [0u8; VERIFY_DATA_LEN];
        self.prf
            .reseed_and_fill(&label_seed(label, &[handshake_hash]), &mut out)?;

        Ok(out)
    }
}

fn label_seed(label: &[u8], parts: &[&[u8]]) -> Vec<u8> {
    let len = label.len() + parts.iter().map(|part| part.len()).sum::<usize>();

    let mut seed = Vec::with_capacity(len);
    seed.extend_from_slice(label);
    parts.iter().for_each(|part| seed.extend_from_slice(part));
    seed
}
