use core::fmt;
use std::sync::{Mutex, MutexGuard};

use rand_core::TryRngCore;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

use crate::{
    chain::MacChain,
    error::checked_range,
    mac::{HmacMd5, HmacSha1},
    random::{Deterministic, RandomSource},
    PrfError, PrfParams,
};

mod state;
use state::{State, Stream};

pub use state::BUFFER_LEN;

/// The TLS 1.0/1.1 PRF as a byte stream.
///
/// PRF(secret, label, seed) = P_MD5(S1, label + seed) XOR
///                            P_SHA-1(S2, label + seed)
///
/// where `S1` and `S2` are the first and last `ceil(len / 2)` bytes of the
/// secret. The stream is computed 80 bytes at a time, five iterations of MD5
/// and four of SHA-1.
///
/// All operations are serialized on an internal lock, so a `TlsPrf` may be
/// shared between threads.
pub struct TlsPrf {
    state: Mutex<State>,
}

impl TlsPrf {
    /// Creates a new, uninitialized instance of the PRF.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::Uninitialized),
        }
    }

    /// Creates a PRF already initialized with `secret` and `seed`.
    pub fn with_secret(secret: &[u8], seed: &[u8]) -> Result<Self, PrfError> {
        let prf = Self::new();
        prf.init(PrfParams::new(secret, seed))?;

        Ok(prf)
    }

    /// Initializes the PRF.
    ///
    /// The secret and the seed may each be omitted if the PRF was initialized
    /// before, in which case the previous value is reused. The first buffer
    /// of output is computed before this returns.
    ///
    /// On error the PRF is left in its previous state.
    ///
    /// # Arguments
    ///
    /// * `params` - The secret and seed.
    #[instrument(level = "debug", skip_all, err)]
    pub fn init(&self, params: PrfParams) -> Result<(), PrfError> {
        let (secret, seed) = params.into_parts();
        let mut state = self.lock()?;

        Self::reinit(&mut state, secret, seed)
    }

    /// Re-seeds the PRF and fills `out` with the start of the new stream,
    /// holding the lock throughout.
    pub(crate) fn reseed_and_fill(&self, seed: &[u8], out: &mut [u8]) -> Result<(), PrfError> {
        let mut state = self.lock()?;
        Self::reinit(&mut state, None, Some(Zeroizing::new(seed.to_vec())))?;

        state.ready_mut()?.read(out)
    }

    fn reinit(
        state: &mut State,
        secret: Option<Zeroizing<Vec<u8>>>,
        seed: Option<Zeroizing<Vec<u8>>>,
    ) -> Result<(), PrfError> {
        let (md5, sha1) = match (secret, state.ready()) {
            (Some(secret), _) => {
                let (s1, s2) = split_secret(&secret);
                (
                    MacChain::new(HmacMd5::md5(), s1)?,
                    MacChain::new(HmacSha1::sha1(), s2)?,
                )
            }
            (None, Some(stream)) => (stream.md5().clone(), stream.sha1().clone()),
            (None, None) => return Err(PrfError::config("no secret supplied")),
        };

        let seed = match (seed, state.ready()) {
            (Some(seed), _) => seed,
            (None, Some(stream)) => stream.seed().clone(),
            (None, None) => return Err(PrfError::config("no seed supplied")),
        };

        debug!(seed_len = seed.len(), "initializing prf");

        *state = State::Ready(Box::new(Stream::new(md5, sha1, seed)?));

        Ok(())
    }

    /// Returns `true` if the PRF has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.lock()
            .map(|state| state.ready().is_some())
            .unwrap_or(false)
    }

    /// Returns the next byte of the stream.
    #[instrument(level = "trace", skip_all, err)]
    pub fn next_byte(&self) -> Result<u8, PrfError> {
        let mut byte = [0u8; 1];
        self.read(&mut byte)?;

        Ok(byte[0])
    }

    /// Writes the next `length` bytes of the stream into
    /// `dest[offset..offset + length]`.
    ///
    /// Either all `length` bytes are written or none are.
    #[instrument(level = "trace", skip_all, fields(length = length), err)]
    pub fn next_bytes(&self, dest: &mut [u8], offset: usize, length: usize) -> Result<(), PrfError> {
        let mut state = self.lock()?;
        let stream = state.ready_mut()?;
        let range = checked_range(dest.len(), offset, length)?;

        stream.read(&mut dest[range])
    }

    /// Fills `dest` with the next bytes of the stream.
    pub fn fill_bytes(&self, dest: &mut [u8]) -> Result<(), PrfError> {
        self.next_bytes(dest, 0, dest.len())
    }

    /// Returns the next `len` bytes of the stream.
    pub fn take(&self, len: usize) -> Result<Zeroizing<Vec<u8>>, PrfError> {
        let mut out = Zeroizing::new(vec![0u8; len]);
        self.fill_bytes(&mut out)?;

        Ok(out)
    }

    /// Returns an independent copy of the PRF, positioned at the same point of
    /// the same stream.
    pub fn try_clone(&self) -> Result<Self, PrfError> {
        let state = self.lock()?.clone();

        Ok(Self {
            state: Mutex::new(state),
        })
    }

    fn read(&self, out: &mut [u8]) -> Result<(), PrfError> {
        self.next_bytes(out, 0, out.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, PrfError> {
        self.state
            .lock()
            .map_err(|_| PrfError::state("PRF lock poisoned"))
    }
}

impl Default for TlsPrf {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TlsPrf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsPrf")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl RandomSource for TlsPrf {
    fn name(&self) -> &'static str {
        "tls-prf"
    }

    fn next_byte(&self) -> Result<u8, PrfError> {
        TlsPrf::next_byte(self)
    }

    fn next_bytes(&self, dest: &mut [u8], offset: usize, length: usize) -> Result<(), PrfError> {
        TlsPrf::next_bytes(self, dest, offset, length)
    }
}

impl Deterministic for TlsPrf {}

impl TryRngCore for TlsPrf {
    type Error = PrfError;

    fn try_next_u32(&mut self) -> Result<u32, Self::Error> {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes)?;

        Ok(u32::from_le_bytes(bytes))
    }

    fn try_next_u64(&mut self) -> Result<u64, Self::Error> {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes)?;

        Ok(u64::from_le_bytes(bytes))
    }

    fn try_fill_bytes(&mut self, dst: &mut [u8]) -> Result<(), Self::Error> {
        TlsPrf::fill_bytes(self, dst)
    }
}

/// Splits `secret` into the MD5 and SHA-1 halves.
///
/// Both halves are `ceil(len / 2)` bytes long, so for an odd length they
/// share the middle byte.
fn split_secret(secret: &[u8]) -> (&[u8], &[u8]) {
    let half = secret.len().div_ceil(2);

    (&secret[..half], &secret[secret.len() - half..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{kat_seed, prf_reference, KAT_OUTPUT, KAT_SECRET};
    use rstest::rstest;

    fn ready_prf() -> TlsPrf {
        TlsPrf::with_secret(b"secret", b"label seed").unwrap()
    }

    #[test]
    fn test_prf_kat() {
        let prf = TlsPrf::with_secret(&KAT_SECRET, &kat_seed()).unwrap();
        let out = prf.take(104).unwrap();

        assert_eq!(hex::encode(&out[..16]), "d3d4d1e349b5d515044666d51de32bab");
        assert_eq!(hex::encode(&*out), KAT_OUTPUT);
    }

    #[rstest]
    #[case(0)]
    #[case(1)]
    #[case(13)]
    #[case(48)]
    #[case(49)]
    fn test_prf_matches_reference(#[case] secret_len: usize) {
        let secret: Vec<u8> = (0..secret_len as u8).collect();
        let seed = b"key expansion0123456789";

        let prf = TlsPrf::with_secret(&secret, seed).unwrap();
        let out = prf.take(250).unwrap();

        assert_eq!(*out, prf_reference(&secret, seed, 250));
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 1)]
    #[case(2, 1)]
    #[case(13, 7)]
    #[case(48, 24)]
    fn test_split_secret(#[case] len: usize, #[case] half: usize) {
        let secret: Vec<u8> = (0..len as u8).collect();
        let (s1, s2) = split_secret(&secret);

        assert_eq!(s1.len(), half);
        assert_eq!(s2.len(), half);
        assert_eq!(s1, &secret[..half]);
        assert_eq!(s2, &secret[len - half..]);
    }

    #[test]
    fn test_split_secret_odd_overlap() {
        let secret = [1u8, 2, 3, 4, 5, 6, 7];
        let (s1, s2) = split_secret(&secret);

        assert_eq!(s1, &[1, 2, 3, 4]);
        assert_eq!(s2, &[4, 5, 6, 7]);
        assert_eq!(s1.last(), s2.first());
    }

    #[test]
    fn test_uninitialized_rejected() {
        let prf = TlsPrf::new();
        assert!(!prf.is_initialized());
        assert!(prf.next_byte().unwrap_err().is_state());

        let mut dest = [0x55u8; 8];
        assert!(prf.next_bytes(&mut dest, 0, 8).unwrap_err().is_state());
        assert_eq!(dest, [0x55u8; 8]);
    }

    #[test]
    fn test_first_init_requires_secret_and_seed() {
        let prf = TlsPrf::new();

        let err = prf.init(PrfParams::seed_only(b"seed".as_slice())).unwrap_err();
        assert!(err.is_config());
        assert_eq!(err.to_string(), "config error caused by: no secret supplied");

        let err = prf
            .init(PrfParams::builder().secret(b"secret".as_slice()).build().unwrap())
            .unwrap_err();
        assert!(err.is_config());
        assert_eq!(err.to_string(), "config error caused by: no seed supplied");

        assert!(!prf.is_initialized());
    }

    #[test]
    fn test_batching_equivalence() {
        let a = ready_prf();
        let b = ready_prf();

        let batch = a.take(203).unwrap();
        let single: Vec<u8> = (0..203).map(|_| b.next_byte().unwrap()).collect();

        assert_eq!(*batch, single);
    }

    #[test]
    fn test_continuity_across_refills() {
        let a = ready_prf();
        let b = ready_prf();

        let whole = a.take(170).unwrap();

        let mut split = vec![0u8; 170];
        b.next_bytes(&mut split, 0, BUFFER_LEN).unwrap();
        b.next_bytes(&mut split, BUFFER_LEN, 170 - BUFFER_LEN).unwrap();

        assert_eq!(*whole, split);
    }

    #[test]
    fn test_next_bytes_writes_only_range() {
        let a = ready_prf();
        let b = ready_prf();

        let mut dest = [0xeeu8; 10];
        a.next_bytes(&mut dest, 3, 4).unwrap();

        let expected = b.take(4).unwrap();
        assert_eq!(&dest[..3], &[0xee; 3]);
        assert_eq!(&dest[3..7], &expected[..]);
        assert_eq!(&dest[7..], &[0xee; 3]);
    }

    #[test]
    fn test_next_bytes_out_of_bounds() {
        let a = ready_prf();
        let b = ready_prf();

        let mut dest = [0u8; 4];
        assert!(a.next_bytes(&mut dest, 2, 3).unwrap_err().is_bounds());
        assert!(a.next_bytes(&mut dest, 5, 0).unwrap_err().is_bounds());
        assert!(a.next_bytes(&mut dest, usize::MAX, 2).unwrap_err().is_bounds());
        assert_eq!(dest, [0u8; 4]);

        // The stream did not advance.
        assert_eq!(*a.take(16).unwrap(), *b.take(16).unwrap());
    }

    #[test]
    fn test_zero_length_read() {
        let a = ready_prf();
        let b = ready_prf();

        a.take(BUFFER_LEN).unwrap();
        b.take(BUFFER_LEN).unwrap();
        a.next_bytes(&mut [], 0, 0).unwrap();

        assert_eq!(a.next_byte().unwrap(), b.next_byte().unwrap());
    }

    #[test]
    fn test_reinit_seed_only() {
        let reused = TlsPrf::with_secret(b"master", b"first").unwrap();
        reused.take(100).unwrap();
        reused.init(PrfParams::seed_only(b"second".as_slice())).unwrap();

        let fresh = TlsPrf::with_secret(b"master", b"second").unwrap();

        assert_eq!(*reused.take(120).unwrap(), *fresh.take(120).unwrap());
    }

    #[test]
    fn test_reinit_secret_only() {
        let reused = TlsPrf::with_secret(b"first", b"seed").unwrap();
        reused
            .init(PrfParams::builder().secret(b"second".as_slice()).build().unwrap())
            .unwrap();

        let fresh = TlsPrf::with_secret(b"second", b"seed").unwrap();

        assert_eq!(*reused.take(64).unwrap(), *fresh.take(64).unwrap());
    }

    #[test]
    fn test_reinit_restarts_stream() {
        let prf = ready_prf();
        let first = prf.take(90).unwrap();

        prf.init(PrfParams::default()).unwrap();

        assert_eq!(*prf.take(90).unwrap(), *first);
    }

    #[test]
    fn test_try_clone_continues_stream() {
        let prf = ready_prf();
        prf.take(37).unwrap();

        let clone = prf.try_clone().unwrap();
        assert_eq!(*prf.take(100).unwrap(), *clone.take(100).unwrap());

        let uninit = TlsPrf::new().try_clone().unwrap();
        assert!(!uninit.is_initialized());
    }

    #[test]
    fn test_reseed_and_fill_matches_fresh() {
        let prf = TlsPrf::with_secret(b"master", b"first").unwrap();
        prf.take(45).unwrap();

        let mut out = [0u8; 90];
        prf.reseed_and_fill(b"second", &mut out).unwrap();

        let fresh = TlsPrf::with_secret(b"master", b"second").unwrap();
        assert_eq!(out.to_vec(), *fresh.take(90).unwrap());

        // The stream continues after the filled bytes.
        assert_eq!(*prf.take(10).unwrap(), *fresh.take(10).unwrap());
    }

    #[test]
    fn test_reseed_and_fill_uninitialized() {
        let prf = TlsPrf::new();
        let mut out = [3u8; 4];

        assert!(prf.reseed_and_fill(b"seed", &mut out).unwrap_err().is_config());
        assert_eq!(out, [3u8; 4]);
        assert!(!prf.is_initialized());
    }

    #[test]
    fn test_try_rng_core() {
        let mut a = ready_prf();
        let b = ready_prf();

        let expected = b.take(12).unwrap();
        let word = a.try_next_u32().unwrap();
        let dword = a.try_next_u64().unwrap();

        assert_eq!(word.to_le_bytes(), expected[..4]);
        assert_eq!(dword.to_le_bytes(), expected[4..]);
    }

    #[test]
    fn test_debug_does_not_leak() {
        let prf = TlsPrf::with_secret(b"hunter2", b"seed").unwrap();
        assert_eq!(format!("{prf:?}"), "TlsPrf { initialized: true, .. }");
    }
}
