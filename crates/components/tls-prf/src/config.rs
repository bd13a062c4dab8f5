//! PRF initialization parameters.

use core::fmt;

use tracing::trace;
use zeroize::Zeroizing;

/// Option name of the PRF secret.
pub const SECRET_OPTION: &str = "secret";
/// Option name of the PRF seed.
pub const SEED_OPTION: &str = "seed";

/// Parameters passed to [`TlsPrf::init`](crate::TlsPrf::init).
///
/// Either field may be omitted when re-initializing, in which case the value
/// from the previous initialization is reused.
#[derive(Clone, Default, derive_builder::Builder)]
#[builder(pattern = "owned")]
pub struct PrfParams {
    /// The shared secret.
    #[builder(setter(into, strip_option), default)]
    secret: Option<Vec<u8>>,
    /// The label-prefixed seed.
    #[builder(setter(into, strip_option), default)]
    seed: Option<Vec<u8>>,
}

impl PrfParams {
    /// Creates a new builder for `PrfParams`.
    pub fn builder() -> PrfParamsBuilder {
        PrfParamsBuilder::default()
    }

    /// Creates parameters with both a secret and a seed.
    pub fn new(secret: impl Into<Vec<u8>>, seed: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: Some(secret.into()),
            seed: Some(seed.into()),
        }
    }

    /// Creates parameters which replace only the seed.
    pub fn seed_only(seed: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: None,
            seed: Some(seed.into()),
        }
    }

    /// Creates parameters from named options.
    ///
    /// Recognizes [`SECRET_OPTION`] and [`SEED_OPTION`]; other names are
    /// ignored. A repeated name overrides the earlier value.
    pub fn from_options<'a, I>(options: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [u8])>,
    {
        let mut params = Self::default();
        for (name, value) in options {
            match name {
                SECRET_OPTION => params.secret = Some(value.to_vec()),
                SEED_OPTION => params.seed = Some(value.to_vec()),
                _ => trace!(option = name, "ignoring unrecognized prf option"),
            }
        }

        params
    }

    /// Returns the secret, if any.
    pub fn secret(&self) -> Option<&[u8]> {
        self.secret.as_deref()
    }

    /// Returns the seed, if any.
    pub fn seed(&self) -> Option<&[u8]> {
        self.seed.as_deref()
    }

    pub(crate) fn into_parts(mut self) -> (Option<Zeroizing<Vec<u8>>>, Option<Zeroizing<Vec<u8>>>) {
        (
            self.secret.take().map(Zeroizing::new),
            self.seed.take().map(Zeroizing::new),
        )
    }
}

impl fmt::Debug for PrfParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrfParams")
            .field("secret_len", &self.secret.as_ref().map(Vec::len))
            .field("seed_len", &self.seed.as_ref().map(Vec::len))
            .finish()
    }
}

impl Drop for PrfParams {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        self.secret.zeroize();
        self.seed.zeroize();
    }
}
