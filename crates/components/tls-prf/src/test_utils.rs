use hmac::{digest::KeyInit, Mac};

/// Reference `P_hash` computed directly with a RustCrypto HMAC.
pub(crate) fn p_hash<M>(secret: &[u8], seed: &[u8], len: usize) -> Vec<u8>
where
    M: Mac + KeyInit + Clone,
{
    let keyed = <M as KeyInit>::new_from_slice(secret).unwrap();

    // A(1)
    let mut current_a = keyed.clone();
    current_a.update(seed);
    let mut a = current_a.finalize().into_bytes().to_vec();

    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        // P_hash[i] = HMAC_hash(secret, A(i) + seed)
        let mut p_term = keyed.clone();
        p_term.update(&a);
        p_term.update(seed);
        out.extend_from_slice(&p_term.finalize().into_bytes());

        // A(i+1) = HMAC_hash(secret, A(i))
        let mut next_a = keyed.clone();
        next_a.update(&a);
        a = next_a.finalize().into_bytes().to_vec();
    }

    out.truncate(len);
    out
}

/// Reference TLS 1.0 PRF over a label-prefixed seed.
pub(crate) fn prf_reference(secret: &[u8], label_seed: &[u8], len: usize) -> Vec<u8> {
    let half = secret.len().div_ceil(2);
    let s1 = &secret[..half];
    let s2 = &secret[secret.len() - half..];

    let md5 = p_hash::<hmac::Hmac<md5::Md5>>(s1, label_seed, len);
    let sha1 = p_hash::<hmac::Hmac<sha1::Sha1>>(s2, label_seed, len);

    md5.iter().zip(sha1).map(|(a, b)| a ^ b).collect()
}

/// `"PRF Testvector" ++ 0xcd * 64` keyed with `0xab * 48`.
pub(crate) const KAT_SECRET: [u8; 48] = [0xab; 48];

pub(crate) fn kat_seed() -> Vec<u8> {
    let mut seed = b"PRF Testvector".to_vec();
    seed.extend_from_slice(&[0xcd; 64]);
    seed
}

pub(crate) const KAT_OUTPUT: &str = "d3d4d1e349b5d515044666d51de32bab258cb521b6b053463e354832fd976754\
                                     443bcf9a296519bc289abcbc1187e4ebd31e602353776c408aafb74cbc85eff6\
                                     9255f9788faa184cbb957a9819d84a5d7eb006eb459d3ae8de9810454b8b2d8f\
                                     1afbc655a8c9a013";

#[test]
fn test_prf_reference_kat() {
    let out = prf_reference(&KAT_SECRET, &kat_seed(), 104);
    assert_eq!(hex::encode(out), KAT_OUTPUT);
}
