//! Well-known safe-prime MODP groups and the size policy that pairs each
//! group with a recommended private-exponent length.
//!
//! The catalog carries the RFC 3526 groups from 1536 to 8192 bits. Callers may
//! also supply their own parameters as hex strings or as a DER `DHParameter`
//! sequence; such parameters are taken on trust and are not re-verified here.

use crate::errors::DhError;
use der::asn1::UintRef;
use der::{Decode, Encode, Sequence};
use num_bigint::BigUint;
use num_traits::One;

/// A catalog entry: the prime size in octets plus the hex parameters.
struct CatalogEntry {
    size: usize,
    prime: &'static str,
    base: &'static str,
}

const MODP_1536_PRIME: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA237327FFFFFFFFFFFFFFFF",
);

const MODP_2048_PRIME: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF",
);

const MODP_3072_PRIME: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A93AD2CAFFFFFFFFFFFFFFFF",
);

const MODP_4096_PRIME: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7",
    "88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8",
    "DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2",
    "233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9",
    "93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C934063199FFFFFFFFFFFFFFFF",
);

const MODP_6144_PRIME: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7",
    "88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8",
    "DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2",
    "233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9",
    "93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C93402849236C3FAB4D27C7026",
    "C1D4DCB2602646DEC9751E763DBA37BDF8FF9406AD9E530EE5DB382F413001AE",
    "B06A53ED9027D831179727B0865A8918DA3EDBEBCF9B14ED44CE6CBACED4BB1B",
    "DB7F1447E6CC254B332051512BD7AF426FB8F401378CD2BF5983CA01C64B92EC",
    "F032EA15D1721D03F482D7CE6E74FEF6D55E702F46980C82B5A84031900B1C9E",
    "59E7C97FBEC7E8F323A97A7E36CC88BE0F1D45B7FF585AC54BD407B22B4154AA",
    "CC8F6D7EBF48E1D814CC5ED20F8037E0A79715EEF29BE32806A1D58BB7C5DA76",
    "F550AA3D8A1FBFF0EB19CCB1A313D55CDA56C9EC2EF29632387FE8D76E3C0468",
    "043E8F663F4860EE12BF2D5B0B7474D6E694F91E6DCC4024FFFFFFFFFFFFFFFF",
);

const MODP_8192_PRIME: &str = concat!(
    "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74",
    "020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F1437",
    "4FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7ED",
    "EE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF05",
    "98DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB",
    "9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3B",
    "E39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF695581718",
    "3995497CEA956AE515D2261898FA051015728E5A8AAAC42DAD33170D04507A33",
    "A85521ABDF1CBA64ECFB850458DBEF0A8AEA71575D060C7DB3970F85A6E1E4C7",
    "ABF5AE8CDB0933D71E8C94E04A25619DCEE3D2261AD2EE6BF12FFA06D98A0864",
    "D87602733EC86A64521F2B18177B200CBBE117577A615D6C770988C0BAD946E2",
    "08E24FA074E5AB3143DB5BFCE0FD108E4B82D120A92108011A723C12A787E6D7",
    "88719A10BDBA5B2699C327186AF4E23C1A946834B6150BDA2583E9CA2AD44CE8",
    "DBBBC2DB04DE8EF92E8EFC141FBECAA6287C59474E6BC05D99B2964FA090C3A2",
    "233BA186515BE7ED1F612970CEE2D7AFB81BDD762170481CD0069127D5B05AA9",
    "93B4EA988D8FDDC186FFB7DC90A6C08F4DF435C93402849236C3FAB4D27C7026",
    "C1D4DCB2602646DEC9751E763DBA37BDF8FF9406AD9E530EE5DB382F413001AE",
    "B06A53ED9027D831179727B0865A8918DA3EDBEBCF9B14ED44CE6CBACED4BB1B",
    "DB7F1447E6CC254B332051512BD7AF426FB8F401378CD2BF5983CA01C64B92EC",
    "F032EA15D1721D03F482D7CE6E74FEF6D55E702F46980C82B5A84031900B1C9E",
    "59E7C97FBEC7E8F323A97A7E36CC88BE0F1D45B7FF585AC54BD407B22B4154AA",
    "CC8F6D7EBF48E1D814CC5ED20F8037E0A79715EEF29BE32806A1D58BB7C5DA76",
    "F550AA3D8A1FBFF0EB19CCB1A313D55CDA56C9EC2EF29632387FE8D76E3C0468",
    "043E8F663F4860EE12BF2D5B0B7474D6E694F91E6DBE115974A3926F12FEE5E4",
    "38777CB6A932DF8CD8BEC4D073B931BA3BC832B68D9DD300741FA7BF8AFC47ED",
    "2576F6936BA424663AAB639C5AE4F5683423B4742BF1C978238F16CBE39D652D",
    "E3FDB8BEFC848AD922222E04A4037C0713EB57A81A23F0C73473FC646CEA306B",
    "4BCBC8862F8385DDFA9D4B7FA2C087E879683303ED5BDD3A062B3CF5B3A278A6",
    "6D2A13F83F44F82DDF310EE074AB6A364597E899A0255DC164F31CC50846851D",
    "F9AB48195DED7EA1B1D510BD7EE74D73FAF36BC31ECFA268359046F4EB879F92",
    "4009438B481C6CD7889A002ED5EE382BC9190DA6FC026E479558E4475677E9AA",
    "9E3050E2765694DFC81F56E880B96E7160C980DD98EDD3DFFFFFFFFFFFFFFFFF",
);

/// The built-in groups, ordered by ascending prime size.
static DH_GROUPS: [CatalogEntry; 6] = [
    CatalogEntry { size: 192, prime: MODP_1536_PRIME, base: "2" },
    CatalogEntry { size: 256, prime: MODP_2048_PRIME, base: "2" },
    CatalogEntry { size: 384, prime: MODP_3072_PRIME, base: "2" },
    CatalogEntry { size: 512, prime: MODP_4096_PRIME, base: "2" },
    CatalogEntry { size: 768, prime: MODP_6144_PRIME, base: "2" },
    CatalogEntry { size: 1024, prime: MODP_8192_PRIME, base: "2" },
];

/// Returns the smallest and the largest group size in the catalog, in octets.
pub fn group_sizes() -> (usize, usize) {
    let mut low = usize::MAX;
    let mut high = 0;
    for entry in &DH_GROUPS {
        low = low.min(entry.size);
        high = high.max(entry.size);
    }
    (low, high)
}

/// Maps a group size in octets to the recommended private-exponent size in
/// octets, following the strength estimates of RFC 3526 section 8
/// ("Estimate 2").
///
/// # Arguments
///
/// * `groupsize` - The prime size in octets.
///
/// # Returns
///
/// * `usize` - The exponent size in octets, or 0 if no supported group covers
///   the requested size.
pub fn groupsize_to_keysize(groupsize: usize) -> usize {
    if groupsize == 0 {
        0
    } else if groupsize <= 192 {
        30 // 1536-bit group, 240-bit exponent
    } else if groupsize <= 256 {
        40 // 2048-bit group, 320-bit exponent
    } else if groupsize <= 384 {
        52 // 3072-bit group, 416-bit exponent
    } else if groupsize <= 512 {
        60 // 4096-bit group, 480-bit exponent
    } else if groupsize <= 768 {
        67 // 6144-bit group, 536-bit exponent
    } else if groupsize <= 1024 {
        77 // 8192-bit group, 616-bit exponent
    } else {
        0
    }
}

/// The DER shape of externally supplied group parameters,
/// as produced by `openssl dhparam -outform DER`.
#[derive(Sequence)]
struct DhParameter<'a> {
    prime: UintRef<'a>,
    base: UintRef<'a>,
}

/// An immutable Diffie-Hellman group: an odd safe prime `p` and a base `g`
/// generating the prime-order subgroup of (Z/pZ)*.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DhGroup {
    pub(crate) prime: BigUint,
    pub(crate) base: BigUint,
}

impl DhGroup {
    /// Creates a group from already materialized parameters.
    ///
    /// The caller asserts that `prime` is an odd safe prime and that
    /// 1 < `base` < `prime` - 1; neither is re-checked here.
    pub fn new(prime: BigUint, base: BigUint) -> Self {
        Self { prime, base }
    }

    /// Looks up the smallest catalog group whose prime size covers `groupsize`.
    ///
    /// # Arguments
    ///
    /// * `groupsize` - The requested prime size in octets.
    ///
    /// # Returns
    ///
    /// * [`DhGroup`] - The materialized catalog group.
    ///
    /// # Errors
    ///
    /// * [`DhError::InvalidKeySize`] - Returned if no catalog entry is at least
    ///   `groupsize` octets, or if `groupsize` is 0.
    pub fn for_size(groupsize: usize) -> Result<DhGroup, DhError> {
        if groupsize == 0 {
            return Err(DhError::InvalidKeySize);
        }
        let entry = DH_GROUPS
            .iter()
            .find(|entry| entry.size >= groupsize)
            .ok_or(DhError::InvalidKeySize)?;
        DhGroup::from_hex(entry.prime, entry.base)
    }

    /// Parses a group from hexadecimal prime and base strings.
    ///
    /// # Errors
    ///
    /// * [`DhError::InvalidGroup`] - Returned if either string is not valid
    ///   hexadecimal.
    pub fn from_hex(prime_hex: &str, base_hex: &str) -> Result<DhGroup, DhError> {
        let prime =
            BigUint::parse_bytes(prime_hex.as_bytes(), 16).ok_or(DhError::InvalidGroup)?;
        let base = BigUint::parse_bytes(base_hex.as_bytes(), 16).ok_or(DhError::InvalidGroup)?;
        Ok(DhGroup { prime, base })
    }

    /// Decodes a group from a DER `DHParameter` sequence.
    ///
    /// # Errors
    ///
    /// * [`DhError::EncodingError`] - Returned if the input is not a valid
    ///   sequence of two integers.
    pub fn from_der(input: &[u8]) -> Result<DhGroup, DhError> {
        let params = DhParameter::from_der(input)?;
        Ok(DhGroup {
            prime: BigUint::from_bytes_be(params.prime.as_bytes()),
            base: BigUint::from_bytes_be(params.base.as_bytes()),
        })
    }

    /// Encodes the group as a DER `DHParameter` sequence.
    pub fn to_der(&self) -> Result<Vec<u8>, DhError> {
        let prime_bytes = self.prime.to_bytes_be();
        let base_bytes = self.base.to_bytes_be();
        let params = DhParameter {
            prime: UintRef::new(&prime_bytes)?,
            base: UintRef::new(&base_bytes)?,
        };
        Ok(params.to_der()?)
    }

    /// Returns the prime size in octets.
    pub fn size(&self) -> usize {
        (self.prime.bits() + 7) / 8
    }

    /// Returns the prime modulus `p`.
    pub fn prime(&self) -> &BigUint {
        &self.prime
    }

    /// Returns the base `g`.
    pub fn base(&self) -> &BigUint {
        &self.base
    }

    /// Checks that a candidate public value lies strictly between 1 and p-1,
    /// which excludes the two small-order elements a safe-prime group admits.
    pub(crate) fn is_valid_public_value(&self, y: &BigUint) -> bool {
        let p_minus_1 = &self.prime - &BigUint::one();
        *y > BigUint::one() && *y < p_minus_1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::prime::probably_prime;

    #[test]
    fn test_policy_table() {
        assert_eq!(groupsize_to_keysize(0), 0);
        assert_eq!(groupsize_to_keysize(192), 30);
        assert_eq!(groupsize_to_keysize(200), 40);
        assert_eq!(groupsize_to_keysize(256), 40);
        assert_eq!(groupsize_to_keysize(384), 52);
        assert_eq!(groupsize_to_keysize(512), 60);
        assert_eq!(groupsize_to_keysize(768), 67);
        assert_eq!(groupsize_to_keysize(1024), 77);
        assert_eq!(groupsize_to_keysize(1025), 0);
    }

    #[test]
    fn test_group_sizes() {
        assert_eq!(group_sizes(), (192, 1024));
    }

    #[test]
    fn test_for_size_rounds_up() {
        let group = DhGroup::for_size(200).unwrap();
        assert_eq!(group.size(), 256);
    }

    #[test]
    fn test_for_size_too_large() {
        assert!(matches!(
            DhGroup::for_size(1025),
            Err(DhError::InvalidKeySize)
        ));
        assert!(matches!(DhGroup::for_size(0), Err(DhError::InvalidKeySize)));
    }

    #[test]
    fn test_from_hex_rejects_garbage() {
        assert!(matches!(
            DhGroup::from_hex("xyz", "2"),
            Err(DhError::InvalidGroup)
        ));
    }

    #[test]
    fn test_catalog_base_generates_prime_order_subgroup() {
        let two = BigUint::from(2u32);
        for entry in &DH_GROUPS {
            let group = DhGroup::from_hex(entry.prime, entry.base).unwrap();
            assert_eq!(group.size(), entry.size);
            // p must be odd
            assert_eq!(&group.prime % &two, BigUint::one());
            // g^((p-1)/2) mod p must be 1
            let order = (&group.prime - &BigUint::one()) >> 1;
            let residue = group.base.modpow(&order, &group.prime);
            assert_eq!(residue, BigUint::one());
        }
    }

    #[test]
    fn test_smallest_catalog_groups_are_safe_primes() {
        for entry in DH_GROUPS.iter().take(2) {
            let group = DhGroup::from_hex(entry.prime, entry.base).unwrap();
            assert!(probably_prime(&group.prime, 8));
            let half = (&group.prime - &BigUint::one()) >> 1;
            assert!(probably_prime(&half, 8));
        }
    }

    // Miller-Rabin on the 3072..8192-bit groups takes minutes; run on demand.
    #[test]
    #[ignore]
    fn test_full_catalog_is_safe_primes() {
        for entry in &DH_GROUPS {
            let group = DhGroup::from_hex(entry.prime, entry.base).unwrap();
            assert!(probably_prime(&group.prime, 8));
            let half = (&group.prime - &BigUint::one()) >> 1;
            assert!(probably_prime(&half, 8));
        }
    }

    #[test]
    fn test_der_parameter_round_trip() {
        let group = DhGroup::for_size(192).unwrap();
        let encoded = group.to_der().unwrap();
        let decoded = DhGroup::from_der(&encoded).unwrap();
        assert_eq!(decoded, group);
    }
}
