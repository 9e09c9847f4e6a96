//! Registry of the digest algorithms available to the key-encryption
//! construction. Each algorithm carries a stable object identifier so the
//! chosen hash can travel inside the ciphertext.

use der::asn1::ObjectIdentifier;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

const MD5_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.2.5");
const SHA1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.14.3.2.26");
const SHA256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.1");
const SHA512_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.2.3");

/// A digest algorithm known to the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HashAlg {
    Md5,
    Sha1,
    Sha256,
    Sha512,
}

impl HashAlg {
    /// Returns the canonical object identifier for the algorithm.
    pub const fn oid(self) -> ObjectIdentifier {
        match self {
            HashAlg::Md5 => MD5_OID,
            HashAlg::Sha1 => SHA1_OID,
            HashAlg::Sha256 => SHA256_OID,
            HashAlg::Sha512 => SHA512_OID,
        }
    }

    /// Resolves an object identifier back to an algorithm.
    ///
    /// # Returns
    ///
    /// * `Option<HashAlg>`
    ///   * `Some(HashAlg)` - If the identifier names a registered algorithm.
    ///   * `None` - If the identifier is unknown.
    pub fn from_oid(oid: &ObjectIdentifier) -> Option<HashAlg> {
        if *oid == MD5_OID {
            Some(HashAlg::Md5)
        } else if *oid == SHA1_OID {
            Some(HashAlg::Sha1)
        } else if *oid == SHA256_OID {
            Some(HashAlg::Sha256)
        } else if *oid == SHA512_OID {
            Some(HashAlg::Sha512)
        } else {
            None
        }
    }

    /// Returns the digest length in octets.
    pub const fn output_len(self) -> usize {
        match self {
            HashAlg::Md5 => 16,
            HashAlg::Sha1 => 20,
            HashAlg::Sha256 => 32,
            HashAlg::Sha512 => 64,
        }
    }

    /// Computes the digest of `data` in one shot.
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlg::Md5 => Md5::digest(data).to_vec(),
            HashAlg::Sha1 => Sha1::digest(data).to_vec(),
            HashAlg::Sha256 => Sha256::digest(data).to_vec(),
            HashAlg::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}
