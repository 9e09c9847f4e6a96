
// byte length of the fixed header on exported key packets
pub(crate) const PACKET_HEADER_LEN: usize = 4;
// packet magic byte
pub(crate) const PACKET_MAGIC: u8 = 0x91;
// section identifier for Diffie-Hellman material
pub(crate) const PACKET_SECT_DH: u8 = 0x44;
// subtype identifier for key packets
pub(crate) const PACKET_SUB_KEY: u8 = 0x4B;
// packet format version
pub(crate) const PACKET_VERSION: u8 = 0x01;
// fixed header on exported key packets
pub(crate) const PACKET_HEADER: [u8; PACKET_HEADER_LEN] =
    [PACKET_MAGIC, PACKET_SECT_DH, PACKET_SUB_KEY, PACKET_VERSION];
// byte length of the big-endian length prefix on each serialized bignum
pub(crate) const BIGNUM_LEN_PREFIX: usize = 4;
// random draws tolerated before key generation gives up on the PRNG
pub(crate) const MAX_KEYGEN_DRAWS: usize = 256;
