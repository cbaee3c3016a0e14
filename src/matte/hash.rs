//! Name → ID hashing as defined by the Cryptomatte convention.
//!
//! Renderers hash every object name with MurmurHash3 (x86, 32-bit, seed 0)
//! and store the hash bits as a float in the ID channels. The exponent is
//! nudged so the float is always normal, which keeps the value stable
//! through compositing software that flushes denormals or mangles NaNs.

use super::id::{ByteOrder, ObjectId};

const C1: u32 = 0xcc9e_2d51;
const C2: u32 = 0x1b87_3593;

/// MurmurHash3, x86 32-bit variant.
///
/// Blocks and the tail are read little-endian, independent of the host.
pub fn murmur3_32(data: &[u8], seed: u32) -> u32 {
    let mut h = seed;
    let mut blocks = data.chunks_exact(4);

    for block in &mut blocks {
        let k = u32::from_le_bytes([block[0], block[1], block[2], block[3]]);
        h ^= mix_k(k);
        h = h.rotate_left(13);
        h = h.wrapping_mul(5).wrapping_add(0xe654_6b64);
    }

    let tail = blocks.remainder();
    if !tail.is_empty() {
        let mut k = 0u32;
        for (i, byte) in tail.iter().enumerate() {
            k ^= u32::from(*byte) << (8 * i);
        }
        h ^= mix_k(k);
    }

    // Only the low 32 bits of the length take part, as in the reference.
    h ^= data.len() as u32;
    fmix32(h)
}

#[inline]
fn mix_k(k: u32) -> u32 {
    k.wrapping_mul(C1).rotate_left(15).wrapping_mul(C2)
}

#[inline]
fn fmix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

/// Hashes an object name to its Cryptomatte ID.
///
/// The result never has an exponent of 0 or 255, so it is never zero,
/// denormal, infinite or NaN.
///
/// ```
/// use kriptomatte::matte::hash_name_to_id;
///
/// assert_eq!(hash_name_to_id("hello").to_hex(), "248bfa47");
/// ```
pub fn hash_name_to_id(name: &str) -> ObjectId {
    let mut hash = murmur3_32(name.as_bytes(), 0);
    let exponent = (hash >> 23) & 0xff;
    if exponent == 0 || exponent == 0xff {
        hash ^= 1 << 23;
    }
    ObjectId::from_bytes(hash.to_le_bytes(), ByteOrder::Little)
}
