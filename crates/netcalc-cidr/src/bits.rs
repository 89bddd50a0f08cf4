//! Bit-string forms of IPv4 addresses
//!
//! A bit-string is 32 `'0'`/`'1'` characters, most significant bit first,
//! one octet after another.

use crate::{CidrError, Result};
use std::net::Ipv4Addr;

const ADDRESS_BITS: usize = 32;
const OCTET_BITS: usize = 8;

/// Convert an address to its 32-character bit-string
///
/// ```
/// use netcalc_cidr::address_to_bits;
/// use std::net::Ipv4Addr;
///
/// assert_eq!(
///     address_to_bits(Ipv4Addr::new(255, 255, 255, 0)),
///     "11111111111111111111111100000000"
/// );
/// ```
pub fn address_to_bits(addr: Ipv4Addr) -> String {
    addr.octets()
        .iter()
        .map(|octet| format!("{octet:08b}"))
        .collect()
}

/// Convert a 32-character bit-string back to an address
///
/// Each group of eight characters is read as one base-2 octet.
pub fn bits_to_address(bits: &str) -> Result<Ipv4Addr> {
    if bits.len() != ADDRESS_BITS || !bits.bytes().all(|b| b == b'0' || b == b'1') {
        return Err(CidrError::InvalidBitString(bits.to_string()));
    }

    let mut octets = [0u8; 4];
    for (octet, group) in octets.iter_mut().zip(bits.as_bytes().chunks(OCTET_BITS)) {
        *octet = group.iter().fold(0u8, |acc, b| (acc << 1) | (b - b'0'));
    }

    Ok(Ipv4Addr::from(octets))
}

/// Split a bit-string into dot-separated 8-bit groups
///
/// ```
/// use netcalc_cidr::group_bits;
///
/// assert_eq!(
///     group_bits("11000000101010000000000000000001"),
///     "11000000.10101000.00000000.00000001"
/// );
/// ```
pub fn group_bits(bits: &str) -> String {
    let chars: Vec<char> = bits.chars().collect();
    chars
        .chunks(OCTET_BITS)
        .map(|group| group.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join(".")
}
