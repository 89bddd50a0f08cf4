//! IPv4 CIDR parsing and subnet calculations
//!
//! Derives everything a subnet calculator shows from a single
//! `address/prefix` string:
//! - Subnet mask and wildcard mask
//! - Network id and broadcast address
//! - Usable host count and usable host range
//! - 32-character bit-string forms of each address
//!
//! # Examples
//!
//! ```
//! use netcalc_cidr::Subnet;
//! use std::net::Ipv4Addr;
//!
//! let subnet = Subnet::parse("192.168.0.0/24").unwrap();
//! assert_eq!(subnet.mask(), Ipv4Addr::new(255, 255, 255, 0));
//! assert_eq!(subnet.broadcast(), Ipv4Addr::new(192, 168, 0, 255));
//! assert_eq!(subnet.available_hosts(), 254);
//! assert_eq!(subnet.first_usable_host(), Ipv4Addr::new(192, 168, 0, 1));
//! assert_eq!(subnet.last_usable_host(), Ipv4Addr::new(192, 168, 0, 254));
//! ```

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

mod bits;
mod report;

pub use bits::{address_to_bits, bits_to_address, group_bits};
pub use report::SubnetReport;

/// Largest accepted prefix length. A /32 has no host part and is rejected.
pub const MAX_PREFIX_LEN: u8 = 31;

/// CIDR errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    /// Input is not of the form `address/prefix`
    #[error("Invalid CIDR notation: {0:?} (expected x.x.x.x/prefix)")]
    MalformedInput(String),

    /// A sign character appeared where none is allowed
    #[error("Invalid character in CIDR notation: {0:?}")]
    InvalidCharacter(String),

    /// Prefix is not a base-10 integer
    #[error("Invalid prefix: {0:?}")]
    InvalidPrefix(String),

    /// Prefix is an integer but outside 0-31
    #[error("Invalid prefix length: {0} (must be 0-31)")]
    PrefixOutOfRange(i64),

    /// Address is not four octets in 0-255
    #[error("Invalid IP address: {0:?}")]
    InvalidAddress(String),

    /// Bit-string is not exactly 32 binary digits
    #[error("Invalid bit string: {0:?} (expected 32 binary digits)")]
    InvalidBitString(String),
}

pub type Result<T> = std::result::Result<T, CidrError>;

/// Subnet mask with `prefix_len` leading one bits.
///
/// ```
/// assert_eq!(netcalc_cidr::prefix_mask(24), 0xFFFF_FF00);
/// assert_eq!(netcalc_cidr::prefix_mask(0), 0);
/// ```
pub fn prefix_mask(prefix_len: u8) -> u32 {
    u32::MAX
        .checked_shl(32 - u32::from(prefix_len.min(32)))
        .unwrap_or(0)
}

/// A single address/prefix pair with every derived value computed up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subnet {
    address: u32,
    prefix_len: u8,
    mask: u32,
    network: u32,
    broadcast: u32,
}

impl Subnet {
    /// Parse `address/prefix` notation
    ///
    /// Surrounding whitespace is ignored. Checks run in a fixed order, so
    /// the first failing one decides the error:
    /// 1. exactly one `/` ([`CidrError::MalformedInput`])
    /// 2. no `+`/`-` in the address and no `-` in the prefix
    ///    ([`CidrError::InvalidCharacter`])
    /// 3. prefix is an integer ([`CidrError::InvalidPrefix`])
    /// 4. prefix is 0-31 ([`CidrError::PrefixOutOfRange`])
    /// 5. address is four octets in 0-255 ([`CidrError::InvalidAddress`])
    ///
    /// # Examples
    ///
    /// ```
    /// use netcalc_cidr::{CidrError, Subnet};
    ///
    /// let subnet = Subnet::parse("10.0.0.5/30").unwrap();
    /// assert_eq!(subnet.prefix_len(), 30);
    ///
    /// assert!(matches!(
    ///     Subnet::parse("1.2.3.4/-1"),
    ///     Err(CidrError::InvalidCharacter(_))
    /// ));
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        let parts: Vec<&str> = input.split('/').collect();
        let [addr_str, prefix_str] = parts[..] else {
            return Err(CidrError::MalformedInput(input.to_string()));
        };

        if addr_str.contains(|c: char| c == '+' || c == '-') || prefix_str.contains('-') {
            return Err(CidrError::InvalidCharacter(input.to_string()));
        }

        let prefix: i64 = prefix_str
            .parse()
            .map_err(|_| CidrError::InvalidPrefix(prefix_str.to_string()))?;
        let prefix_len = u8::try_from(prefix)
            .ok()
            .filter(|len| *len <= MAX_PREFIX_LEN)
            .ok_or(CidrError::PrefixOutOfRange(prefix))?;

        let address = Self::parse_ipv4(addr_str)?;

        Self::new(address, prefix_len)
    }

    /// Parse dotted-quad text into an address
    fn parse_ipv4(ip: &str) -> Result<Ipv4Addr> {
        let octets: Vec<&str> = ip.split('.').collect();
        if octets.len() != 4 {
            return Err(CidrError::InvalidAddress(ip.to_string()));
        }

        let mut bytes = [0u8; 4];
        for (byte, octet_str) in bytes.iter_mut().zip(&octets) {
            *byte = octet_str
                .parse()
                .map_err(|_| CidrError::InvalidAddress(ip.to_string()))?;
        }

        Ok(Ipv4Addr::from(bytes))
    }

    /// Build a subnet from an address and prefix length (0-31)
    pub fn new(address: Ipv4Addr, prefix_len: u8) -> Result<Self> {
        if prefix_len > MAX_PREFIX_LEN {
            return Err(CidrError::PrefixOutOfRange(i64::from(prefix_len)));
        }

        let address_bits = u32::from(address);
        let mask = prefix_mask(prefix_len);
        let subnet = Self {
            address: address_bits,
            prefix_len,
            mask,
            network: address_bits & mask,
            broadcast: address_bits | !mask,
        };

        tracing::trace!(
            %address,
            prefix_len,
            network = %subnet.network(),
            broadcast = %subnet.broadcast(),
            "derived subnet"
        );

        Ok(subnet)
    }

    /// Address as given, host bits included
    pub fn address(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.address)
    }

    /// Prefix length (0-31)
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Subnet mask
    pub fn mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.mask)
    }

    /// Inverted subnet mask (host bits set)
    pub fn wildcard_mask(&self) -> Ipv4Addr {
        Ipv4Addr::from(!self.mask)
    }

    /// Network id: address with all host bits cleared
    pub fn network(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.network)
    }

    /// Broadcast address: address with all host bits set
    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.broadcast)
    }

    /// Total number of addresses in the block, network and broadcast included
    pub fn size(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_len))
    }

    /// Addresses strictly between network id and broadcast: `2^(32-prefix) - 2`
    ///
    /// A /31 yields 0.
    pub fn available_hosts(&self) -> u64 {
        self.size() - 2
    }

    /// Whether the block has any address besides network id and broadcast
    pub fn has_usable_hosts(&self) -> bool {
        self.available_hosts() > 0
    }

    /// Network id + 1
    ///
    /// For a /31 this is the broadcast address and lies above
    /// [`last_usable_host`](Self::last_usable_host), i.e. the range is empty.
    pub fn first_usable_host(&self) -> Ipv4Addr {
        // host bits of the network id are zero, so the low bit is free
        Ipv4Addr::from(self.network | 1)
    }

    /// Broadcast - 1
    ///
    /// For a /31 this is the network id.
    pub fn last_usable_host(&self) -> Ipv4Addr {
        // host bits of the broadcast are one, so the low bit is set
        Ipv4Addr::from(self.broadcast & !1)
    }

    /// Address as a 32-character bit-string
    pub fn address_bits(&self) -> String {
        address_to_bits(self.address())
    }

    /// Subnet mask as a 32-character bit-string
    pub fn mask_bits(&self) -> String {
        address_to_bits(self.mask())
    }

    /// Network id as a 32-character bit-string
    pub fn network_bits(&self) -> String {
        address_to_bits(self.network())
    }

    /// Broadcast address as a 32-character bit-string
    pub fn broadcast_bits(&self) -> String {
        address_to_bits(self.broadcast())
    }

    /// Snapshot of every derived value, ready for serialization
    pub fn report(&self) -> SubnetReport {
        SubnetReport::from(self)
    }
}

impl FromStr for Subnet {
    type Err = CidrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address(), self.prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slash_24() {
        let subnet = Subnet::parse("192.168.0.0/24").unwrap();
        assert_eq!(subnet.address(), Ipv4Addr::new(192, 168, 0, 0));
        assert_eq!(subnet.prefix_len(), 24);
        assert_eq!(subnet.mask(), Ipv4Addr::new(255, 255, 255, 0));
        assert_eq!(subnet.network(), Ipv4Addr::new(192, 168, 0, 0));
        assert_eq!(subnet.broadcast(), Ipv4Addr::new(192, 168, 0, 255));
        assert_eq!(subnet.available_hosts(), 254);
        assert_eq!(subnet.first_usable_host(), Ipv4Addr::new(192, 168, 0, 1));
        assert_eq!(subnet.last_usable_host(), Ipv4Addr::new(192, 168, 0, 254));
    }

    #[test]
    fn test_parse_slash_30_host_address() {
        let subnet = Subnet::parse("10.0.0.5/30").unwrap();
        assert_eq!(subnet.address(), Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(subnet.mask(), Ipv4Addr::new(255, 255, 255, 252));
        assert_eq!(subnet.network(), Ipv4Addr::new(10, 0, 0, 4));
        assert_eq!(subnet.broadcast(), Ipv4Addr::new(10, 0, 0, 7));
        assert_eq!(subnet.available_hosts(), 2);
        assert_eq!(subnet.first_usable_host(), Ipv4Addr::new(10, 0, 0, 5));
        assert_eq!(subnet.last_usable_host(), Ipv4Addr::new(10, 0, 0, 6));
    }

    #[test]
    fn test_parse_slash_31() {
        let subnet = Subnet::parse("172.16.5.10/31").unwrap();
        assert_eq!(subnet.available_hosts(), 0);
        assert!(!subnet.has_usable_hosts());
        assert_eq!(subnet.network(), Ipv4Addr::new(172, 16, 5, 10));
        assert_eq!(subnet.broadcast(), Ipv4Addr::new(172, 16, 5, 11));
        assert_eq!(subnet.first_usable_host(), Ipv4Addr::new(172, 16, 5, 11));
        assert_eq!(subnet.last_usable_host(), Ipv4Addr::new(172, 16, 5, 10));
    }

    #[test]
    fn test_parse_slash_0() {
        let subnet = Subnet::parse("8.8.8.8/0").unwrap();
        assert_eq!(subnet.mask(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(subnet.network(), Ipv4Addr::UNSPECIFIED);
        assert_eq!(subnet.broadcast(), Ipv4Addr::BROADCAST);
        assert_eq!(subnet.available_hosts(), 4_294_967_294);
        assert_eq!(subnet.first_usable_host(), Ipv4Addr::new(0, 0, 0, 1));
        assert_eq!(subnet.last_usable_host(), Ipv4Addr::new(255, 255, 255, 254));
    }

    #[test]
    fn test_parse_slash_16_range() {
        let subnet = Subnet::parse("172.16.200.17/16").unwrap();
        assert_eq!(subnet.network(), Ipv4Addr::new(172, 16, 0, 0));
        assert_eq!(subnet.broadcast(), Ipv4Addr::new(172, 16, 255, 255));
        assert_eq!(subnet.first_usable_host(), Ipv4Addr::new(172, 16, 0, 1));
        assert_eq!(subnet.last_usable_host(), Ipv4Addr::new(172, 16, 255, 254));
        assert_eq!(subnet.available_hosts(), 65534);
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let subnet = Subnet::parse("  10.1.2.3/8\n").unwrap();
        assert_eq!(subnet.network(), Ipv4Addr::new(10, 0, 0, 0));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            Subnet::parse("abc"),
            Err(CidrError::MalformedInput(_))
        ));
        assert!(matches!(
            Subnet::parse("192.168.0.0"),
            Err(CidrError::MalformedInput(_))
        ));
        assert!(matches!(
            Subnet::parse("192.168.0.0/24/8"),
            Err(CidrError::MalformedInput(_))
        ));
        assert!(matches!(Subnet::parse(""), Err(CidrError::MalformedInput(_))));
    }

    #[test]
    fn test_parse_sign_characters() {
        assert!(matches!(
            Subnet::parse("1.2.3.4/-1"),
            Err(CidrError::InvalidCharacter(_))
        ));
        assert!(matches!(
            Subnet::parse("+1.2.3.4/24"),
            Err(CidrError::InvalidCharacter(_))
        ));
        assert!(matches!(
            Subnet::parse("1.2.-3.4/24"),
            Err(CidrError::InvalidCharacter(_))
        ));
    }

    #[test]
    fn test_parse_invalid_prefix() {
        assert!(matches!(
            Subnet::parse("192.168.0.0/abc"),
            Err(CidrError::InvalidPrefix(_))
        ));
        assert!(matches!(
            Subnet::parse("192.168.0.0/"),
            Err(CidrError::InvalidPrefix(_))
        ));
        assert!(matches!(
            Subnet::parse("192.168.0.0/2 4"),
            Err(CidrError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn test_parse_prefix_out_of_range() {
        assert_eq!(
            Subnet::parse("192.168.0.0/32"),
            Err(CidrError::PrefixOutOfRange(32))
        );
        assert_eq!(
            Subnet::parse("192.168.0.0/300"),
            Err(CidrError::PrefixOutOfRange(300))
        );
    }

    #[test]
    fn test_parse_prefix_checked_before_address() {
        assert_eq!(
            Subnet::parse("999.1.1.1/40"),
            Err(CidrError::PrefixOutOfRange(40))
        );
    }

    #[test]
    fn test_parse_invalid_address() {
        for input in [
            "256.0.0.0/24",
            "1.2.3/24",
            "1.2.3.4.5/24",
            "1..3.4/24",
            "a.b.c.d/24",
            "/24",
        ] {
            assert!(
                matches!(Subnet::parse(input), Err(CidrError::InvalidAddress(_))),
                "{input} should be rejected as an invalid address"
            );
        }
    }

    #[test]
    fn test_new_rejects_slash_32() {
        assert_eq!(
            Subnet::new(Ipv4Addr::LOCALHOST, 32),
            Err(CidrError::PrefixOutOfRange(32))
        );
    }

    #[test]
    fn test_prefix_mask() {
        assert_eq!(prefix_mask(0), 0x0000_0000);
        assert_eq!(prefix_mask(1), 0x8000_0000);
        assert_eq!(prefix_mask(8), 0xFF00_0000);
        assert_eq!(prefix_mask(16), 0xFFFF_0000);
        assert_eq!(prefix_mask(24), 0xFFFF_FF00);
        assert_eq!(prefix_mask(31), 0xFFFF_FFFE);
        assert_eq!(prefix_mask(32), 0xFFFF_FFFF);
    }

    #[test]
    fn test_wildcard_mask() {
        let subnet = Subnet::parse("10.0.0.0/20").unwrap();
        assert_eq!(subnet.wildcard_mask(), Ipv4Addr::new(0, 0, 15, 255));
    }

    #[test]
    fn test_bits_accessors() {
        let subnet = Subnet::parse("192.168.100.10/24").unwrap();
        assert_eq!(subnet.address_bits(), "11000000101010000110010000001010");
        assert_eq!(subnet.mask_bits(), "11111111111111111111111100000000");
        assert_eq!(subnet.network_bits(), "11000000101010000110010000000000");
        assert_eq!(subnet.broadcast_bits(), "11000000101010000110010011111111");
    }

    #[test]
    fn test_display_and_from_str() {
        let subnet: Subnet = "10.0.0.5/30".parse().unwrap();
        assert_eq!(subnet.to_string(), "10.0.0.5/30");
    }

    #[test]
    fn test_error_display() {
        let err = CidrError::PrefixOutOfRange(32);
        assert_eq!(err.to_string(), "Invalid prefix length: 32 (must be 0-31)");

        let err = CidrError::InvalidPrefix("abc".to_string());
        assert_eq!(err.to_string(), "Invalid prefix: \"abc\"");
    }
}
