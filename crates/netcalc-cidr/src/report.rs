use crate::Subnet;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Flat view of a [`Subnet`] for JSON/CSV output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetReport {
    pub address: Ipv4Addr,
    pub prefix_len: u8,
    pub mask: Ipv4Addr,
    pub wildcard_mask: Ipv4Addr,
    pub network: Ipv4Addr,
    pub broadcast: Ipv4Addr,
    pub available_hosts: u64,
    pub first_usable_host: Ipv4Addr,
    pub last_usable_host: Ipv4Addr,
    pub address_bits: String,
    pub mask_bits: String,
    pub network_bits: String,
    pub broadcast_bits: String,
}

impl From<&Subnet> for SubnetReport {
    fn from(subnet: &Subnet) -> Self {
        Self {
            address: subnet.address(),
            prefix_len: subnet.prefix_len(),
            mask: subnet.mask(),
            wildcard_mask: subnet.wildcard_mask(),
            network: subnet.network(),
            broadcast: subnet.broadcast(),
            available_hosts: subnet.available_hosts(),
            first_usable_host: subnet.first_usable_host(),
            last_usable_host: subnet.last_usable_host(),
            address_bits: subnet.address_bits(),
            mask_bits: subnet.mask_bits(),
            network_bits: subnet.network_bits(),
            broadcast_bits: subnet.broadcast_bits(),
        }
    }
}
