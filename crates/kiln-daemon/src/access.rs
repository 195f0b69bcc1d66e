//! Network access control
//!
//! Two endpoint classes are gated by caller address: operator-host-only
//! (merged and per-instance log views) and operator-subnet-only (instance
//! deletion, node check-in). This module answers the "where does the caller
//! come from" question; enforcement lives in the handlers.

use crate::config::TrustConfig;
use crate::error::{DaemonError, DaemonResult};
use std::net::{IpAddr, Ipv4Addr};

/// Trusted operator host and subnet, resolved from configuration
#[derive(Debug, Clone)]
pub struct TrustedNetwork {
    server: IpAddr,
    subnet: Ipv4Addr,
    prefix: u8,
}

impl TrustedNetwork {
    pub fn from_config(config: &TrustConfig) -> DaemonResult<Self> {
        let server: IpAddr = config
            .server_addr
            .parse()
            .map_err(|_| DaemonError::Config(format!("invalid server_addr: {}", config.server_addr)))?;
        let (subnet, prefix) = parse_cidr(&config.subnet_cidr)
            .map_err(|e| DaemonError::Config(format!("invalid subnet_cidr: {}", e)))?;
        Ok(Self {
            server,
            subnet,
            prefix,
        })
    }

    /// Does the caller originate from the operator host itself?
    /// Loopback always qualifies so daemon-local tooling keeps working.
    pub fn is_operator_host(&self, addr: IpAddr) -> bool {
        addr == self.server || addr.is_loopback()
    }

    /// Does the caller originate from the operator subnet (which includes
    /// the operator host)?
    pub fn in_operator_subnet(&self, addr: IpAddr) -> bool {
        if self.is_operator_host(addr) {
            return true;
        }
        match addr {
            IpAddr::V4(v4) => {
                let mask = prefix_mask(self.prefix);
                u32::from(v4) & mask == u32::from(self.subnet) & mask
            }
            IpAddr::V6(_) => false,
        }
    }
}

fn prefix_mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

fn parse_cidr(s: &str) -> Result<(Ipv4Addr, u8), String> {
    let (addr, prefix) = s
        .split_once('/')
        .ok_or_else(|| format!("missing prefix length in {}", s))?;
    let addr: Ipv4Addr = addr.parse().map_err(|_| format!("bad address in {}", s))?;
    let prefix: u8 = prefix.parse().map_err(|_| format!("bad prefix in {}", s))?;
    if prefix > 32 {
        return Err(format!("prefix out of range in {}", s));
    }
    Ok((addr, prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> TrustedNetwork {
        TrustedNetwork::from_config(&TrustConfig {
            server_addr: "10.1.2.3".to_string(),
            subnet_cidr: "10.1.2.0/24".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_operator_host() {
        let net = network();
        assert!(net.is_operator_host("10.1.2.3".parse().unwrap()));
        assert!(net.is_operator_host("127.0.0.1".parse().unwrap()));
        assert!(!net.is_operator_host("10.1.2.4".parse().unwrap()));
    }

    #[test]
    fn test_operator_subnet() {
        let net = network();
        assert!(net.in_operator_subnet("10.1.2.200".parse().unwrap()));
        assert!(net.in_operator_subnet("10.1.2.3".parse().unwrap()));
        assert!(!net.in_operator_subnet("10.1.3.1".parse().unwrap()));
        assert!(!net.in_operator_subnet("192.168.0.1".parse().unwrap()));
    }

    #[test]
    fn test_bad_cidr_is_config_error() {
        let err = TrustedNetwork::from_config(&TrustConfig {
            server_addr: "10.0.0.1".to_string(),
            subnet_cidr: "10.0.0.0/64".to_string(),
        });
        assert!(matches!(err, Err(DaemonError::Config(_))));
    }
}
