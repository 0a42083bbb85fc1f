//! Selection of the address the gateway is advertised on.
//!
//! Addresses are ordered by descending last octet so that loopback
//! (`127.0.0.1`) sinks to the end and the first entry is most likely an
//! outward-facing address. This is a heuristic; callers go through
//! [`advertise_address`] so it can be replaced by routing-aware selection.

use std::net::{IpAddr, Ipv4Addr};

use nanoctl_common::error::{NanoError, Result};

/// Source of the host's interface addresses.
pub trait AddressSource: Send + Sync {
    /// Returns every address assigned to a local interface.
    ///
    /// # Errors
    ///
    /// Returns [`NanoError::Network`] if interfaces cannot be read.
    fn interface_addresses(&self) -> Result<Vec<IpAddr>>;
}

/// Reads interface addresses from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAddresses;

#[cfg(unix)]
impl AddressSource for SystemAddresses {
    fn interface_addresses(&self) -> Result<Vec<IpAddr>> {
        use std::net::SocketAddrV4;

        let interfaces = nix::ifaddrs::getifaddrs().map_err(|e| NanoError::Network {
            message: e.to_string(),
        })?;

        Ok(interfaces
            .filter_map(|ifa| ifa.address)
            .filter_map(|addr| {
                if let Some(v4) = addr.as_sockaddr_in() {
                    Some(IpAddr::V4(*SocketAddrV4::from(*v4).ip()))
                } else {
                    addr.as_sockaddr_in6().map(|v6| IpAddr::V6(v6.ip()))
                }
            })
            .collect())
    }
}

#[cfg(not(unix))]
impl AddressSource for SystemAddresses {
    fn interface_addresses(&self) -> Result<Vec<IpAddr>> {
        Err(NanoError::Network {
            message: "interface enumeration requires a unix host".into(),
        })
    }
}

/// Keeps IPv4 addresses (including IPv4-mapped IPv6) and orders them by
/// descending last octet.
#[must_use]
pub fn order_by_last_octet(addrs: impl IntoIterator<Item = IpAddr>) -> Vec<Ipv4Addr> {
    let mut v4: Vec<Ipv4Addr> = addrs
        .into_iter()
        .filter_map(|addr| match addr {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(v6) => v6.to_ipv4_mapped(),
        })
        .collect();
    v4.sort_by(|a, b| b.octets()[3].cmp(&a.octets()[3]));
    v4
}

/// Enumerates local IPv4 addresses in advertise order.
///
/// An empty list is not an error here; [`advertise_address`] is the
/// place that refuses it.
///
/// # Errors
///
/// Returns an error if interfaces cannot be read at all.
pub fn select_advertise_addresses(source: &dyn AddressSource) -> Result<Vec<Ipv4Addr>> {
    let ordered = order_by_last_octet(source.interface_addresses()?);
    tracing::debug!(addresses = ?ordered, "advertise candidates");
    Ok(ordered)
}

/// Returns the address to advertise: the first of the ordered list.
///
/// # Errors
///
/// Returns [`NanoError::NoUsableAddress`] if the host has no IPv4 address,
/// or the enumeration error.
pub fn advertise_address(source: &dyn AddressSource) -> Result<Ipv4Addr> {
    select_advertise_addresses(source)?
        .first()
        .copied()
        .ok_or(NanoError::NoUsableAddress)
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::*;

    struct Fixed(Vec<IpAddr>);

    impl AddressSource for Fixed {
        fn interface_addresses(&self) -> Result<Vec<IpAddr>> {
            Ok(self.0.clone())
        }
    }

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn orders_by_descending_last_octet() {
        let ordered = order_by_last_octet([v4(127, 0, 0, 1), v4(10, 0, 0, 200), v4(192, 168, 1, 50)]);
        let last: Vec<u8> = ordered.iter().map(|a| a.octets()[3]).collect();
        assert_eq!(last, vec![200, 50, 1]);
    }

    #[test]
    fn ipv6_addresses_are_dropped() {
        let ordered = order_by_last_octet([IpAddr::V6(Ipv6Addr::LOCALHOST), v4(10, 0, 0, 5)]);
        assert_eq!(ordered, vec![Ipv4Addr::new(10, 0, 0, 5)]);
    }

    #[test]
    fn ipv4_mapped_ipv6_is_kept() {
        let mapped = IpAddr::V6(Ipv4Addr::new(10, 1, 1, 9).to_ipv6_mapped());
        assert_eq!(order_by_last_octet([mapped]), vec![Ipv4Addr::new(10, 1, 1, 9)]);
    }

    #[test]
    fn advertise_address_picks_first() {
        let source = Fixed(vec![v4(127, 0, 0, 1), v4(172, 17, 0, 3)]);
        assert_eq!(
            advertise_address(&source).expect("address"),
            Ipv4Addr::new(172, 17, 0, 3)
        );
    }

    #[test]
    fn empty_list_is_returned_but_not_advertised() {
        let source = Fixed(vec![IpAddr::V6(Ipv6Addr::LOCALHOST)]);
        assert!(select_advertise_addresses(&source).expect("list").is_empty());
        assert!(matches!(
            advertise_address(&source),
            Err(NanoError::NoUsableAddress)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn system_addresses_can_be_enumerated() {
        let addrs = SystemAddresses.interface_addresses().expect("getifaddrs");
        assert!(!addrs.is_empty());
    }
}
