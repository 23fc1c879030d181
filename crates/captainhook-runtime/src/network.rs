use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::error::NetworkParseError;

/// One address range in CIDR form, stored with host bits cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Network {
    addr: IpAddr,
    prefix: u8,
}

impl Network {
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Prefix-match `ip` against this range. IPv4-mapped IPv6 addresses
    /// are compared as IPv4.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.addr, ip.to_canonical()) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = v4_mask(self.prefix);
                u32::from(ip) & mask == u32::from(net)
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = v6_mask(self.prefix);
                u128::from(ip) & mask == u128::from(net)
            }
            _ => false,
        }
    }
}

fn v4_mask(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

fn v6_mask(prefix: u8) -> u128 {
    if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix))
    }
}

impl FromStr for Network {
    type Err = NetworkParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NetworkParseError(s.to_string());

        let (addr, prefix) = s.split_once('/').ok_or_else(invalid)?;
        let addr: IpAddr = addr.parse().map_err(|_| invalid())?;

        // u8::from_str tolerates a leading '+', CIDR notation does not
        if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;

        let addr = match addr {
            IpAddr::V4(v4) if prefix <= 32 => {
                IpAddr::V4(Ipv4Addr::from(u32::from(v4) & v4_mask(prefix)))
            }
            IpAddr::V6(v6) if prefix <= 128 => {
                IpAddr::V6(Ipv6Addr::from(u128::from(v6) & v6_mask(prefix)))
            }
            _ => return Err(invalid()),
        };

        Ok(Self { addr, prefix })
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

/// The `allowedNetworks` list of a RunBook. Empty means allow any address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Networks(Vec<Network>);

impl Networks {
    /// Parse every entry; one bad entry rejects the whole set.
    pub fn parse<I, S>(entries: I) -> Result<Self, NetworkParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        entries
            .into_iter()
            .map(|entry| entry.as_ref().parse())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Network> {
        self.0.iter()
    }

    pub fn addr_is_allowed(&self, ip: IpAddr) -> bool {
        self.0.is_empty() || self.0.iter().any(|nw| nw.contains(ip))
    }
}

impl<'de> Deserialize<'de> for Networks {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let entries = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
        Networks::parse(&entries).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_addr_is_allowed() {
        let nets = Networks::parse(["127.0.0.1/32", "10.0.0.0/24"]).unwrap();

        let cases = [
            ("127.0.0.1", true),
            ("172.16.0.1", false),
            ("10.0.0.1", true),
            ("10.0.1.1", false),
        ];
        for (addr, expected) in cases {
            assert_eq!(nets.addr_is_allowed(ip(addr)), expected, "{addr}");
        }
    }

    #[test]
    fn test_empty_set_allows_everything() {
        let nets = Networks::default();
        for addr in ["0.0.0.0", "10.1.2.3", "255.255.255.255", "::1", "fe80::1"] {
            assert!(nets.addr_is_allowed(ip(addr)));
        }
    }

    #[test]
    fn test_host_bits_are_cleared() {
        let nw: Network = "10.1.2.3/8".parse().unwrap();
        assert_eq!(nw.to_string(), "10.0.0.0/8");
        assert!(nw.contains(ip("10.200.0.1")));
    }

    #[test]
    fn test_zero_prefix_matches_family_only() {
        let nw: Network = "0.0.0.0/0".parse().unwrap();
        assert!(nw.contains(ip("192.168.1.1")));
        assert!(!nw.contains(ip("2001:db8::1")));
    }

    #[test]
    fn test_ipv6_range() {
        let nw: Network = "2001:db8::/32".parse().unwrap();
        assert!(nw.contains(ip("2001:db8:1::5")));
        assert!(!nw.contains(ip("2001:db9::1")));
    }

    #[test]
    fn test_v4_mapped_v6_caller_matches_v4_range() {
        let nets = Networks::parse(["127.0.0.0/8"]).unwrap();
        assert!(nets.addr_is_allowed(ip("::ffff:127.0.0.1")));
    }

    #[test]
    fn test_malformed_entries_rejected() {
        for bad in ["10.0", "10.0.0.0", "10.0.0.0/33", "::/129", "10.0.0.0/+8", "10.0.0.0/", "x/8"] {
            assert!(bad.parse::<Network>().is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn test_one_bad_entry_rejects_set() {
        let err = Networks::parse(["127.0.0.1/32", "10.0"]).unwrap_err();
        assert_eq!(err, NetworkParseError("10.0".into()));
    }

    #[test]
    fn test_padded_entry_rejected() {
        assert!(Networks::parse([" 10.0.0.0/8 "]).is_err());
        assert!(Networks::parse(["10.0.0.0/ 8"]).is_err());
    }

    #[test]
    fn test_set_matches_any_single_range() {
        let cidrs = ["192.168.0.0/16", "10.0.0.0/8", "172.16.5.0/24"];
        let nets = Networks::parse(cidrs).unwrap();
        let probes = ["192.168.3.4", "10.9.9.9", "172.16.5.200", "172.16.6.1", "8.8.8.8"];

        for probe in probes {
            let independent = cidrs
                .iter()
                .any(|c| c.parse::<Network>().unwrap().contains(ip(probe)));
            assert_eq!(nets.addr_is_allowed(ip(probe)), independent, "{probe}");
        }
    }

    #[test]
    fn test_deserialize_null_is_empty() {
        let nets: Networks = serde_json::from_str("null").unwrap();
        assert!(nets.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_bad_entry() {
        let res: Result<Networks, _> = serde_json::from_str(r#"["127.0.0.1/32", "10.0"]"#);
        assert!(res.is_err());
    }
}
