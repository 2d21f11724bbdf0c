use std::{
    collections::{BTreeMap, HashMap, HashSet},
    net::IpAddr,
};

use tracing::warn;

use crate::{config::DEFAULT_SELF_LABEL, parsers::LinkRecord};

/// Addresses with a well known friendly name.
const KNOWN_NAMES: &[(&str, &str)] = &[("129.132.201.24", "TestMAV")];

/// Fixed address -> friendly name table. Built once, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct NameMap {
    names: HashMap<String, String>,
}

impl Default for NameMap {
    fn default() -> Self {
        Self {
            names: KNOWN_NAMES
                .iter()
                .map(|(addr, name)| (addr.to_string(), name.to_string()))
                .collect(),
        }
    }
}

impl NameMap {
    /// Built-in names plus `extra`; an extra entry for a built-in address wins.
    pub fn with_extra(extra: &BTreeMap<String, String>) -> Self {
        let mut map = Self::default();
        map.names.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        map
    }

    pub fn get(&self, address: &str) -> Option<&str> {
        self.names.get(address).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// Addresses bound to this machine's interfaces at some point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalAddressSet {
    addrs: HashSet<IpAddr>,
}

impl LocalAddressSet {
    pub fn new<I: IntoIterator<Item = IpAddr>>(addrs: I) -> Self {
        Self {
            addrs: addrs.into_iter().collect(),
        }
    }

    /// Textual lookup; anything that isn't an IP address is never local.
    pub fn contains(&self, address: &str) -> bool {
        address
            .parse::<IpAddr>()
            .map(|ip| self.addrs.contains(&ip))
            .unwrap_or(false)
    }

    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}

/// Capability for enumerating the local interface addresses.
pub trait LocalAddresses: Send {
    fn local_addresses(&self) -> LocalAddressSet;
}

/// Reads the addresses of every interface on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceAddresses;

impl LocalAddresses for InterfaceAddresses {
    fn local_addresses(&self) -> LocalAddressSet {
        match if_addrs::get_if_addrs() {
            Ok(ifaces) => LocalAddressSet::new(ifaces.iter().map(|iface| iface.ip())),
            Err(e) => {
                warn!(error = %e, "could not enumerate local interfaces");
                LocalAddressSet::default()
            }
        }
    }
}

/// A fixed set, handy when the local addresses are known up front.
impl LocalAddresses for LocalAddressSet {
    fn local_addresses(&self) -> LocalAddressSet {
        self.clone()
    }
}

/// Maps raw addresses to the labels shown in the table.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    names: NameMap,
    self_label: String,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new(NameMap::default(), DEFAULT_SELF_LABEL)
    }
}

impl IdentityResolver {
    pub fn new(names: NameMap, self_label: impl Into<String>) -> Self {
        Self {
            names,
            self_label: self_label.into(),
        }
    }

    /// Known name first, then the self label for local addresses, otherwise the address itself.
    pub fn resolve(&self, address: &str, local: &LocalAddressSet) -> String {
        if let Some(name) = self.names.get(address) {
            return name.to_string();
        }
        if local.contains(address) {
            return self.self_label.clone();
        }
        address.to_string()
    }

    pub fn resolve_record(&self, record: LinkRecord, local: &LocalAddressSet) -> LinkRecord {
        record.map_endpoints(|addr| self.resolve(addr, local))
    }
}
