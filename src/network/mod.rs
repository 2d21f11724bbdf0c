/*
 * This module knows who is who on the mesh: friendly names for fixed addresses
 * and the addresses that belong to this machine.
 */

pub mod identity;

pub use identity::{IdentityResolver, InterfaceAddresses, LocalAddresses, NameMap};
