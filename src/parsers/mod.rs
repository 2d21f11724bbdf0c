/*
 * Text parsers turning raw transport messages into link records.
 */

pub mod mesh_link;

pub use mesh_link::{LinkRecord, parse_links};
