/*
 * This module provides data aquisition abilites for the application.
 * It doesn't care what the text means, just how it is fetched.
 * New transports only need to implement `PollTransport`.
 */

pub mod core;
pub mod telnet;

pub use core::{PollTransport, TransportError};
pub use telnet::TelnetClient;
