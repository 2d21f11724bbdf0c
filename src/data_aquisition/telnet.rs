use std::time::Duration;

use async_trait::async_trait;
use tokio::{io::AsyncReadExt, net::TcpStream};
use tracing::{debug, warn};

use super::core::{PollTransport, TransportError};
use crate::config::{DEFAULT_HOST, DEFAULT_IDLE_CUTOFF, DEFAULT_PORT};

const IAC: u8 = 255;
const SE: u8 = 240;
const SB: u8 = 250;
const WILL: u8 = 251;
const DONT: u8 = 254;

/// Minimal telnet client: connects, sends nothing, and collects the text the peer pushes.
///
/// A message is complete when the peer closes the connection, or when the stream has been
/// quiet for `idle_cutoff` after the first bytes arrived.
#[derive(Debug, Clone)]
pub struct TelnetClient {
    host: String,
    port: u16,
    idle_cutoff: Duration,
}

impl Default for TelnetClient {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl TelnetClient {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            idle_cutoff: DEFAULT_IDLE_CUTOFF,
        }
    }

    pub fn with_idle_cutoff(mut self, idle_cutoff: Duration) -> Self {
        self.idle_cutoff = idle_cutoff;
        self
    }

    async fn connect(&self) -> Result<TcpStream, TransportError> {
        let target = self.target();
        let addrs: Vec<_> = tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| TransportError::Resolve {
                target: target.clone(),
                reason: e.to_string(),
            })?
            .collect();

        if addrs.is_empty() {
            return Err(TransportError::Resolve {
                target,
                reason: "no addresses returned".to_string(),
            });
        }

        // "localhost" usually yields both ::1 and 127.0.0.1; the daemon may only listen on one.
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    debug!(%addr, "connected");
                    return Ok(stream);
                }
                Err(e) => {
                    debug!(%addr, error = %e, "connect attempt failed");
                    last_err = Some(e);
                }
            }
        }

        Err(TransportError::Connect {
            target,
            source: last_err
                .unwrap_or_else(|| std::io::Error::other("no address could be connected")),
        })
    }

    async fn read_message(&self, stream: &mut TcpStream) -> Result<Vec<u8>, TransportError> {
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let read = if raw.is_empty() {
                stream.read(&mut buf).await
            } else {
                match tokio::time::timeout(self.idle_cutoff, stream.read(&mut buf)).await {
                    Ok(read) => read,
                    Err(_) => {
                        debug!(bytes = raw.len(), "stream idle, message complete");
                        break;
                    }
                }
            };

            match read {
                Ok(0) => break,
                Ok(n) => raw.extend_from_slice(&buf[..n]),
                Err(e) if !raw.is_empty() => {
                    warn!(peer = %self.target(), error = %e, "read failed mid-message, keeping partial data");
                    break;
                }
                Err(e) => {
                    return Err(TransportError::Read {
                        target: self.target(),
                        source: e,
                    });
                }
            }
        }

        Ok(raw)
    }
}

#[async_trait]
impl PollTransport for TelnetClient {
    async fn receive(&self) -> Result<String, TransportError> {
        let mut stream = self.connect().await?;
        let raw = self.read_message(&mut stream).await?;
        let payload = strip_telnet_commands(&raw);
        if payload.is_empty() {
            return Err(TransportError::Empty {
                target: self.target(),
            });
        }
        Ok(String::from_utf8_lossy(&payload).into_owned())
    }

    fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Removes telnet command sequences (option negotiation, subnegotiation) from a byte stream.
/// An escaped `IAC IAC` becomes a single 0xFF data byte.
pub fn strip_telnet_commands(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;

    while i < raw.len() {
        if raw[i] != IAC {
            out.push(raw[i]);
            i += 1;
            continue;
        }

        match raw.get(i + 1).copied() {
            Some(IAC) => {
                out.push(IAC);
                i += 2;
            }
            Some(cmd) if (WILL..=DONT).contains(&cmd) => i += 3,
            Some(SB) => {
                // skip to IAC SE (or the end of the buffer if it never comes)
                let mut j = i + 2;
                while j < raw.len() && !(raw[j] == IAC && raw.get(j + 1) == Some(&SE)) {
                    j += 1;
                }
                i = j + 2;
            }
            Some(_) => i += 2,
            None => i += 1,
        }
    }

    out
}
