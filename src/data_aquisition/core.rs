use async_trait::async_trait;
use thiserror::Error;

/// Why a poll cycle produced no message.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("could not resolve {target}: {reason}")]
    Resolve { target: String, reason: String },
    #[error("could not connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: std::io::Error,
    },
    #[error("read from {target} failed: {source}")]
    Read {
        target: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{target} closed the connection without sending anything")]
    Empty { target: String },
    #[error("poll task failed: {0}")]
    Task(String),
}

/// A connect-and-receive text source. One call is one poll cycle: connect, wait for
/// whatever the peer sends, hand it back as a single message.
#[async_trait]
pub trait PollTransport: Send + Sync {
    async fn receive(&self) -> Result<String, TransportError>;

    /// Human readable `host:port` of the peer, for logs.
    fn target(&self) -> String;
}
