use std::sync::Arc;

use tokio::{
    runtime::Handle,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, error::TryRecvError, unbounded_channel},
};
use tracing::debug;

use crate::data_aquisition::{PollTransport, TransportError};

pub type PollResult = Result<String, TransportError>;

/// Runs poll requests on the tokio runtime and hands the results back to the UI thread.
///
/// Requests are fire-and-forget; nothing is cancelled. Results are picked up with `drain`
/// once per frame. A result older than one already handed out is dropped.
pub struct Poller {
    handle: Handle,
    transport: Arc<dyn PollTransport>,
    tx: UnboundedSender<(u64, PollResult)>,
    rx: UnboundedReceiver<(u64, PollResult)>,
    in_flight: usize,
    next_seq: u64,
    // sequence number of the newest result handed out by `drain`
    delivered_seq: Option<u64>,
}

impl Poller {
    pub fn new(handle: Handle, transport: Arc<dyn PollTransport>) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            handle,
            transport,
            tx,
            rx,
            in_flight: 0,
            next_seq: 0,
            delivered_seq: None,
        }
    }

    /// Start a poll for a timer tick, unless one is still outstanding. Returns whether a poll was started.
    pub fn request_tick<F>(&mut self, on_done: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if self.in_flight > 0 {
            debug!(in_flight = self.in_flight, "previous poll still running, skipping tick");
            return false;
        }
        self.request(on_done);
        true
    }

    /// Start one poll. `on_done` runs on the runtime once the result is queued (used to wake the UI).
    pub fn request<F>(&mut self, on_done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let transport = self.transport.clone();
        let tx = self.tx.clone();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.in_flight += 1;
        debug!(peer = %transport.target(), seq, in_flight = self.in_flight, "poll requested");

        self.handle.spawn(async move {
            let inner = tokio::spawn(async move { transport.receive().await });
            let result = match inner.await {
                Ok(result) => result,
                Err(e) => Err(TransportError::Task(e.to_string())),
            };
            // receiver gone means the window closed, nobody cares about the result
            let _ = tx.send((seq, result));
            on_done();
        });
    }

    /// Results that arrived since the last call, oldest request first.
    pub fn drain(&mut self) -> Vec<PollResult> {
        let mut arrived = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(item) => {
                    self.in_flight = self.in_flight.saturating_sub(1);
                    arrived.push(item);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }

        arrived.sort_by_key(|(seq, _)| *seq);
        let mut out = Vec::with_capacity(arrived.len());
        for (seq, result) in arrived {
            if self.delivered_seq.is_some_and(|newest| seq < newest) {
                debug!(seq, "dropping result of a poll overtaken by a newer one");
                continue;
            }
            self.delivered_seq = Some(seq);
            out.push(result);
        }
        out
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn target(&self) -> String {
        self.transport.target()
    }
}
