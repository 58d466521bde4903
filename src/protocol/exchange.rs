//! Exchange sequencing: one logical request/reply cycle per transport.
//!
//! The two transports honor the same record contract with different
//! transaction shapes. On the clocked bus the peripheral cannot compute
//! within the transaction that delivers the request, so the cycle runs as
//! two transactions separated by a settle delay, and only the second one
//! carries the reply. On the stream the cycle is a single write followed
//! by a single read.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::record::{RECORD_LEN, Record};
use crate::transport::{BusTransport, FullDuplex, HalfDuplex, StreamTransport};

/// Phases of a clocked-bus request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// The request transaction is due.
    Request,
    /// The request is out; the peripheral is computing.
    Settle,
    /// The reply transaction is due.
    Collect,
}

/// Performs one request cycle over a clocked full-duplex link.
///
/// Issues exactly two transactions. The first delivers the request; its
/// response bytes are clocked out while the peripheral is still working
/// and are discarded. The second, after `settle`, collects the reply.
pub async fn two_phase<L>(link: &mut L, request: Record, settle: Duration) -> Result<Record>
where
    L: FullDuplex + ?Sized,
{
    let tx = Bytes::copy_from_slice(&request.encode());

    let mut phase = Phase::Request;
    let reply = loop {
        phase = match phase {
            Phase::Request => {
                let early = link.transfer(tx.clone()).await?;
                tracing::trace!("request sent, discarding {} early bytes", early.len());
                Phase::Settle
            }
            Phase::Settle => {
                tokio::time::sleep(settle).await;
                Phase::Collect
            }
            Phase::Collect => break link.transfer(tx.clone()).await?,
        };
    };

    Ok(Record::decode(&reply))
}

/// Performs one request cycle over a half-duplex stream link.
///
/// One write, one read sized to the record length. Short writes and
/// short replies are not retried; a truncated reply decodes with its
/// missing trailing fields zeroed.
pub async fn round_trip<L>(link: &mut L, request: Record) -> Result<Record>
where
    L: HalfDuplex + ?Sized,
{
    let encoded = request.encode();

    let written = link.write(Bytes::copy_from_slice(&encoded)).await?;
    if written < RECORD_LEN {
        tracing::warn!("short write: {written} of {RECORD_LEN} bytes");
    }

    let reply = link.read(RECORD_LEN).await?;
    if reply.len() < RECORD_LEN {
        tracing::warn!("short reply: {} of {RECORD_LEN} bytes", reply.len());
    }

    Ok(Record::decode(&reply))
}

/// One complete logical request/reply cycle, transport-agnostic.
pub trait Exchange {
    /// Sends `request` and returns the peripheral's reply record.
    ///
    /// Any transport failure aborts the cycle and is surfaced without
    /// retry; retrying the whole exchange is the caller's decision.
    fn perform(
        &mut self,
        request: Record,
    ) -> Pin<Box<dyn Future<Output = Result<Record>> + Send + '_>>;
}

impl Exchange for BusTransport {
    fn perform(
        &mut self,
        request: Record,
    ) -> Pin<Box<dyn Future<Output = Result<Record>> + Send + '_>> {
        Box::pin(async move {
            let settle = self.config().settle_delay;
            two_phase(self, request, settle).await
        })
    }
}

impl Exchange for StreamTransport {
    fn perform(
        &mut self,
        request: Record,
    ) -> Pin<Box<dyn Future<Output = Result<Record>> + Send + '_>> {
        Box::pin(round_trip(self, request))
    }
}
