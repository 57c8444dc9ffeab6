//! Outbound request pipeline.
//!
//! Composition, in call order: dedup queue, response cache, request
//! annotator, transport, retry policy, response normalizer. The orchestrator
//! in [`client`] is the single entry point; everything else here is a stage.

mod annotate;
mod client;
mod dedup;
mod descriptor;
mod normalize;
mod retry;
mod transport;

pub use client::HttpClient;
pub use dedup::InFlightQueue;
pub use descriptor::{Method, RequestDescriptor};
pub use retry::{exponential_backoff, parse_retry_after, RetryPolicy, RetryState};
pub use transport::{OutboundRequest, RawResponse, ReqwestTransport, Transport, TransportError};
