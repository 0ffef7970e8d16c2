//! Pre-built [`tracing::Span`] constructors for node operations.
//!
//! Consistent span names and field sets make it easy to correlate one
//! reissuance across the nodes taking part in it.

use tracing::{info_span, Span};

/// Span covering a reissuance request sent to `issuer`.
pub fn request_span(node: &str, issuer: &str, entities: usize) -> Span {
    info_span!("reissue_request", node = %node, issuer = %issuer, entities = entities)
}

/// Span covering the issuer's accept or reject of a request.
pub fn decide_span(node: &str, decision: &'static str, request: &str) -> Span {
    info_span!("reissue_decide", node = %node, decision = decision, request = %request)
}

/// Span covering an unlock or delete against a lock.
pub fn release_span(node: &str, action: &'static str, lock: &str) -> Span {
    info_span!("reissue_release", node = %node, action = action, lock = %lock)
}

/// Span covering a plain asset flow.
pub fn asset_span(node: &str, action: &'static str) -> Span {
    info_span!("asset", node = %node, action = action)
}

/// Span covering one session answered on behalf of `node`.
pub fn respond_span(node: &str, peer: &str) -> Span {
    info_span!("respond", node = %node, peer = %peer)
}
