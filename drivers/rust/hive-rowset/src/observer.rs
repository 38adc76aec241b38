use crate::error::Error;
use crate::protocol::OperationHandle;
use crate::status::Status;
use tracing::{debug, warn};

/// Receives events from the rowset's polling and fetch loop.
///
/// Every method has an empty default so sinks only implement what they
/// care about.
pub trait RowSetObserver {
    fn on_poll(&self, _handle: &OperationHandle, _status: &Status) {}

    fn on_fetch_issued(&self, _max_rows: i64) {}

    fn on_batch_received(&self, _rows: usize, _has_more: bool) {}

    fn on_row_skipped(&self, _offset: usize, _error: &Error) {}

    /// Iteration ended for good after `fetches` fetch calls.
    fn on_batch_exhausted(&self, _fetches: u64) {}
}

/// Emits every event as a `tracing` event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl RowSetObserver for TracingObserver {
    fn on_poll(&self, handle: &OperationHandle, status: &Status) {
        debug!(
            guid = %hex(&handle.operation_id.guid),
            state = %status,
            "polled operation status"
        );
    }

    fn on_fetch_issued(&self, max_rows: i64) {
        debug!(max_rows, "fetching next batch");
    }

    fn on_batch_received(&self, rows: usize, has_more: bool) {
        debug!(rows, has_more, "batch received");
    }

    fn on_row_skipped(&self, offset: usize, error: &Error) {
        warn!(offset, error = %error, "skipping row that failed conversion");
    }

    fn on_batch_exhausted(&self, fetches: u64) {
        debug!(fetches, "result set exhausted");
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl RowSetObserver for NoopObserver {}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
