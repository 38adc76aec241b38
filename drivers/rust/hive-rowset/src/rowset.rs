//! The operation lifecycle: polling, waiting, paging and scanning.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::handle;
use crate::observer::{RowSetObserver, TracingObserver};
use crate::protocol::{
    CloseOperationReq, ColumnDesc, FetchOrientation, FetchResultsReq, GetOperationStatusReq,
    GetResultSetMetadataReq, OperationHandle, OperationState, ResponseStatus, RowBatch,
};
use crate::scan::{scan_row, ScanTarget};
use crate::service::OperationService;
use crate::status::Status;
use crate::value::{convert_row, Value};
use std::fmt;
use std::thread;
use tracing::{debug, info, warn};

const GET_OPERATION_STATUS: &str = "GetOperationStatus";
const GET_RESULT_SET_METADATA: &str = "GetResultSetMetadata";
const FETCH_RESULTS: &str = "FetchResults";
const CLOSE_OPERATION: &str = "CloseOperation";

/// Where a rowset is in the operation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowSetState {
    /// No status fetched yet.
    Submitted,
    /// Status checked, operation not complete.
    Polling,
    /// Operation finished and the schema is known.
    Ready,
    /// The operation failed or a remote call failed.
    Failed,
    /// Every row has been handed out.
    Exhausted,
    /// The operation was closed on the server.
    Closed,
}

/// Client side of an asynchronous query operation.
///
/// A rowset is bound to one operation handle. It waits for the operation to
/// finish, then pages through the results `batch_size` rows at a time.
/// Several rowsets may observe the same operation (see [`RowSet::reattach`]);
/// they keep independent paging state.
pub struct RowSet<S> {
    service: S,
    operation: OperationHandle,
    config: Config,
    observer: Box<dyn RowSetObserver + Send>,

    state: RowSetState,
    schema: Option<Vec<ColumnDesc>>,
    column_names: Vec<String>,

    batch: RowBatch,
    offset: usize,
    has_more: bool,
    fetches: u64,

    current: Option<Vec<Value>>,
    last_error: Option<Error>,
}

impl<S: OperationService> RowSet<S> {
    /// Bind a rowset to a submitted operation.
    pub fn new(service: S, operation: OperationHandle, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            service,
            operation,
            config,
            observer: Box::new(TracingObserver),
            state: RowSetState::Submitted,
            schema: None,
            column_names: Vec::new(),
            batch: RowBatch::default(),
            offset: 0,
            has_more: true,
            fetches: 0,
            current: None,
            last_error: None,
        })
    }

    /// Rebuild a rowset from the bytes returned by [`RowSet::handle`].
    ///
    /// The service must be connected to the instance that issued the handle;
    /// nothing is checked locally, a foreign handle fails on the first call.
    pub fn reattach(service: S, handle: &[u8], config: Config) -> Result<Self> {
        let operation = handle::decode(handle)?;
        Self::new(service, operation, config)
    }

    /// Like [`RowSet::reattach`], from the text of [`RowSet::handle_base64`].
    pub fn reattach_base64(service: S, handle: &str, config: Config) -> Result<Self> {
        let operation = handle::decode_base64(handle)?;
        Self::new(service, operation, config)
    }

    /// Replace the event sink (defaults to [`TracingObserver`]).
    pub fn with_observer(mut self, observer: impl RowSetObserver + Send + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RowSetState {
        self.state
    }

    /// The operation this rowset is bound to.
    pub fn operation(&self) -> &OperationHandle {
        &self.operation
    }

    /// Polling and paging options in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Why the last `next()` returned false, or the last row it skipped.
    ///
    /// `columns()` and `column_descriptors()` also leave their failure here
    /// when they come back empty.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    /// Ask the service for the operation's current status.
    pub fn poll(&self) -> Result<Status> {
        let resp = self
            .service
            .get_operation_status(GetOperationStatusReq {
                operation_handle: self.operation.clone(),
            })
            .map_err(|e| Error::transport(GET_OPERATION_STATUS, e))?;
        check_status(GET_OPERATION_STATUS, &resp.status)?;

        if resp.operation_state.is_none() {
            return Err(Error::protocol(GET_OPERATION_STATUS, "no operation state"));
        }

        let status = Status::from_response(&resp);
        self.observer.on_poll(&self.operation, &status);
        Ok(status)
    }

    /// Block until the operation completes, sleeping the poll interval
    /// between status checks.
    ///
    /// On success the result schema is fetched, once per rowset. There is
    /// no timeout.
    pub fn wait(&mut self) -> Result<Status> {
        loop {
            let status = match self.poll() {
                Ok(status) => status,
                Err(e) => {
                    self.transition(RowSetState::Failed);
                    return Err(e);
                }
            };

            if status.is_complete() {
                if !status.is_success() {
                    self.transition(RowSetState::Failed);
                    let state = status.state().unwrap_or(OperationState::Unknown);
                    warn!(state = %state, message = ?status.error_message, "operation failed");
                    return Err(Error::Execution {
                        state,
                        message: status.error_message,
                    });
                }

                if self.schema.is_none() {
                    if let Err(e) = self.fetch_schema() {
                        self.transition(RowSetState::Failed);
                        return Err(e);
                    }
                }
                if matches!(
                    self.state,
                    RowSetState::Submitted | RowSetState::Polling | RowSetState::Failed
                ) {
                    self.transition(RowSetState::Ready);
                }
                info!(columns = self.column_names.len(), "operation finished");
                return Ok(status);
            }

            if matches!(self.state, RowSetState::Submitted | RowSetState::Failed) {
                self.transition(RowSetState::Polling);
            }
            thread::sleep(self.config.poll_interval);
        }
    }

    fn fetch_schema(&mut self) -> Result<()> {
        let resp = self
            .service
            .get_result_set_metadata(GetResultSetMetadataReq {
                operation_handle: self.operation.clone(),
            })
            .map_err(|e| Error::transport(GET_RESULT_SET_METADATA, e))?;
        check_status(GET_RESULT_SET_METADATA, &resp.status)?;

        let schema = resp
            .schema
            .ok_or_else(|| Error::protocol(GET_RESULT_SET_METADATA, "no schema"))?;
        self.column_names = schema
            .columns
            .iter()
            .map(|c| c.column_name.clone())
            .collect();
        self.schema = Some(schema.columns);
        Ok(())
    }

    fn ensure_ready(&mut self) -> Result<()> {
        if self.schema.is_some() {
            return Ok(());
        }
        self.wait().map(|_| ())
    }

    /// Make the next row available to [`RowSet::scan`].
    ///
    /// Returns false when the rows are used up or something went wrong;
    /// [`RowSet::last_error`] tells the two apart. Rows that fail conversion
    /// are skipped unless they end their batch.
    pub fn next(&mut self) -> bool {
        self.last_error = None;
        self.current = None;

        match self.advance() {
            Ok(found) => found,
            Err(e) => {
                if e.is_protocol_error() {
                    self.transition(RowSetState::Failed);
                }
                self.last_error = Some(e);
                false
            }
        }
    }

    fn advance(&mut self) -> Result<bool> {
        match self.state {
            RowSetState::Closed => return Err(Error::Closed),
            RowSetState::Exhausted => return Ok(false),
            _ => {}
        }

        self.ensure_ready()?;

        if self.offset >= self.batch.rows.len() {
            if !self.has_more {
                self.finish();
                return Ok(false);
            }
            self.fetch_batch()?;
            if self.batch.rows.is_empty() {
                if !self.has_more {
                    self.finish();
                }
                return Ok(false);
            }
        }

        let width = self.column_names.len();
        let len = self.batch.rows.len();
        while self.offset < len {
            let offset = self.offset;
            self.offset += 1;

            match convert_row(&self.batch.rows[offset], width) {
                Ok(values) => {
                    self.current = Some(values);
                    return Ok(true);
                }
                Err(e) => {
                    let err = Error::from(e);
                    self.observer.on_row_skipped(offset, &err);
                    if offset + 1 >= len {
                        if !self.has_more {
                            self.finish();
                        }
                        return Err(err);
                    }
                    self.last_error = Some(err);
                }
            }
        }
        Ok(false)
    }

    fn fetch_batch(&mut self) -> Result<()> {
        self.observer.on_fetch_issued(self.config.batch_size);
        self.fetches += 1;

        let resp = self
            .service
            .fetch_results(FetchResultsReq {
                operation_handle: self.operation.clone(),
                orientation: FetchOrientation::Next,
                max_rows: self.config.batch_size,
            })
            .map_err(|e| Error::transport(FETCH_RESULTS, e))?;
        check_status(FETCH_RESULTS, &resp.status)?;

        let has_more = resp
            .has_more_rows
            .ok_or_else(|| Error::protocol(FETCH_RESULTS, "no more-rows flag"))?;
        let results = resp
            .results
            .ok_or_else(|| Error::protocol(FETCH_RESULTS, "no results"))?;

        self.observer.on_batch_received(results.rows.len(), has_more);
        self.batch = results;
        self.offset = 0;
        self.has_more = has_more;
        if self.state == RowSetState::Failed {
            self.transition(RowSetState::Ready);
        }
        Ok(())
    }

    fn finish(&mut self) {
        if self.state != RowSetState::Exhausted {
            self.observer.on_batch_exhausted(self.fetches);
            self.transition(RowSetState::Exhausted);
        }
        self.batch = RowBatch::default();
        self.offset = 0;
    }

    /// Copy the current row into `dest`, one destination per column.
    pub fn scan(&self, dest: &mut [&mut dyn ScanTarget]) -> Result<()> {
        let row = self.current.as_deref().ok_or(Error::NoCurrentRow)?;
        scan_row(row, dest)
    }

    /// The current row's values, if `next()` just succeeded.
    pub fn current_row(&self) -> Option<&[Value]> {
        self.current.as_deref()
    }

    /// Column names, waiting for the operation if needed.
    ///
    /// Empty if the operation failed; see [`RowSet::last_error`].
    pub fn columns(&mut self) -> &[String] {
        if let Err(e) = self.ensure_ready() {
            self.last_error = Some(e);
            return &[];
        }
        &self.column_names
    }

    /// Full column descriptors, with the same waiting rules as `columns()`.
    pub fn column_descriptors(&mut self) -> &[ColumnDesc] {
        if let Err(e) = self.ensure_ready() {
            self.last_error = Some(e);
            return &[];
        }
        self.schema.as_deref().unwrap_or(&[])
    }

    /// Serialized operation identifier for [`RowSet::reattach`].
    pub fn handle(&self) -> Result<Vec<u8>> {
        handle::encode(&self.operation)
    }

    /// Text form of [`RowSet::handle`].
    pub fn handle_base64(&self) -> Result<String> {
        handle::encode_base64(&self.operation)
    }

    /// Release the operation on the server.
    ///
    /// Every call sends a close request; closing twice reports whatever the
    /// service says about the second one.
    pub fn close(&mut self) -> Result<()> {
        let resp = self
            .service
            .close_operation(CloseOperationReq {
                operation_handle: self.operation.clone(),
            })
            .map_err(|e| Error::transport(CLOSE_OPERATION, e))?;
        check_status(CLOSE_OPERATION, &resp.status)?;

        self.current = None;
        self.batch = RowBatch::default();
        self.offset = 0;
        self.state = RowSetState::Closed;
        debug!(fetches = self.fetches, "operation closed");
        Ok(())
    }

    fn transition(&mut self, to: RowSetState) {
        if self.state != RowSetState::Closed {
            self.state = to;
        }
    }
}

impl<S> fmt::Debug for RowSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowSet")
            .field("operation", &self.operation)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("columns", &self.column_names)
            .field("offset", &self.offset)
            .field("has_more", &self.has_more)
            .field("fetches", &self.fetches)
            .finish()
    }
}

fn check_status(call: &'static str, status: &ResponseStatus) -> Result<()> {
    if !status.is_success() {
        return Err(Error::Service {
            call,
            status: status.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::StatusCode;

    #[test]
    fn test_check_status() {
        assert!(check_status(FETCH_RESULTS, &ResponseStatus::success()).is_ok());
        assert!(
            check_status(FETCH_RESULTS, &ResponseStatus::with_code(StatusCode::SuccessWithInfo))
                .is_ok()
        );

        let err = check_status(CLOSE_OPERATION, &ResponseStatus::error("gone")).unwrap_err();
        assert_eq!(err.to_string(), "CloseOperation call failed: ERROR_STATUS: gone");
    }
}
