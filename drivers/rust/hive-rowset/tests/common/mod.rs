#![allow(dead_code)]

use hive_rowset::protocol::{
    CloseOperationReq, CloseOperationResp, FetchResultsReq, FetchResultsResp,
    GetOperationStatusReq, GetOperationStatusResp, GetResultSetMetadataReq,
    GetResultSetMetadataResp, TableSchema,
};
use hive_rowset::{
    CallResult, ColumnDesc, ColumnValue, Config, OperationHandle, OperationService,
    OperationState, OperationType, ResponseStatus, Row, RowBatch, RowSetObserver, StatusCode,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn fast_config(batch_size: i64) -> Config {
    Config::builder()
        .poll_interval(Duration::from_millis(1))
        .batch_size(batch_size)
        .build()
}

pub fn handle() -> OperationHandle {
    OperationHandle::new(
        b"0123456789abcdef".to_vec(),
        b"secret".to_vec(),
        OperationType::ExecuteStatement,
        true,
    )
}

pub fn int_row(id: i32, name: &str) -> Row {
    Row::new(vec![
        ColumnValue::I32(Some(id)),
        ColumnValue::String(Some(name.to_string())),
    ])
}

pub fn bad_row() -> Row {
    Row::new(vec![ColumnValue::I32(Some(-1)), ColumnValue::Unset])
}

/// In-memory query service that plays back scripted states and batches.
pub struct FakeService {
    handle: OperationHandle,
    states: Mutex<VecDeque<OperationState>>,
    error_message: Option<String>,
    schema: Vec<ColumnDesc>,
    batches: Mutex<VecDeque<(Vec<Row>, bool)>>,
    closed: AtomicBool,
    fail_polls: AtomicUsize,
    fail_fetches: AtomicUsize,
    stateless_polls: AtomicUsize,
    rejected_metadata: AtomicUsize,
    rejected_fetches: AtomicUsize,

    pub status_calls: AtomicUsize,
    pub metadata_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
    pub close_calls: AtomicUsize,
    pub max_rows_seen: Mutex<Vec<i64>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            handle: handle(),
            states: Mutex::new(VecDeque::from(vec![OperationState::Finished])),
            error_message: None,
            schema: vec![
                ColumnDesc::new("users.id", "INT_TYPE", 1),
                ColumnDesc::new("users.name", "STRING_TYPE", 2),
            ],
            batches: Mutex::new(VecDeque::new()),
            closed: AtomicBool::new(false),
            fail_polls: AtomicUsize::new(0),
            fail_fetches: AtomicUsize::new(0),
            stateless_polls: AtomicUsize::new(0),
            rejected_metadata: AtomicUsize::new(0),
            rejected_fetches: AtomicUsize::new(0),
            status_calls: AtomicUsize::new(0),
            metadata_calls: AtomicUsize::new(0),
            fetch_calls: AtomicUsize::new(0),
            close_calls: AtomicUsize::new(0),
            max_rows_seen: Mutex::new(Vec::new()),
        }
    }

    /// States returned by successive polls; the last one repeats.
    pub fn with_states(self, states: &[OperationState]) -> Self {
        *self.states.lock().unwrap() = states.iter().copied().collect();
        self
    }

    pub fn with_error_message(mut self, message: &str) -> Self {
        self.error_message = Some(message.to_string());
        self
    }

    pub fn with_schema(mut self, schema: Vec<ColumnDesc>) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_batch(self, rows: Vec<Row>, has_more: bool) -> Self {
        self.batches.lock().unwrap().push_back((rows, has_more));
        self
    }

    pub fn failing_polls(self, n: usize) -> Self {
        self.fail_polls.store(n, Ordering::SeqCst);
        self
    }

    pub fn failing_fetches(self, n: usize) -> Self {
        self.fail_fetches.store(n, Ordering::SeqCst);
        self
    }

    /// Acknowledge the next `n` polls with success but no state.
    pub fn stateless_polls(self, n: usize) -> Self {
        self.stateless_polls.store(n, Ordering::SeqCst);
        self
    }

    /// Answer the next `n` metadata calls with an error acknowledgment.
    pub fn rejecting_metadata(self, n: usize) -> Self {
        self.rejected_metadata.store(n, Ordering::SeqCst);
        self
    }

    /// Answer the next `n` fetches with an error acknowledgment.
    pub fn rejecting_fetches(self, n: usize) -> Self {
        self.rejected_fetches.store(n, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> (usize, usize, usize, usize) {
        (
            self.status_calls.load(Ordering::SeqCst),
            self.metadata_calls.load(Ordering::SeqCst),
            self.fetch_calls.load(Ordering::SeqCst),
            self.close_calls.load(Ordering::SeqCst),
        )
    }

    fn known(&self, handle: &OperationHandle) -> bool {
        handle.operation_id == self.handle.operation_id
    }

    fn invalid_handle() -> ResponseStatus {
        let mut status = ResponseStatus::with_code(StatusCode::InvalidHandle);
        status.error_message = Some("Invalid OperationHandle".into());
        status
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl OperationService for FakeService {
    fn get_operation_status(
        &self,
        req: GetOperationStatusReq,
    ) -> CallResult<GetOperationStatusResp> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.fail_polls) {
            return Err("connection reset by peer".into());
        }
        if Self::take_failure(&self.stateless_polls) {
            return Ok(GetOperationStatusResp {
                status: ResponseStatus::success(),
                operation_state: None,
                sql_state: None,
                error_code: None,
                error_message: None,
            });
        }
        if !self.known(&req.operation_handle) {
            return Ok(GetOperationStatusResp {
                status: Self::invalid_handle(),
                operation_state: None,
                sql_state: None,
                error_code: None,
                error_message: None,
            });
        }

        let state = if self.closed.load(Ordering::SeqCst) {
            OperationState::Closed
        } else {
            let mut states = self.states.lock().unwrap();
            if states.len() > 1 {
                states.pop_front().unwrap()
            } else {
                states[0]
            }
        };
        Ok(GetOperationStatusResp {
            status: ResponseStatus::success(),
            operation_state: Some(state),
            sql_state: None,
            error_code: None,
            error_message: if state == OperationState::Error {
                self.error_message.clone()
            } else {
                None
            },
        })
    }

    fn get_result_set_metadata(
        &self,
        req: GetResultSetMetadataReq,
    ) -> CallResult<GetResultSetMetadataResp> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.rejected_metadata) {
            return Ok(GetResultSetMetadataResp {
                status: ResponseStatus::error("metastore unavailable"),
                schema: None,
            });
        }
        if !self.known(&req.operation_handle) {
            return Ok(GetResultSetMetadataResp {
                status: Self::invalid_handle(),
                schema: None,
            });
        }
        Ok(GetResultSetMetadataResp {
            status: ResponseStatus::success(),
            schema: Some(TableSchema {
                columns: self.schema.clone(),
            }),
        })
    }

    fn fetch_results(&self, req: FetchResultsReq) -> CallResult<FetchResultsResp> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.max_rows_seen.lock().unwrap().push(req.max_rows);
        if Self::take_failure(&self.fail_fetches) {
            return Err("broken pipe".into());
        }
        if Self::take_failure(&self.rejected_fetches) {
            return Ok(FetchResultsResp {
                status: ResponseStatus::error("fetch size too large"),
                has_more_rows: None,
                results: None,
            });
        }
        if !self.known(&req.operation_handle) || self.closed.load(Ordering::SeqCst) {
            return Ok(FetchResultsResp {
                status: Self::invalid_handle(),
                has_more_rows: None,
                results: None,
            });
        }

        let (rows, has_more) = self
            .batches
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or((Vec::new(), false));
        Ok(FetchResultsResp {
            status: ResponseStatus::success(),
            has_more_rows: Some(has_more),
            results: Some(RowBatch {
                start_row_offset: 0,
                rows,
            }),
        })
    }

    fn close_operation(&self, req: CloseOperationReq) -> CallResult<CloseOperationResp> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if !self.known(&req.operation_handle) || self.closed.swap(true, Ordering::SeqCst) {
            return Ok(CloseOperationResp {
                status: Self::invalid_handle(),
            });
        }
        Ok(CloseOperationResp {
            status: ResponseStatus::success(),
        })
    }
}

/// Observer that records event names for assertions.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub events: Arc<Mutex<Vec<String>>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl RowSetObserver for RecordingObserver {
    fn on_fetch_issued(&self, max_rows: i64) {
        self.events.lock().unwrap().push(format!("fetch:{}", max_rows));
    }

    fn on_row_skipped(&self, offset: usize, _error: &hive_rowset::Error) {
        self.events.lock().unwrap().push(format!("skip:{}", offset));
    }

    fn on_batch_exhausted(&self, fetches: u64) {
        self.events.lock().unwrap().push(format!("exhausted:{}", fetches));
    }
}
