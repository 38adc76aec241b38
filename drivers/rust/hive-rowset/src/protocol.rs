//! Wire-level types of the statement-execution protocol.
//!
//! These mirror the request and response structures a HiveServer2-style
//! service exchanges for the operation lifecycle. Every response carries a
//! [`ResponseStatus`] acknowledgment that must be checked before its payload
//! is trusted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Acknowledgment code attached to every response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Success,
    SuccessWithInfo,
    StillExecuting,
    Error,
    InvalidHandle,
}

impl StatusCode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS_STATUS",
            Self::SuccessWithInfo => "SUCCESS_WITH_INFO_STATUS",
            Self::StillExecuting => "STILL_EXECUTING_STATUS",
            Self::Error => "ERROR_STATUS",
            Self::InvalidHandle => "INVALID_HANDLE_STATUS",
        }
    }
}

/// Generic acknowledgment status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseStatus {
    pub status_code: StatusCode,
    pub info_messages: Vec<String>,
    pub sql_state: Option<String>,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}

impl ResponseStatus {
    /// A plain success ack.
    pub fn success() -> Self {
        Self::with_code(StatusCode::Success)
    }

    /// An error ack carrying `message`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::with_code(StatusCode::Error)
        }
    }

    pub fn with_code(status_code: StatusCode) -> Self {
        Self {
            status_code,
            info_messages: Vec::new(),
            sql_state: None,
            error_code: None,
            error_message: None,
        }
    }

    /// `Success` and `SuccessWithInfo` both count as success.
    pub fn is_success(&self) -> bool {
        matches!(
            self.status_code,
            StatusCode::Success | StatusCode::SuccessWithInfo
        )
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.status_code.name())?;
        if let Some(ref state) = self.sql_state {
            write!(f, " [{}]", state)?;
        }
        if let Some(ref msg) = self.error_message {
            write!(f, ": {}", msg)?;
        }
        Ok(())
    }
}

/// Execution state of a submitted operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationState {
    Initialized,
    Pending,
    Running,
    Finished,
    Canceled,
    Closed,
    Error,
    Unknown,
}

impl OperationState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialized => "INITIALIZED_STATE",
            Self::Pending => "PENDING_STATE",
            Self::Running => "RUNNING_STATE",
            Self::Finished => "FINISHED_STATE",
            Self::Canceled => "CANCELED_STATE",
            Self::Closed => "CLOSED_STATE",
            Self::Error => "ERROR_STATE",
            Self::Unknown => "UNKNOWN_STATE",
        }
    }

    /// Finished, canceled, closed and error are terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished | Self::Canceled | Self::Closed | Self::Error
        )
    }
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kind of operation a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    ExecuteStatement,
    GetTypeInfo,
    GetCatalogs,
    GetSchemas,
    GetTables,
    GetTableTypes,
    GetColumns,
    GetFunctions,
    Unknown,
}

/// Server-issued guid/secret pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleIdentifier {
    pub guid: Vec<u8>,
    pub secret: Vec<u8>,
}

/// Opaque identifier of a submitted operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationHandle {
    pub operation_id: HandleIdentifier,
    pub operation_type: OperationType,
    pub has_result_set: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_row_count: Option<f64>,
}

impl OperationHandle {
    /// Build a handle from the ids the service issued.
    pub fn new(
        guid: impl Into<Vec<u8>>,
        secret: impl Into<Vec<u8>>,
        operation_type: OperationType,
        has_result_set: bool,
    ) -> Self {
        Self {
            operation_id: HandleIdentifier {
                guid: guid.into(),
                secret: secret.into(),
            },
            operation_type,
            has_result_set,
            modified_row_count: None,
        }
    }
}

/// One column of the result schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDesc {
    pub column_name: String,
    pub type_name: String,
    pub position: i32,
    pub comment: Option<String>,
}

impl ColumnDesc {
    pub fn new(column_name: impl Into<String>, type_name: impl Into<String>, position: i32) -> Self {
        Self {
            column_name: column_name.into(),
            type_name: type_name.into(),
            position,
            comment: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableSchema {
    pub columns: Vec<ColumnDesc>,
}

/// A single column value as sent on the wire.
///
/// A kind whose payload is `None` is a SQL NULL of that kind. `Unset`
/// carries no kind at all and can't be converted.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    String(Option<String>),
    Bool(Option<bool>),
    Byte(Option<i8>),
    I16(Option<i16>),
    I32(Option<i32>),
    I64(Option<i64>),
    Double(Option<f64>),
    Unset,
}

/// A fixed-width row of column values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub col_vals: Vec<ColumnValue>,
}

impl Row {
    pub fn new(col_vals: Vec<ColumnValue>) -> Self {
        Self { col_vals }
    }
}

/// Rows returned by one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowBatch {
    pub start_row_offset: i64,
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOrientation {
    Next,
    Prior,
    Relative,
    Absolute,
    First,
    Last,
}

#[derive(Debug, Clone)]
pub struct GetOperationStatusReq {
    pub operation_handle: OperationHandle,
}

#[derive(Debug, Clone)]
pub struct GetOperationStatusResp {
    pub status: ResponseStatus,
    pub operation_state: Option<OperationState>,
    pub sql_state: Option<String>,
    pub error_code: Option<i32>,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GetResultSetMetadataReq {
    pub operation_handle: OperationHandle,
}

#[derive(Debug, Clone)]
pub struct GetResultSetMetadataResp {
    pub status: ResponseStatus,
    pub schema: Option<TableSchema>,
}

#[derive(Debug, Clone)]
pub struct FetchResultsReq {
    pub operation_handle: OperationHandle,
    pub orientation: FetchOrientation,
    pub max_rows: i64,
}

#[derive(Debug, Clone)]
pub struct FetchResultsResp {
    pub status: ResponseStatus,
    pub has_more_rows: Option<bool>,
    pub results: Option<RowBatch>,
}

#[derive(Debug, Clone)]
pub struct CloseOperationReq {
    pub operation_handle: OperationHandle,
}

#[derive(Debug, Clone)]
pub struct CloseOperationResp {
    pub status: ResponseStatus,
}
