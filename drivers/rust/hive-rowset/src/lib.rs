//! # hive-rowset
//!
//! Client side of an asynchronous, poll-based query execution protocol in
//! the style of HiveServer2: a query is submitted elsewhere, and the
//! resulting operation handle is driven here until its rows are read.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hive_rowset::{Config, OperationHandle, OperationService, RowSet, ScanTarget};
//!
//! fn print_users<S: OperationService>(service: S, op: OperationHandle) -> Result<(), hive_rowset::Error> {
//!     let mut rows = RowSet::new(service, op, Config::default())?;
//!     rows.wait()?;
//!
//!     let (mut id, mut name) = (0i32, String::new());
//!     while rows.next() {
//!         {
//!             let mut dest: [&mut dyn ScanTarget; 2] = [&mut id, &mut name];
//!             rows.scan(&mut dest)?;
//!         }
//!         println!("{} {}", id, name);
//!     }
//!     if let Some(err) = rows.last_error() {
//!         eprintln!("stopped early: {}", err);
//!     }
//!
//!     rows.close()
//! }
//! ```
//!
//! A handle can be persisted with [`RowSet::handle`] and picked up again by
//! another process with [`RowSet::reattach`].

pub mod handle;
pub mod protocol;

mod config;
mod error;
mod mapping;
mod observer;
mod rowset;
mod scan;
mod service;
mod status;
mod value;

pub use config::{Config, ConfigBuilder, DEFAULT_BATCH_SIZE, DEFAULT_POLL_INTERVAL_SECS};
pub use error::{BoxError, ConversionError, Error, Result};
pub use mapping::{FieldValue, RecordMapper};
pub use observer::{NoopObserver, RowSetObserver, TracingObserver};
pub use protocol::{
    ColumnDesc, ColumnValue, OperationHandle, OperationState, OperationType, ResponseStatus,
    Row, RowBatch, StatusCode,
};
pub use rowset::{RowSet, RowSetState};
pub use scan::ScanTarget;
pub use service::{CallResult, OperationService};
pub use status::Status;
pub use value::Value;
