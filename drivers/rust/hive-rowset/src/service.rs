use crate::error::BoxError;
use crate::protocol::{
    CloseOperationReq, CloseOperationResp, FetchResultsReq, FetchResultsResp,
    GetOperationStatusReq, GetOperationStatusResp, GetResultSetMetadataReq,
    GetResultSetMetadataResp,
};
use std::sync::Arc;

/// Outcome of one remote call; `Err` means the call itself failed.
pub type CallResult<T> = std::result::Result<T, BoxError>;

/// The remote side of the operation lifecycle.
///
/// Implementations wrap an already-established, already-authenticated
/// connection. Calls take `&self`: the connection is expected to do its own
/// synchronization, so several rowsets may share one service.
pub trait OperationService {
    fn get_operation_status(&self, req: GetOperationStatusReq)
        -> CallResult<GetOperationStatusResp>;

    fn get_result_set_metadata(
        &self,
        req: GetResultSetMetadataReq,
    ) -> CallResult<GetResultSetMetadataResp>;

    fn fetch_results(&self, req: FetchResultsReq) -> CallResult<FetchResultsResp>;

    fn close_operation(&self, req: CloseOperationReq) -> CallResult<CloseOperationResp>;
}

macro_rules! forward_service {
    ($($ty:ty),*) => {$(
        impl<S: OperationService + ?Sized> OperationService for $ty {
            fn get_operation_status(
                &self,
                req: GetOperationStatusReq,
            ) -> CallResult<GetOperationStatusResp> {
                (**self).get_operation_status(req)
            }

            fn get_result_set_metadata(
                &self,
                req: GetResultSetMetadataReq,
            ) -> CallResult<GetResultSetMetadataResp> {
                (**self).get_result_set_metadata(req)
            }

            fn fetch_results(&self, req: FetchResultsReq) -> CallResult<FetchResultsResp> {
                (**self).fetch_results(req)
            }

            fn close_operation(&self, req: CloseOperationReq) -> CallResult<CloseOperationResp> {
                (**self).close_operation(req)
            }
        }
    )*};
}

forward_service!(&S, Arc<S>, Box<S>);
