//! Classification of `redis` errors into store error kinds.

use recordfetch_core::StoreError;
use redis::{ErrorKind, RedisError};

/// Server error code for operations against a key of the wrong type.
const WRONGTYPE: &str = "WRONGTYPE";

/// Map a driver error onto the key-store error kinds.
///
/// - `WRONGTYPE` replies and reply conversion failures are type mismatches.
/// - I/O failures, refusals, timeouts and dropped connections are
///   connection errors.
/// - Everything else is `Other`.
pub fn classify(error: RedisError) -> StoreError {
    if error.code() == Some(WRONGTYPE) || error.kind() == ErrorKind::TypeError {
        return StoreError::type_mismatch(error.to_string());
    }

    if error.is_io_error()
        || error.is_connection_refusal()
        || error.is_timeout()
        || error.is_connection_dropped()
    {
        return StoreError::connection(error.to_string());
    }

    StoreError::other(error.to_string())
}
