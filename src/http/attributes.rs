//! Request attribute keys shared between the dispatcher, the error page
//! resolver and the host.
//!
//! Attributes are the only data channel between those components besides the
//! request and response themselves.

/// Human readable error message for the current error response.
pub const ERROR_MESSAGE: &str = "servlet.error.message";

/// Status code of the current error response.
pub const ERROR_STATUS_CODE: &str = "servlet.error.status_code";

/// URI of the request that produced the error.
pub const ERROR_REQUEST_URI: &str = "servlet.error.request_uri";

/// Display form of the failure that produced the error.
pub const ERROR_EXCEPTION: &str = "servlet.error.exception";

/// Type name of the failure that produced the error.
pub const ERROR_EXCEPTION_TYPE: &str = "servlet.error.exception_type";

/// Filesystem base path of the application.
pub const BASE_PATH: &str = "servlet.context.base_path";

/// Request id assigned by the HTTP front-end.
pub const REQUEST_ID: &str = "servlet.request_id";
