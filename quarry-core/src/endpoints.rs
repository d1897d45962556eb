//! Endpoint names exposed by the compilation service
//!
//! All paths are relative to the service base URL.

/// Status probe for a submitted job, followed by `/<job_id>`
pub const PROCESS_STATUS: &str = "process_status";

/// Submit an asynchronous compilation job
pub const COMPILE_ASYNC: &str = "compile-async";

/// Fetch the artifacts of a completed compilation job
pub const COMPILE_RESULT: &str = "compile-result";

/// Submit an asynchronous verification job
pub const VERIFY_ASYNC: &str = "verify-async";

/// Fetch the outcome of a completed verification job
pub const VERIFY_RESULT: &str = "verify-result";

/// Compiler versions accepted by the service
pub const ALLOWED_VERSIONS: &str = "allowed_versions";

/// Version string of the service itself
pub const SERVICE_VERSION: &str = "service_version";
