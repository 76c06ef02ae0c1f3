/// Numeric status code carried by [`crate::Status`].
#[allow(non_camel_case_types)]
pub type status_code_t = u16;

/// Engine status codes. Values are stable; they appear in logs.
pub mod StatusCode {
    use super::status_code_t;

    pub const OK: status_code_t = 0;
    pub const KV_STORE_GET_ERROR: status_code_t = 61;
    pub const KV_STORE_SET_ERROR: status_code_t = 62;
    pub const KV_STORE_OPEN_FAILED: status_code_t = 63;
    pub const KV_STORE_ITERATE_ERROR: status_code_t = 68;
    pub const IO_ERROR: status_code_t = 69;
}

pub fn code_name(code: status_code_t) -> &'static str {
    match code {
        StatusCode::OK => "OK",
        StatusCode::KV_STORE_GET_ERROR => "KVStoreGetError",
        StatusCode::KV_STORE_SET_ERROR => "KVStoreSetError",
        StatusCode::KV_STORE_OPEN_FAILED => "KVStoreOpenFailed",
        StatusCode::KV_STORE_ITERATE_ERROR => "KVStoreIterateError",
        StatusCode::IO_ERROR => "IOError",
        _ => "UnknownStatusCode",
    }
}
