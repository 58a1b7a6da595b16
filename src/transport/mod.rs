//! Network transport: one attempt of one request.

mod context;
mod http;

pub use context::RequestContext;
pub use http::{
    HttpTransport, PreparedRequest, RawResponse, CACHE_CONTROL_HINT, REQUEST_ID_HEADER,
};
