pub mod docs;
pub mod timeout;

pub use docs::hide_docs_when_disabled;
pub use timeout::{request_timeout, RequestTimeout};
