//! Request instrumentation middleware.
//!
//! - `track`: the interceptor, mounted with `from_fn_with_state`
//! - `body`: byte-counting request/response bodies
//! - `wire`: request head framing for size measurement

pub mod body;
pub mod track;
pub mod wire;

pub use body::{BodyTally, CountingBody};
pub use track::track;
pub use wire::RequestHead;
