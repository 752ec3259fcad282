/*
[INPUT]:  Crate modules and public type definitions
[OUTPUT]: Public Mega-Web adapter crate surface
[POS]:    Crate root - module wiring
[UPDATE]: When public modules or exports change
*/

pub mod api;
pub mod http;
pub mod types;

// Re-export the API seam
pub use api::{MockReply, MockTaskApi, TaskApi};

// Re-export commonly used types from http
pub use http::{
    ClientConfig,
    DEFAULT_BASE_URL,
    MegaWebClient,
    MegaWebError,
    Result,
    TASK_TYPE_HEADER,
};

// Re-export all types
pub use types::*;
