/*
[INPUT]:  HTTP client configuration and task API endpoints
[OUTPUT]: HTTP responses and typed API results
[POS]:    HTTP layer - REST API communication
[UPDATE]: When adding new endpoints or changing client behavior
*/

pub mod client;
pub mod error;
pub mod tasks;

pub use error::{MegaWebError, Result};
pub use tasks::TASK_TYPE_HEADER;

pub use client::{ClientConfig, DEFAULT_BASE_URL, MegaWebClient};
