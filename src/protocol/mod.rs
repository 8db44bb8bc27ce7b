mod error;
mod response;

pub use error::{Error, Result};
pub use response::{ApiResponse, CreateResult, QueryResponse, Verb};
