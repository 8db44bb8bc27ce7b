//! forcelink
//!
//! Client for Salesforce-style object REST APIs: named remote collections
//! queried with a SOQL-like language. Provides raw verb access, CRUD over
//! resources, and a fluent, lazily-evaluated query builder that compiles a
//! chain of calls into a single query string.
//!
//! # Example
//!
//! ```no_run
//! use forcelink::{Client, Materialized, ResourceConfig};
//!
//! fn main() -> Result<(), forcelink::Error> {
//!     let client = Client::builder("https://example.my.salesforce.com")
//!         .auth("admin@example.com", "password")
//!         .build()?;
//!
//!     let accounts = client.resource_with(
//!         "Account",
//!         ResourceConfig::new().has_many("Contacts", &["Id", "Email"]),
//!     );
//!
//!     let matches = accounts
//!         .query()
//!         .select(["Name"])
//!         .filter("Industry", "Tech")
//!         .order(["Name"])
//!         .limit(5)
//!         .materialize()?;
//!
//!     if let Materialized::Records(records) = matches {
//!         for record in &records {
//!             println!("{}", record["Name"]);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod protocol;
pub mod query;
pub mod transport;

pub use client::{AuthMethod, Client, ClientBuilder, HttpTransport, Records, ResourceConfig, ResourceHandle};
pub use protocol::{ApiResponse, Error, Result, Verb};
pub use query::{compile, Criteria, Materialized, QueryBuilder};
pub use transport::Transport;
