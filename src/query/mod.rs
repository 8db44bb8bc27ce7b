mod builder;
mod compiler;
mod criteria;

pub use builder::{Materialized, QueryBuilder};
pub use compiler::compile;
pub use criteria::Criteria;
