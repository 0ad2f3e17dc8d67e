//! 비즈니스 로직 서비스.

pub mod query;

pub use query::QueryService;
