//! 가격 수집 모듈.

pub mod backfill;
pub mod daemon;
pub mod import;
pub mod ingest;

pub use backfill::{backfill, BackfillOptions};
pub use daemon::run_until_shutdown;
pub use import::{import_recent, rolling_window};
pub use ingest::{IngestionPipeline, IngestionRequest};
