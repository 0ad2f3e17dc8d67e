//! 시장 데이터 수집 및 시계열 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - ENTSO-E 전일 가격 클라이언트와 XML 문서 파싱
//! - InfluxDB v2 가격 저장소 (line protocol 쓰기, Flux 조회)
//! - 테스트/드라이런용 메모리 저장소

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

pub use provider::{parse_document, EntsoeClient, MarketDataSource, MarketDocument};
pub use storage::{InfluxStore, MemoryPriceStore, PriceStore, SeriesQuery};
