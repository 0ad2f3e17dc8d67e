//! 수집/조회 경로에서 공통으로 사용되는 타입.

mod conversion;

pub use conversion::*;
