//! 가격 수집/조회를 위한 도메인 모델.

mod area;
mod chunk;
mod interval;
mod price;

pub use area::*;
pub use chunk::*;
pub use interval::*;
pub use price::*;
