//! 가격 단위 변환 및 세금 적용.
//!
//! 시장 데이터 소스는 EUR/MWh 단위로 가격을 제공합니다. 이 모듈은 두 가지
//! 변환 경로를 제공합니다:
//!
//! - **수집 경로**: EUR/MWh → EUR/kWh (`÷ 1000`)
//! - **조회 경로**: 저장된 EUR/MWh → ct/kWh (`÷ 10`)
//!
//! 두 제수는 서로 유도되지 않는 독립적인 값입니다. 조회 경로는 저장된
//! 원본(EUR/MWh) 필드를 읽으므로 `÷ 1000`을 적용한 값에 다시 `÷ 10`을
//! 적용하면 결과가 100배 작아집니다.
//!
//! 변환 과정에서는 반올림하지 않습니다. 반올림은 응답 직렬화 직전에만
//! 수행합니다 ([`round_price`]).

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{SpotError, SpotResult};

/// 수집 경로 제수: EUR/MWh → EUR/kWh.
pub const INGEST_DIVISOR: Decimal = dec!(1000);

/// 조회 경로 제수: EUR/MWh → ct/kWh.
pub const QUERY_DIVISOR: Decimal = dec!(10);

/// 응답 값의 소수점 자릿수.
pub const OUTPUT_DECIMAL_PLACES: u32 = 2;

/// 검증된 세율 (0.06 = 6%).
///
/// 음수 세율은 생성 시점에 설정 에러로 거부됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct TaxRate(Decimal);

impl TaxRate {
    /// 세금 없음.
    pub const ZERO: TaxRate = TaxRate(Decimal::ZERO);

    /// 새 세율을 생성합니다.
    pub fn new(rate: Decimal) -> SpotResult<Self> {
        if rate.is_sign_negative() && !rate.is_zero() {
            return Err(SpotError::Config(format!(
                "세율은 음수일 수 없습니다: {}",
                rate
            )));
        }
        Ok(Self(rate))
    }

    /// 세율 값을 반환합니다.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// 세금 포함 배수 (`1 + rate`).
    pub fn multiplier(&self) -> Decimal {
        Decimal::ONE + self.0
    }

    /// 값에 세금을 적용합니다.
    pub fn apply(&self, value: Decimal) -> Decimal {
        value * self.multiplier()
    }
}

impl TryFrom<Decimal> for TaxRate {
    type Error = SpotError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TaxRate> for Decimal {
    fn from(rate: TaxRate) -> Self {
        rate.0
    }
}

impl FromStr for TaxRate {
    type Err = SpotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let rate = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|e| SpotError::Config(format!("세율 파싱 실패 '{}': {}", s, e)))?;
        Self::new(rate)
    }
}

impl fmt::Display for TaxRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 단일 원본 가격에 대한 변환 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConvertedPrice {
    /// 원본 값 (EUR/MWh)
    pub base: Decimal,
    /// 변환 값 (EUR/kWh)
    pub converted: Decimal,
    /// 세금 포함 변환 값 (EUR/kWh)
    pub taxed: Decimal,
}

/// 단위/세금 변환기.
///
/// 수집 경로와 조회 경로의 제수를 각각 보관합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitTaxTransform {
    ingest_divisor: Decimal,
    query_divisor: Decimal,
}

impl Default for UnitTaxTransform {
    fn default() -> Self {
        Self {
            ingest_divisor: INGEST_DIVISOR,
            query_divisor: QUERY_DIVISOR,
        }
    }
}

impl UnitTaxTransform {
    /// 기본 제수(1000 / 10)로 변환기를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 지정 제수로 변환기를 생성합니다.
    ///
    /// 제수가 0 이하이면 설정 에러를 반환합니다.
    pub fn with_divisors(ingest_divisor: Decimal, query_divisor: Decimal) -> SpotResult<Self> {
        if ingest_divisor <= Decimal::ZERO || query_divisor <= Decimal::ZERO {
            return Err(SpotError::Config(format!(
                "변환 제수는 양수여야 합니다: ingest={}, query={}",
                ingest_divisor, query_divisor
            )));
        }
        Ok(Self {
            ingest_divisor,
            query_divisor,
        })
    }

    /// 수집 경로 제수.
    pub fn ingest_divisor(&self) -> Decimal {
        self.ingest_divisor
    }

    /// 조회 경로 제수.
    pub fn query_divisor(&self) -> Decimal {
        self.query_divisor
    }

    /// 수집 경로 변환: EUR/MWh → EUR/kWh (+ 세금).
    pub fn convert(&self, raw_value: Decimal, tax_rate: TaxRate) -> ConvertedPrice {
        let converted = raw_value / self.ingest_divisor;
        ConvertedPrice {
            base: raw_value,
            converted,
            taxed: tax_rate.apply(converted),
        }
    }

    /// 조회 경로 변환: 저장된 EUR/MWh → ct/kWh (+ 세금).
    ///
    /// 반올림하지 않은 값을 반환합니다.
    pub fn to_consumer(&self, stored_base: Decimal, tax_rate: TaxRate) -> Decimal {
        tax_rate.apply(stored_base / self.query_divisor)
    }
}

/// 응답 직렬화용 반올림 (소수점 2자리, 0.5는 0에서 먼 쪽으로).
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(
        OUTPUT_DECIMAL_PLACES,
        RoundingStrategy::MidpointAwayFromZero,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_conversion_divides_by_thousand() {
        let transform = UnitTaxTransform::new();
        let price = transform.convert(dec!(100), TaxRate::ZERO);

        assert_eq!(price.base, dec!(100));
        assert_eq!(price.converted, dec!(0.1));
        assert_eq!(price.taxed, dec!(0.1));
    }

    #[test]
    fn test_ingest_conversion_with_tax() {
        let transform = UnitTaxTransform::new();
        let tax = TaxRate::new(dec!(0.06)).unwrap();
        let price = transform.convert(dec!(100), tax);

        assert_eq!(price.converted, dec!(0.1));
        assert_eq!(price.taxed, dec!(0.106));
    }

    #[test]
    fn test_query_conversion_divides_by_ten() {
        let transform = UnitTaxTransform::new();

        let untaxed = transform.to_consumer(dec!(100.0), TaxRate::ZERO);
        assert_eq!(round_price(untaxed), dec!(10.00));

        let taxed = transform.to_consumer(dec!(100.0), TaxRate::new(dec!(0.06)).unwrap());
        assert_eq!(round_price(taxed), dec!(10.60));
    }

    #[test]
    fn test_divisors_are_independent() {
        let transform = UnitTaxTransform::new();
        assert_eq!(transform.ingest_divisor(), dec!(1000));
        assert_eq!(transform.query_divisor(), dec!(10));

        // 수집 경로 결과에 조회 경로를 다시 적용하면 100배 작아진다
        let converted = transform.convert(dec!(100), TaxRate::ZERO).converted;
        let double_applied = transform.to_consumer(converted, TaxRate::ZERO);
        assert_eq!(double_applied, dec!(0.01));
        assert_ne!(double_applied, transform.to_consumer(dec!(100), TaxRate::ZERO));
    }

    #[test]
    fn test_custom_divisors() {
        let transform = UnitTaxTransform::with_divisors(dec!(1), dec!(1)).unwrap();
        assert_eq!(transform.to_consumer(dec!(42), TaxRate::ZERO), dec!(42));

        assert!(UnitTaxTransform::with_divisors(dec!(0), dec!(10)).is_err());
        assert!(UnitTaxTransform::with_divisors(dec!(1000), dec!(-10)).is_err());
    }

    #[test]
    fn test_negative_tax_rate_rejected() {
        assert!(matches!(
            TaxRate::new(dec!(-0.01)),
            Err(SpotError::Config(_))
        ));

        assert!("-0.5".parse::<TaxRate>().is_err());
        assert!("abc".parse::<TaxRate>().is_err());
    }

    #[test]
    fn test_tax_rate_parse() {
        assert_eq!("0.06".parse::<TaxRate>().unwrap().value(), dec!(0.06));
        assert_eq!("0".parse::<TaxRate>().unwrap(), TaxRate::ZERO);
        assert_eq!(" 0.21 ".parse::<TaxRate>().unwrap().value(), dec!(0.21));
    }

    #[test]
    fn test_no_rounding_inside_transform() {
        let transform = UnitTaxTransform::new();
        let value = transform.to_consumer(dec!(123.456), TaxRate::new(dec!(0.06)).unwrap());
        assert_eq!(value, dec!(13.086336));
        assert_eq!(round_price(value), dec!(13.09));
    }

    #[test]
    fn test_round_price_midpoint() {
        assert_eq!(round_price(dec!(1.005)), dec!(1.01));
        assert_eq!(round_price(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_price(dec!(2.344)), dec!(2.34));
    }
}
