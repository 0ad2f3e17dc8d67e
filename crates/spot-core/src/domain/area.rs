//! 입찰 지역(bidding zone) 정의.
//!
//! ENTSO-E 지역 단축 코드(`BE`, `DE_LU`, `NL` 등)와 EIC 도메인 코드 간의
//! 변환을 제공합니다. 저장소에는 단축 코드가 `country` 태그로 기록됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{SpotError, SpotResult};

/// 단축 코드 → EIC 도메인 코드 매핑.
const AREA_EIC_CODES: &[(&str, &str)] = &[
    ("AT", "10YAT-APG------L"),
    ("BE", "10YBE----------2"),
    ("BG", "10YCA-BULGARIA-R"),
    ("CH", "10YCH-SWISSGRIDZ"),
    ("CZ", "10YCZ-CEPS-----N"),
    ("DE_LU", "10Y1001A1001A82H"),
    ("DK_1", "10YDK-1--------W"),
    ("DK_2", "10YDK-2--------M"),
    ("EE", "10Y1001A1001A39I"),
    ("ES", "10YES-REE------0"),
    ("FI", "10YFI-1--------U"),
    ("FR", "10YFR-RTE------C"),
    ("GR", "10YGR-HTSO-----Y"),
    ("HR", "10YHR-HEP------M"),
    ("HU", "10YHU-MAVIR----U"),
    ("IE_SEM", "10Y1001A1001A59C"),
    ("IT_NORD", "10Y1001A1001A73I"),
    ("LT", "10YLT-1001A0008Q"),
    ("LV", "10YLV-1001A00074"),
    ("NL", "10YNL----------L"),
    ("NO_1", "10YNO-1--------2"),
    ("NO_2", "10YNO-2--------T"),
    ("NO_3", "10YNO-3--------J"),
    ("NO_4", "10YNO-4--------9"),
    ("NO_5", "10Y1001A1001A48H"),
    ("PL", "10YPL-AREA-----S"),
    ("PT", "10YPT-REN------W"),
    ("RO", "10YRO-TEL------P"),
    ("RS", "10YCS-SERBIATSOV"),
    ("SE_1", "10Y1001A1001A44P"),
    ("SE_2", "10Y1001A1001A45N"),
    ("SE_3", "10Y1001A1001A46L"),
    ("SE_4", "10Y1001A1001A47J"),
    ("SI", "10YSI-ELES-----O"),
    ("SK", "10YSK-SEPS-----K"),
];

/// 저장 포인트에 붙는 지역 태그.
///
/// 지역 태그 단독으로는 식별자가 아니며, 저장 포인트의 식별 키는
/// `(country_code, price_type, timestamp)`입니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AreaTag {
    country_code: String,
}

impl AreaTag {
    /// 새 지역 태그를 생성합니다.
    ///
    /// 코드는 대문자로 정규화되며 영숫자, `_`, `-`만 허용됩니다.
    pub fn new(country_code: impl Into<String>) -> SpotResult<Self> {
        let code = country_code.into().trim().to_uppercase();
        if code.is_empty() {
            return Err(SpotError::InvalidArea("빈 지역 코드".to_string()));
        }
        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(SpotError::InvalidArea(code));
        }
        Ok(Self { country_code: code })
    }

    /// 지역 단축 코드.
    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// ENTSO-E EIC 도메인 코드.
    ///
    /// 매핑 테이블에 없는 코드가 `10Y`로 시작하면 EIC 코드로 간주합니다.
    pub fn eic_code(&self) -> Option<&str> {
        AREA_EIC_CODES
            .iter()
            .find(|(code, _)| *code == self.country_code)
            .map(|(_, eic)| *eic)
            .or_else(|| {
                self.country_code
                    .starts_with("10Y")
                    .then_some(self.country_code.as_str())
            })
    }

    /// EIC 코드를 반환하거나, 알 수 없는 지역이면 에러를 반환합니다.
    pub fn require_eic_code(&self) -> SpotResult<&str> {
        self.eic_code().ok_or_else(|| {
            SpotError::InvalidArea(format!(
                "EIC 코드를 알 수 없는 지역: {} (지원: {})",
                self.country_code,
                Self::known_codes().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    /// 매핑 테이블에 등록된 지역 코드 목록.
    pub fn known_codes() -> impl Iterator<Item = &'static str> {
        AREA_EIC_CODES.iter().map(|(code, _)| *code)
    }
}

impl FromStr for AreaTag {
    type Err = SpotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for AreaTag {
    type Error = SpotError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AreaTag> for String {
    fn from(area: AreaTag) -> Self {
        area.country_code
    }
}

impl fmt::Display for AreaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.country_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_normalization() {
        let area = AreaTag::new(" be ").unwrap();
        assert_eq!(area.country_code(), "BE");
        assert_eq!(area.to_string(), "BE");
    }

    #[test]
    fn test_area_eic_lookup() {
        assert_eq!(
            AreaTag::new("BE").unwrap().eic_code(),
            Some("10YBE----------2")
        );
        assert_eq!(
            AreaTag::new("de_lu").unwrap().eic_code(),
            Some("10Y1001A1001A82H")
        );
        assert_eq!(AreaTag::new("XX").unwrap().eic_code(), None);

        let err = AreaTag::new("XX").unwrap().require_eic_code().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("XX"));
        assert!(message.contains("DE_LU"));
    }

    #[test]
    fn test_raw_eic_code_passthrough() {
        let area = AreaTag::new("10YNL----------L").unwrap();
        assert_eq!(area.eic_code(), Some("10YNL----------L"));
    }

    #[test]
    fn test_area_rejects_invalid_characters() {
        assert!(AreaTag::new("").is_err());
        assert!(AreaTag::new("BE\") |> drop()").is_err());
        assert!(AreaTag::new("B E").is_err());
    }

    #[test]
    fn test_area_serde() {
        let area: AreaTag = serde_json::from_str(r#""nl""#).unwrap();
        assert_eq!(area.country_code(), "NL");
        assert_eq!(serde_json::to_string(&area).unwrap(), r#""NL""#);
        assert!(serde_json::from_str::<AreaTag>(r#""a/b""#).is_err());
    }

    #[test]
    fn test_known_codes_are_valid() {
        for code in AreaTag::known_codes() {
            let area = AreaTag::new(code).unwrap();
            assert!(area.eic_code().is_some(), "{code}");
        }
    }
}
