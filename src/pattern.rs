//! 파일 선택 모듈
//!
//! `.csv` 접미사 규칙과 선택적 glob 패턴을 사용한 파일 이름 필터링을 담당합니다.

use glob::{MatchOptions, Pattern};

use crate::error::{ConvertError, Result};

/// 입력으로 인정되는 파일 이름 접미사 (대소문자 구분)
pub const CSV_SUFFIX: &str = ".csv";

/// 컴파일된 파일 이름 매처
#[derive(Default)]
pub struct PatternMatcher {
    pattern: Option<Pattern>,
}

impl PatternMatcher {
    /// 새 패턴 매처 생성
    ///
    /// # Arguments
    /// * `pattern` - 추가 glob 패턴 (None이면 `.csv` 규칙만 적용)
    ///
    /// # Examples
    /// ```
    /// use inventory_jsonl::pattern::PatternMatcher;
    ///
    /// let matcher = PatternMatcher::new(Some("stock_*".to_string())).unwrap();
    /// assert!(matcher.matches("stock_dxb.csv"));
    /// assert!(!matcher.matches("stock_dxb.txt"));
    /// assert!(!matcher.matches("prices.csv"));
    /// ```
    pub fn new(pattern: Option<String>) -> Result<Self> {
        let compiled = match pattern {
            Some(ref p) => Some(
                Pattern::new(p)
                    .map_err(|_| ConvertError::InvalidPattern { pattern: p.clone() })?,
            ),
            None => None,
        };

        Ok(Self { pattern: compiled })
    }

    /// 파일 이름이 변환 대상인지 확인
    ///
    /// 이름이 `.csv`로 끝나야 하며, 패턴이 있으면 패턴과도 일치해야 합니다.
    pub fn matches(&self, file_name: &str) -> bool {
        if !file_name.ends_with(CSV_SUFFIX) {
            return false;
        }

        match &self.pattern {
            Some(p) => p.matches_with(
                file_name,
                MatchOptions {
                    case_sensitive: true,
                    require_literal_separator: true,
                    require_literal_leading_dot: false,
                },
            ),
            None => true,
        }
    }

    /// 패턴이 설정되어 있는지 확인
    pub fn has_pattern(&self) -> bool {
        self.pattern.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csv_suffix_only() {
        let matcher = PatternMatcher::new(None).unwrap();
        assert!(matcher.matches("inventory_1.csv"));
        assert!(matcher.matches(".csv"));
        assert!(!matcher.matches("inventory_1.CSV"));
        assert!(!matcher.matches("inventory_1.csv.bak"));
        assert!(!matcher.matches("notes.txt"));
        assert!(!matcher.matches("csv"));
    }

    #[test]
    fn test_pattern_with_wildcard() {
        let matcher = PatternMatcher::new(Some("*_DXB_*".to_string())).unwrap();
        assert!(matcher.matches("export_DXB_1.csv"));
        assert!(!matcher.matches("export_AUH_1.csv"));
        assert!(!matcher.matches("export_DXB_1.json"));
    }

    #[test]
    fn test_pattern_with_brackets() {
        let matcher = PatternMatcher::new(Some("part[0-9].csv".to_string())).unwrap();
        assert!(matcher.matches("part1.csv"));
        assert!(!matcher.matches("partA.csv"));
    }

    #[test]
    fn test_pattern_is_case_sensitive() {
        let matcher = PatternMatcher::new(Some("stock*".to_string())).unwrap();
        assert!(matcher.matches("stock.csv"));
        assert!(!matcher.matches("STOCK.csv"));
    }

    #[test]
    fn test_pattern_matcher_invalid() {
        let result = PatternMatcher::new(Some("[invalid".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_has_pattern() {
        let with_pattern = PatternMatcher::new(Some("*.csv".to_string())).unwrap();
        let without_pattern = PatternMatcher::new(None).unwrap();

        assert!(with_pattern.has_pattern());
        assert!(!without_pattern.has_pattern());
    }
}
