//! 재고 레코드 모듈
//!
//! CSV 행(Source Record)을 JSONL 레코드(Target Record)로 변환하는 순수 함수를 담당합니다.

use csv::StringRecord;
use serde::Serialize;

/// CSV 입력 스키마의 열 이름 (위치 순서대로)
pub const FIELD_NAMES: [&str; 14] = [
    "PartNumber",
    "UPC",
    "SKU",
    "QuantityOnHand",
    "QuantityAvailable",
    "SafetyStock",
    "Floor",
    "LTD",
    "LocationCode",
    "LocationName",
    "LocationActive",
    "DirectShip",
    "TransferEnabled",
    "Pickup",
];

/// 기본 테넌트 ID
pub const DEFAULT_TENANT_ID: i64 = 100016;

/// 기본 국가 코드
pub const DEFAULT_COUNTRY_CODE: &str = "AE";

/// 행 변환 실패 원인
///
/// 파일 경로와 줄 번호는 호출하는 쪽에서 붙입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// 열 개수가 14개보다 적음
    Short { found: usize },
    /// 값을 정수/플래그로 변환할 수 없음
    Invalid {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// CSV 한 행 (모든 값은 문자열)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRecord<'a> {
    pub part_number: &'a str,
    pub upc: &'a str,
    pub sku: &'a str,
    pub quantity_on_hand: &'a str,
    pub quantity_available: &'a str,
    pub safety_stock: &'a str,
    pub floor: &'a str,
    pub ltd: &'a str,
    pub location_code: &'a str,
    pub location_name: &'a str,
    pub location_active: &'a str,
    pub direct_ship: &'a str,
    pub transfer_enabled: &'a str,
    pub pickup: &'a str,
}

impl<'a> SourceRecord<'a> {
    /// 위치 기반으로 CSV 레코드를 해석
    ///
    /// 14개를 넘는 열은 무시하고, 부족하면 `FieldError::Short`를 반환합니다.
    pub fn from_record(record: &'a StringRecord) -> Result<Self, FieldError> {
        if record.len() < FIELD_NAMES.len() {
            return Err(FieldError::Short {
                found: record.len(),
            });
        }

        let cell = move |i: usize| record.get(i).unwrap_or_default();

        Ok(Self {
            part_number: cell(0),
            upc: cell(1),
            sku: cell(2),
            quantity_on_hand: cell(3),
            quantity_available: cell(4),
            safety_stock: cell(5),
            floor: cell(6),
            ltd: cell(7),
            location_code: cell(8),
            location_name: cell(9),
            location_active: cell(10),
            direct_ship: cell(11),
            transfer_enabled: cell(12),
            pickup: cell(13),
        })
    }
}

/// 출력 레코드에 주입되는 설정 값
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDefaults {
    pub tenant_id: i64,
    pub country_code: String,
}

impl Default for RecordDefaults {
    fn default() -> Self {
        Self {
            tenant_id: DEFAULT_TENANT_ID,
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

/// JSONL 한 줄에 해당하는 재고 레코드
///
/// 필드 선언 순서가 곧 JSON 키 순서입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetRecord<'a> {
    pub location_name: &'a str,
    pub location_code: &'a str,
    #[serde(rename = "tenantID")]
    pub tenant_id: i64,
    pub on_hand: i64,
    pub available: i64,
    pub allocated: i64,
    pub pending: i64,
    pub upc: &'a str,
    pub block_assignment: bool,
    pub ltd: i64,
    pub floor: i64,
    pub safety_stock: i64,
    pub distance: i64,
    pub direct_ship: bool,
    pub transfer_enabled: bool,
    pub pickup: bool,
    pub country_code: &'a str,
}

/// Source Record를 Target Record로 변환
///
/// `onHand`/`available`은 빈 값을 허용하지 않고,
/// `ltd`/`floor`/`safetyStock`은 빈 문자열만 0으로 취급합니다.
pub fn transform<'a>(
    source: &SourceRecord<'a>,
    defaults: &'a RecordDefaults,
) -> Result<TargetRecord<'a>, FieldError> {
    Ok(TargetRecord {
        location_name: source.location_name,
        location_code: source.location_code,
        tenant_id: defaults.tenant_id,
        on_hand: parse_int("QuantityOnHand", source.quantity_on_hand)?,
        available: parse_int("QuantityAvailable", source.quantity_available)?,
        allocated: 0,
        pending: 0,
        upc: source.upc,
        block_assignment: false,
        ltd: parse_int_or_zero("LTD", source.ltd)?,
        floor: parse_int_or_zero("Floor", source.floor)?,
        safety_stock: parse_int_or_zero("SafetyStock", source.safety_stock)?,
        distance: 0,
        direct_ship: parse_flag("DirectShip", source.direct_ship)?,
        transfer_enabled: parse_flag("TransferEnabled", source.transfer_enabled)?,
        pickup: parse_flag("Pickup", source.pickup)?,
        country_code: &defaults.country_code,
    })
}

/// 10진 정수 파싱 (앞뒤 공백과 부호 허용)
///
/// ASCII 숫자만 받으며, 자릿수 구분 밑줄(`1_000`)과 `i64` 범위를 넘는 값은 에러입니다.
///
/// # Examples
/// ```
/// use inventory_jsonl::record::parse_int;
///
/// assert_eq!(parse_int("QuantityOnHand", " 42 "), Ok(42));
/// assert!(parse_int("QuantityOnHand", "").is_err());
/// ```
pub fn parse_int(field: &'static str, value: &str) -> Result<i64, FieldError> {
    value.trim().parse::<i64>().map_err(|e| FieldError::Invalid {
        field,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// 빈 문자열이면 0, 그 외에는 `parse_int`와 동일
pub fn parse_int_or_zero(field: &'static str, value: &str) -> Result<i64, FieldError> {
    if value.is_empty() {
        Ok(0)
    } else {
        parse_int(field, value)
    }
}

/// 0/1 플래그 파싱
pub fn parse_flag(field: &'static str, value: &str) -> Result<bool, FieldError> {
    match parse_int(field, value)? {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(FieldError::Invalid {
            field,
            value: value.to_string(),
            reason: "0 또는 1이어야 합니다".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn row(cells: [&str; 14]) -> StringRecord {
        StringRecord::from(cells.to_vec())
    }

    fn sample() -> StringRecord {
        row([
            "PN-1", "0123456789012", "SKU-1", "10", "8", "2", "1", "3", "WH01", "Dubai Mall", "1",
            "1", "0", "1",
        ])
    }

    #[test]
    fn test_transform_maps_all_fields() {
        let record = sample();
        let source = SourceRecord::from_record(&record).unwrap();
        let defaults = RecordDefaults::default();
        let target = transform(&source, &defaults).unwrap();

        let value = serde_json::to_value(&target).unwrap();
        assert_eq!(
            value,
            json!({
                "locationName": "Dubai Mall",
                "locationCode": "WH01",
                "tenantID": 100016,
                "onHand": 10,
                "available": 8,
                "allocated": 0,
                "pending": 0,
                "upc": "0123456789012",
                "blockAssignment": false,
                "ltd": 3,
                "floor": 1,
                "safetyStock": 2,
                "distance": 0,
                "directShip": true,
                "transferEnabled": false,
                "pickup": true,
                "countryCode": "AE"
            })
        );
    }

    #[test]
    fn test_key_order_follows_schema() {
        let record = sample();
        let source = SourceRecord::from_record(&record).unwrap();
        let defaults = RecordDefaults::default();
        let line = serde_json::to_string(&transform(&source, &defaults).unwrap()).unwrap();

        assert!(line.starts_with(r#"{"locationName":"Dubai Mall","locationCode":"WH01","tenantID":100016"#));
        assert!(line.ends_with(r#""countryCode":"AE"}"#));
    }

    #[test]
    fn test_empty_optional_counts_default_to_zero() {
        let record = row([
            "", "", "", "5", "5", "", "", "", "L", "N", "", "0", "0", "0",
        ]);
        let source = SourceRecord::from_record(&record).unwrap();
        let defaults = RecordDefaults::default();
        let target = transform(&source, &defaults).unwrap();

        assert_eq!((target.ltd, target.floor, target.safety_stock), (0, 0, 0));
    }

    #[test]
    fn test_empty_on_hand_is_an_error() {
        let record = row([
            "", "", "", "", "5", "", "", "", "L", "N", "", "0", "0", "0",
        ]);
        let source = SourceRecord::from_record(&record).unwrap();
        let defaults = RecordDefaults::default();

        match transform(&source, &defaults) {
            Err(FieldError::Invalid { field, value, .. }) => {
                assert_eq!(field, "QuantityOnHand");
                assert_eq!(value, "");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_whitespace_only_optional_count_is_an_error() {
        assert_eq!(parse_int_or_zero("LTD", ""), Ok(0));
        assert!(parse_int_or_zero("LTD", " ").is_err());
        assert!(parse_int_or_zero("LTD", "n/a").is_err());
    }

    #[test]
    fn test_parse_int_accepts_sign_and_padding() {
        assert_eq!(parse_int("Floor", "-3"), Ok(-3));
        assert_eq!(parse_int("Floor", "+7"), Ok(7));
        assert_eq!(parse_int("Floor", "\t12 "), Ok(12));
        assert!(parse_int("Floor", "1.5").is_err());
    }

    #[test]
    fn test_parse_int_rejects_non_plain_digits() {
        assert!(parse_int("QuantityOnHand", "1_000").is_err());
        assert!(parse_int("QuantityOnHand", "٣").is_err());
        assert!(parse_int("QuantityOnHand", "99999999999999999999").is_err());
        assert_eq!(
            parse_int("QuantityOnHand", "9223372036854775807"),
            Ok(i64::MAX)
        );
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("Pickup", "0"), Ok(false));
        assert_eq!(parse_flag("Pickup", "1"), Ok(true));
        assert!(parse_flag("Pickup", "2").is_err());
        assert!(parse_flag("Pickup", "true").is_err());
        assert!(parse_flag("Pickup", "").is_err());
    }

    #[test]
    fn test_short_row() {
        let record = StringRecord::from(vec!["a", "b", "c"]);
        assert_eq!(
            SourceRecord::from_record(&record),
            Err(FieldError::Short { found: 3 })
        );
    }

    #[test]
    fn test_extra_cells_are_ignored() {
        let base = sample();
        let mut cells: Vec<&str> = base.iter().collect();
        cells.push("extra");
        let record = StringRecord::from(cells);
        let source = SourceRecord::from_record(&record).unwrap();
        assert_eq!(source.pickup, "1");
    }

    #[test]
    fn test_custom_defaults() {
        let record = sample();
        let source = SourceRecord::from_record(&record).unwrap();
        let defaults = RecordDefaults {
            tenant_id: 42,
            country_code: "SA".to_string(),
        };
        let value: Value = serde_json::to_value(transform(&source, &defaults).unwrap()).unwrap();

        assert_eq!(value["tenantID"], json!(42));
        assert_eq!(value["countryCode"], json!("SA"));
        assert_eq!(value.as_object().unwrap().len(), 17);
    }
}
