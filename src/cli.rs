//! CLI 인자 파싱 모듈
//!
//! clap을 사용한 명령줄 인자 정의 및 파싱을 담당합니다.
//! 주요 설정은 환경 변수로도 지정할 수 있습니다.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::converter::ConvertOptions;
use crate::record::{RecordDefaults, DEFAULT_COUNTRY_CODE, DEFAULT_TENANT_ID};

/// 출력 파일 모드
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum WriteMode {
    /// 기존 파일이 있으면 덮어쓰기
    #[default]
    Overwrite,
    /// 기존 파일에 추가
    Append,
    /// 기존 파일이 있으면 에러
    Error,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Overwrite => write!(f, "Overwrite"),
            WriteMode::Append => write!(f, "Append"),
            WriteMode::Error => write!(f, "Error"),
        }
    }
}

/// 입력 파일 처리 순서
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum FileOrder {
    /// 운영체제가 돌려주는 폴더 목록 순서 (결정적이지 않음)
    #[default]
    Listing,
    /// 파일 이름 사전순
    Name,
}

/// 헤더 행 처리 방식
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum HeaderMode {
    /// 첫 행을 검사 없이 버림
    #[default]
    Skip,
    /// 첫 행이 예상 열 이름과 같은지 검사
    Strict,
}

/// 잘못된 행을 만났을 때의 정책
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq)]
pub enum ErrorPolicy {
    /// 첫 번째 오류에서 전체 실행 중단
    #[default]
    Abort,
    /// 잘못된 행을 건너뛰고 보고 (파일 단위 오류는 여전히 중단)
    Skip,
}

impl std::fmt::Display for ErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorPolicy::Abort => write!(f, "Abort"),
            ErrorPolicy::Skip => write!(f, "Skip"),
        }
    }
}

/// inventory-jsonl CLI 인자 구조체
#[derive(Parser, Debug)]
#[command(
    name = "inventory-jsonl",
    author = "YourName <your@email.com>",
    version,
    about = "INVENTORY CSV TO JSONL CONVERTER - 재고 CSV 내보내기 파일들을 하나의 JSONL로 변환하는 CLI 도구",
    long_about = r#"
INVENTORY CSV TO JSONL CONVERTER
================================

입력 폴더의 모든 *.csv 재고 내보내기 파일(14열 고정 스키마)을 읽어
행마다 17개 키를 가진 JSON 객체로 변환하고
하나의 JSONL (JSON Lines) 파일로 저장합니다.

특징:
  • 파일 단위 병렬 처리 (출력 순서는 유지)
  • 진행률 표시 및 상세 통계
  • 다양한 출력 모드 지원 (덮어쓰기/추가/에러)
  • 헤더 검증 및 파일 이름 정렬 옵션
  • 잘못된 행 건너뛰기 모드와 에러 로그

예제:
  inventory-jsonl
  inventory-jsonl -i ./inventory_export -o inventory.jsonl
  inventory-jsonl -i ./inventory_export --order name --header strict
  inventory-jsonl -i ./inventory_export --on-error skip --log errors.log
  inventory-jsonl -i ./inventory_export --validate-only
"#
)]
pub struct Args {
    /// CSV 파일들이 있는 입력 폴더 경로
    #[arg(short, long, env = "INVENTORY_INPUT_DIR", default_value = "inventory_export")]
    pub input: PathBuf,

    /// 생성될 JSONL 파일 경로
    #[arg(short, long, env = "INVENTORY_OUTPUT", default_value = "inventory.jsonl")]
    pub output: PathBuf,

    /// 출력 파일 모드
    #[arg(short, long, value_enum, default_value_t = WriteMode::Overwrite)]
    pub mode: WriteMode,

    /// 모든 레코드에 넣을 테넌트 ID
    #[arg(long, env = "INVENTORY_TENANT_ID", default_value_t = DEFAULT_TENANT_ID)]
    pub tenant_id: i64,

    /// 모든 레코드에 넣을 국가 코드
    #[arg(long, env = "INVENTORY_COUNTRY_CODE", default_value = DEFAULT_COUNTRY_CODE)]
    pub country_code: String,

    /// 입력 파일 처리 순서
    #[arg(long, value_enum, default_value_t = FileOrder::Listing)]
    pub order: FileOrder,

    /// 헤더 행 처리 방식
    #[arg(long, value_enum, default_value_t = HeaderMode::Skip)]
    pub header: HeaderMode,

    /// 잘못된 행 처리 정책
    #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
    pub on_error: ErrorPolicy,

    /// 추가 파일 이름 패턴 필터 (glob 형식, 예: "stock_*")
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// 상세 출력 모드
    #[arg(short, long)]
    pub verbose: bool,

    /// 실제 변환 없이 처리될 파일 목록만 표시
    #[arg(long)]
    pub dry_run: bool,

    /// 변환 가능 여부만 검사 (출력 파일 없음)
    #[arg(long)]
    pub validate_only: bool,

    /// 병렬 처리 스레드 수 (기본값: CPU 코어 수)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// 에러 로그 파일 경로
    #[arg(long)]
    pub log: Option<PathBuf>,
}

impl Args {
    /// 인자를 변환 옵션으로 변환
    pub fn to_options(&self) -> ConvertOptions {
        ConvertOptions::new(&self.input, &self.output)
            .with_write_mode(self.mode)
            .with_order(self.order)
            .with_header_mode(self.header)
            .with_error_policy(self.on_error)
            .with_pattern(self.pattern.clone())
            .with_validate_only(self.validate_only)
            .with_defaults(RecordDefaults {
                tenant_id: self.tenant_id,
                country_code: self.country_code.clone(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths_and_values() {
        let args = Args::try_parse_from(["inventory-jsonl"]).unwrap();

        assert_eq!(args.input, PathBuf::from("inventory_export"));
        assert_eq!(args.output, PathBuf::from("inventory.jsonl"));
        assert_eq!(args.tenant_id, 100016);
        assert_eq!(args.country_code, "AE");
        assert_eq!(args.mode, WriteMode::Overwrite);
        assert_eq!(args.order, FileOrder::Listing);
        assert_eq!(args.header, HeaderMode::Skip);
        assert_eq!(args.on_error, ErrorPolicy::Abort);
    }

    #[test]
    fn test_value_enums_parse() {
        let args = Args::try_parse_from([
            "inventory-jsonl",
            "--order",
            "name",
            "--header",
            "strict",
            "--on-error",
            "skip",
            "--mode",
            "append",
            "--tenant-id",
            "7",
        ])
        .unwrap();

        assert_eq!(args.order, FileOrder::Name);
        assert_eq!(args.header, HeaderMode::Strict);
        assert_eq!(args.on_error, ErrorPolicy::Skip);
        assert_eq!(args.mode, WriteMode::Append);

        let options = args.to_options();
        assert_eq!(options.process.defaults.tenant_id, 7);
        assert_eq!(options.order, FileOrder::Name);
    }

    #[test]
    fn test_rejects_unknown_order() {
        assert!(Args::try_parse_from(["inventory-jsonl", "--order", "random"]).is_err());
    }
}
