//! inventory-jsonl - INVENTORY CSV TO JSONL CONVERTER
//!
//! 폴더 내 재고 CSV 내보내기 파일들을 하나의 JSONL (JSON Lines) 파일로 변환하는 CLI 도구입니다.
//!
//! # 주요 기능
//!
//! - 📥 **고정 스키마 CSV**: 14개 열을 위치 기준으로 읽고 헤더 행은 버림 (선택적으로 검증)
//! - 🔁 **레코드 변환**: 열 이름 재매핑, 정수/플래그 변환, 상수 필드 주입 (17개 키)
//! - 🚀 **병렬 처리**: Rayon으로 파일 단위 병렬 변환, 출력 순서는 파일 순서 × 행 순서 유지
//! - 🛑 **중단 정책**: 기본적으로 첫 번째 잘못된 행에서 전체 실행 중단, 선택적으로 건너뛰기
//! - 📊 **진행률 및 통계**: 처리 진행 상황과 결과 요약 표시
//! - 📝 **다양한 출력 모드**: 덮어쓰기, 추가, 에러 모드 지원
//!
//! # 예제
//!
//! ```bash
//! # 기본 사용법 (inventory_export -> inventory.jsonl)
//! inventory-jsonl
//!
//! # 파일 이름순으로 결정적인 출력
//! inventory-jsonl -i ./inventory_export -o inventory.jsonl --order name
//!
//! # 변환 가능 여부만 검사
//! inventory-jsonl -i ./inventory_export --validate-only
//! ```

pub mod cli;
pub mod converter;
pub mod error;
pub mod pattern;
pub mod processor;
pub mod record;
pub mod stats;

// Re-exports for convenient access
pub use cli::{Args, ErrorPolicy, FileOrder, HeaderMode, WriteMode};
pub use converter::{convert, convert_with_options, ConvertOptions, JsonlWriter};
pub use error::{ConvertError, ErrorKind, Result};
pub use pattern::PatternMatcher;
pub use processor::{process_file, AbortSignal, FileResult, ProcessOptions};
pub use record::{transform, RecordDefaults, SourceRecord, TargetRecord};
pub use stats::{format_bytes, Statistics};
