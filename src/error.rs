//! 에러 타입 정의 모듈
//!
//! 재고 변환 과정에서 발생할 수 있는 모든 에러 타입을 정의합니다.

use std::path::PathBuf;
use thiserror::Error;

/// 에러 분류
///
/// 운영자에게 보고할 때 사용하는 상위 분류입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 입력 폴더 또는 파일을 찾거나 읽을 수 없음
    NotFound,
    /// 행의 값을 변환할 수 없음
    Parse,
    /// 출력 파일 생성/쓰기 실패
    Io,
    /// 잘못된 설정
    Config,
    /// 순서상 앞선 파일의 오류로 처리를 멈춤
    Aborted,
}

/// 변환 중 발생할 수 있는 에러 타입
#[derive(Error, Debug)]
pub enum ConvertError {
    /// 입력 폴더가 존재하지 않음
    #[error("입력 폴더를 찾을 수 없습니다: {path}")]
    SourceNotFound { path: PathBuf },

    /// 입력이 폴더가 아님
    #[error("입력 경로가 폴더가 아닙니다: {path}")]
    NotADirectory { path: PathBuf },

    /// 출력 파일이 이미 존재 (Error 모드에서)
    #[error("출력 파일이 이미 존재합니다: {path}")]
    OutputExists { path: PathBuf },

    /// 입력 폴더 또는 CSV 파일 열기 실패
    #[error("파일을 열 수 없습니다 ({file}): {reason}")]
    FileOpenError { file: PathBuf, reason: String },

    /// CSV 구문 오류 또는 UTF-8이 아닌 내용
    #[error("CSV 읽기 실패 ({file}): {reason}")]
    CsvError { file: PathBuf, reason: String },

    /// 첫 행(헤더)이 없는 빈 파일
    #[error("헤더 행이 없습니다 ({file})")]
    MissingHeader { file: PathBuf },

    /// 헤더가 예상 스키마와 다름 (strict 헤더 모드)
    #[error("헤더가 예상과 다릅니다 ({file}): {found:?}")]
    HeaderMismatch { file: PathBuf, found: Vec<String> },

    /// 열 개수 부족
    #[error("열 개수 부족 ({file}:{line}): 14개가 필요하지만 {found}개입니다")]
    ShortRow {
        file: PathBuf,
        line: u64,
        found: usize,
    },

    /// 정수/플래그 값 변환 실패
    #[error("값 변환 실패 ({file}:{line}) {field}={value:?}: {reason}")]
    ParseError {
        file: PathBuf,
        line: u64,
        field: &'static str,
        value: String,
        reason: String,
    },

    /// JSON 직렬화 실패
    #[error("JSON 직렬화 실패 ({file}): {reason}")]
    SerializeError { file: PathBuf, reason: String },

    /// 파일 쓰기 실패
    #[error("파일 쓰기 실패 ({path}): {reason}")]
    WriteError { path: PathBuf, reason: String },

    /// 스레드 풀 초기화 실패
    #[error("스레드 풀 초기화 실패: {reason}")]
    ThreadPoolError { reason: String },

    /// 유효하지 않은 패턴
    #[error("유효하지 않은 패턴: {pattern}")]
    InvalidPattern { pattern: String },

    /// 앞선 파일이 실패해서 변환하지 않음
    #[error("앞선 파일의 오류로 중단되었습니다 ({file})")]
    Aborted { file: PathBuf },
}

impl ConvertError {
    /// 에러의 상위 분류 반환
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConvertError::SourceNotFound { .. }
            | ConvertError::NotADirectory { .. }
            | ConvertError::FileOpenError { .. } => ErrorKind::NotFound,
            ConvertError::CsvError { .. }
            | ConvertError::MissingHeader { .. }
            | ConvertError::HeaderMismatch { .. }
            | ConvertError::ShortRow { .. }
            | ConvertError::ParseError { .. } => ErrorKind::Parse,
            ConvertError::OutputExists { .. }
            | ConvertError::SerializeError { .. }
            | ConvertError::WriteError { .. } => ErrorKind::Io,
            ConvertError::ThreadPoolError { .. } | ConvertError::InvalidPattern { .. } => {
                ErrorKind::Config
            }
            ConvertError::Aborted { .. } => ErrorKind::Aborted,
        }
    }

    /// 행 단위 에러인지 확인 (skip 모드에서 건너뛸 수 있는 에러)
    pub fn is_row_error(&self) -> bool {
        matches!(
            self,
            ConvertError::ShortRow { .. } | ConvertError::ParseError { .. }
        )
    }
}

/// 변환 결과 타입 별칭
pub type Result<T> = std::result::Result<T, ConvertError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let missing = ConvertError::SourceNotFound {
            path: PathBuf::from("inventory_export"),
        };
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        let parse = ConvertError::ParseError {
            file: PathBuf::from("a.csv"),
            line: 2,
            field: "QuantityOnHand",
            value: String::new(),
            reason: "empty".to_string(),
        };
        assert_eq!(parse.kind(), ErrorKind::Parse);
        assert!(parse.is_row_error());

        let write = ConvertError::WriteError {
            path: PathBuf::from("inventory.jsonl"),
            reason: "disk full".to_string(),
        };
        assert_eq!(write.kind(), ErrorKind::Io);
        assert!(!write.is_row_error());
    }

    #[test]
    fn test_parse_error_display_has_location() {
        let error = ConvertError::ParseError {
            file: PathBuf::from("stock.csv"),
            line: 7,
            field: "DirectShip",
            value: "2".to_string(),
            reason: "0 또는 1이어야 합니다".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("stock.csv:7"));
        assert!(msg.contains("DirectShip"));
        assert!(msg.contains("\"2\""));
    }
}
