//! CSV 파일 처리 모듈
//!
//! 개별 CSV 파일의 읽기, 헤더 처리, 행 변환을 담당합니다.

use csv::{ReaderBuilder, StringRecord};
use memmap2::Mmap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::cli::{ErrorPolicy, HeaderMode};
use crate::error::{ConvertError, Result};
use crate::record::{transform, FieldError, RecordDefaults, SourceRecord, FIELD_NAMES};

/// 파일 처리 결과
#[derive(Debug)]
pub struct FileResult {
    /// 처리된 파일 경로
    pub path: PathBuf,
    /// 변환된 JSON 라인 (파일 내 행 순서)
    pub lines: Vec<String>,
    /// 건너뛴 행의 에러 (skip 정책에서만 채워짐)
    pub skipped: Vec<ConvertError>,
    /// 읽은 데이터 행 수 (헤더 제외)
    pub rows: usize,
    /// 변환에 성공한 레코드 수
    pub records: usize,
    /// 원본 파일 크기
    pub file_size: u64,
}

impl FileResult {
    fn new(path: &Path, file_size: u64) -> Self {
        Self {
            path: path.to_path_buf(),
            lines: Vec::new(),
            skipped: Vec::new(),
            rows: 0,
            records: 0,
            file_size,
        }
    }

    /// 출력될 바이트 수 (줄바꿈 포함)
    pub fn output_bytes(&self) -> u64 {
        self.lines.iter().map(|l| l.len() as u64 + 1).sum()
    }
}

/// 병렬 변환 중단 신호
///
/// 파일 순서상 가장 앞선 실패 위치를 기록하며, 그보다 뒤에 있는 파일만 멈춥니다.
#[derive(Debug)]
pub struct AbortSignal {
    first_failed: AtomicUsize,
}

impl AbortSignal {
    pub fn new() -> Self {
        Self {
            first_failed: AtomicUsize::new(usize::MAX),
        }
    }

    /// `index`번째 파일의 실패 기록
    pub fn fail(&self, index: usize) {
        self.first_failed.fetch_min(index, Ordering::SeqCst);
    }

    /// `index`번째 파일이 처리를 멈춰야 하는지 확인
    pub fn is_aborted(&self, index: usize) -> bool {
        self.first_failed.load(Ordering::Relaxed) < index
    }

    /// 실패가 기록되었는지 확인
    pub fn is_set(&self) -> bool {
        self.first_failed.load(Ordering::Relaxed) != usize::MAX
    }
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// CSV 처리 옵션
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// 헤더 행 처리 방식
    pub header_mode: HeaderMode,
    /// 잘못된 행 처리 정책
    pub error_policy: ErrorPolicy,
    /// 레코드에 주입할 설정 값
    pub defaults: RecordDefaults,
    /// 변환 가능 여부만 검사 (라인을 보관하지 않음)
    pub validate_only: bool,
    /// 대용량 파일 임계값 (이상이면 메모리 매핑 사용)
    pub mmap_threshold: u64,
}

impl ProcessOptions {
    /// 기본 옵션 생성
    pub fn new() -> Self {
        Self {
            mmap_threshold: 10 * 1024 * 1024, // 10MB
            ..Default::default()
        }
    }

    /// 헤더 처리 방식 설정
    pub fn with_header_mode(mut self, header_mode: HeaderMode) -> Self {
        self.header_mode = header_mode;
        self
    }

    /// 오류 정책 설정
    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.error_policy = error_policy;
        self
    }

    /// 주입 값 설정
    pub fn with_defaults(mut self, defaults: RecordDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// 유효성 검사 모드 설정
    pub fn with_validate_only(mut self, validate_only: bool) -> Self {
        self.validate_only = validate_only;
        self
    }
}

/// 단일 CSV 파일 처리
///
/// # Arguments
/// * `path` - 처리할 CSV 파일 경로
/// * `options` - 처리 옵션
///
/// # Returns
/// 파일 내 행 순서대로 변환된 결과. Abort 정책에서는 첫 번째 잘못된 행에서 에러를 반환합니다.
pub fn process_file(path: &Path, options: &ProcessOptions) -> Result<FileResult> {
    process_indexed_file(path, options, &AbortSignal::new(), 0)
}

/// 병렬 실행 중 `index`번째 파일 처리
///
/// 앞선 파일이 실패하면 행 단위로 확인하여 `ConvertError::Aborted`로 멈춥니다.
pub fn process_indexed_file(
    path: &Path,
    options: &ProcessOptions,
    signal: &AbortSignal,
    index: usize,
) -> Result<FileResult> {
    let aborted = || signal.is_aborted(index);
    if aborted() {
        return Err(ConvertError::Aborted {
            file: path.to_path_buf(),
        });
    }

    let file = File::open(path).map_err(|e| ConvertError::FileOpenError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let file_size = file.metadata().map(|m| m.len()).unwrap_or(0);

    if file_size >= options.mmap_threshold && file_size > 0 {
        // 대용량 파일: 메모리 매핑 사용
        let mmap = unsafe {
            Mmap::map(&file).map_err(|e| ConvertError::FileOpenError {
                file: path.to_path_buf(),
                reason: format!("메모리 매핑 실패: {}", e),
            })?
        };
        process_reader(path, &mmap[..], file_size, options, &aborted)
    } else {
        // 일반 파일: 버퍼 리더 사용
        process_reader(path, BufReader::new(file), file_size, options, &aborted)
    }
}

/// 임의의 리더에서 CSV를 읽어 변환
fn process_reader<R: Read>(
    path: &Path,
    reader: R,
    file_size: u64,
    options: &ProcessOptions,
    aborted: &dyn Fn() -> bool,
) -> Result<FileResult> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    // 빈 줄만 있는 파일도 헤더가 없는 것으로 본다
    let headers = csv_reader.headers().map_err(|e| csv_error(path, e))?;
    if headers.is_empty() {
        return Err(ConvertError::MissingHeader {
            file: path.to_path_buf(),
        });
    }
    if options.header_mode == HeaderMode::Strict {
        check_header(path, headers)?;
    }

    let mut result = FileResult::new(path, file_size);

    for row in csv_reader.records() {
        if aborted() {
            return Err(ConvertError::Aborted {
                file: path.to_path_buf(),
            });
        }

        let record = row.map_err(|e| csv_error(path, e))?;
        result.rows += 1;

        match convert_row(path, &record, &options.defaults) {
            Ok(line) => {
                result.records += 1;
                if !options.validate_only {
                    result.lines.push(line);
                }
            }
            Err(e) if e.is_row_error() && options.error_policy == ErrorPolicy::Skip => {
                result.skipped.push(e);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(result)
}

/// 헤더 행이 예상 열 이름과 일치하는지 검사
fn check_header(path: &Path, headers: &StringRecord) -> Result<()> {
    let found: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();

    if found.iter().map(String::as_str).eq(FIELD_NAMES.iter().copied()) {
        Ok(())
    } else {
        Err(ConvertError::HeaderMismatch {
            file: path.to_path_buf(),
            found,
        })
    }
}

/// CSV 한 행을 JSON 라인으로 변환
fn convert_row(path: &Path, record: &StringRecord, defaults: &RecordDefaults) -> Result<String> {
    let line = record.position().map(|p| p.line()).unwrap_or(0);

    let target = SourceRecord::from_record(record)
        .and_then(|source| transform(&source, defaults))
        .map_err(|e| field_error(path, line, e))?;

    serde_json::to_string(&target).map_err(|e| ConvertError::SerializeError {
        file: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn field_error(path: &Path, line: u64, error: FieldError) -> ConvertError {
    match error {
        FieldError::Short { found } => ConvertError::ShortRow {
            file: path.to_path_buf(),
            line,
            found,
        },
        FieldError::Invalid {
            field,
            value,
            reason,
        } => ConvertError::ParseError {
            file: path.to_path_buf(),
            line,
            field,
            value,
            reason,
        },
    }
}

fn csv_error(path: &Path, error: csv::Error) -> ConvertError {
    ConvertError::CsvError {
        file: path.to_path_buf(),
        reason: error.to_string(),
    }
}
