//! 변환 실행 모듈
//!
//! 입력 폴더 탐색, 파일 단위 병렬 변환, JSONL 파일 쓰기를 담당합니다.
//!
//! 변환된 줄은 파일 순서대로 출력 폴더의 임시 파일에 바로 기록되고,
//! 모든 파일이 성공했을 때만 출력 경로로 옮겨집니다.

use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::cli::{ErrorPolicy, FileOrder, HeaderMode, WriteMode};
use crate::error::{ConvertError, Result};
use crate::pattern::PatternMatcher;
use crate::processor::{process_indexed_file, AbortSignal, FileResult, ProcessOptions};
use crate::record::RecordDefaults;
use crate::stats::Statistics;

/// 전체 변환 옵션
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// CSV 파일들이 있는 입력 폴더
    pub input: PathBuf,
    /// JSONL 출력 파일
    pub output: PathBuf,
    /// 출력 파일 모드
    pub write_mode: WriteMode,
    /// 입력 파일 처리 순서
    pub order: FileOrder,
    /// 추가 파일 이름 패턴
    pub pattern: Option<String>,
    /// 파일 단위 처리 옵션
    pub process: ProcessOptions,
}

impl ConvertOptions {
    /// 기본 옵션 생성
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            write_mode: WriteMode::default(),
            order: FileOrder::default(),
            pattern: None,
            process: ProcessOptions::new(),
        }
    }

    /// 출력 파일 모드 설정
    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    /// 파일 처리 순서 설정
    pub fn with_order(mut self, order: FileOrder) -> Self {
        self.order = order;
        self
    }

    /// 파일 이름 패턴 설정
    pub fn with_pattern(mut self, pattern: Option<String>) -> Self {
        self.pattern = pattern;
        self
    }

    /// 헤더 처리 방식 설정
    pub fn with_header_mode(mut self, header_mode: HeaderMode) -> Self {
        self.process = self.process.with_header_mode(header_mode);
        self
    }

    /// 오류 정책 설정
    pub fn with_error_policy(mut self, error_policy: ErrorPolicy) -> Self {
        self.process = self.process.with_error_policy(error_policy);
        self
    }

    /// 주입 값 설정
    pub fn with_defaults(mut self, defaults: RecordDefaults) -> Self {
        self.process = self.process.with_defaults(defaults);
        self
    }

    /// 유효성 검사 모드 설정
    pub fn with_validate_only(mut self, validate_only: bool) -> Self {
        self.process = self.process.with_validate_only(validate_only);
        self
    }
}

/// 기본 설정으로 입력 폴더의 CSV 파일들을 하나의 JSONL 파일로 변환
///
/// # Arguments
/// * `source_dir` - CSV 파일들이 있는 폴더
/// * `output_path` - 생성될 JSONL 파일 (기존 파일은 덮어씀)
///
/// # Returns
/// 처리 통계. 첫 번째 잘못된 행에서 전체 실행이 중단되며 출력 파일은 건드리지 않습니다.
pub fn convert(source_dir: impl AsRef<Path>, output_path: impl AsRef<Path>) -> Result<Statistics> {
    convert_with_options(&ConvertOptions::new(source_dir, output_path))
}

/// 옵션을 지정하여 변환 실행
pub fn convert_with_options(options: &ConvertOptions) -> Result<Statistics> {
    let files = scan_sources(options)?;
    check_output_mode(options)?;

    let stats = Statistics::new(files.len());

    if options.process.validate_only {
        convert_files(&files, &options.process, &stats, |_, _| {}, |_| Ok(()))?;
    } else {
        let mut writer = JsonlWriter::create(&options.output, options.write_mode)?;
        convert_files(
            &files,
            &options.process,
            &stats,
            |_, _| {},
            |file| writer.write_file(file, &stats),
        )?;
        writer.finish()?;
    }

    Ok(stats)
}

/// 입력 폴더를 확인하고 변환 대상 CSV 파일 목록 반환
pub fn scan_sources(options: &ConvertOptions) -> Result<Vec<PathBuf>> {
    validate_source(&options.input)?;
    let matcher = PatternMatcher::new(options.pattern.clone())?;
    collect_csv_files(&options.input, &matcher, options.order)
}

/// 입력 경로 유효성 검사
pub fn validate_source(input: &Path) -> Result<()> {
    if !input.exists() {
        return Err(ConvertError::SourceNotFound {
            path: input.to_path_buf(),
        });
    }

    if !input.is_dir() {
        return Err(ConvertError::NotADirectory {
            path: input.to_path_buf(),
        });
    }

    Ok(())
}

/// CSV 파일 수집
///
/// 하위 폴더는 탐색하지 않습니다. `FileOrder::Listing`이면 운영체제의 목록 순서를 그대로 따릅니다.
pub fn collect_csv_files(
    input: &Path,
    matcher: &PatternMatcher,
    order: FileOrder,
) -> Result<Vec<PathBuf>> {
    let mut walker = WalkDir::new(input).min_depth(1).max_depth(1);
    if order == FileOrder::Name {
        walker = walker.sort_by_file_name();
    }

    let mut csv_files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| ConvertError::FileOpenError {
            file: input.to_path_buf(),
            reason: e.to_string(),
        })?;

        let selected = entry
            .file_name()
            .to_str()
            .map(|name| matcher.matches(name))
            .unwrap_or(false);

        if selected && entry.path().is_file() {
            csv_files.push(entry.into_path());
        }
    }

    Ok(csv_files)
}

/// 출력 모드 확인
pub fn check_output_mode(options: &ConvertOptions) -> Result<()> {
    if options.write_mode == WriteMode::Error
        && !options.process.validate_only
        && options.output.exists()
    {
        return Err(ConvertError::OutputExists {
            path: options.output.clone(),
        });
    }
    Ok(())
}

/// 파일 순서대로 결과를 내보내는 대기열
struct Sequencer<W> {
    next: usize,
    pending: BTreeMap<usize, Result<FileResult>>,
    done: Vec<FileResult>,
    error: Option<ConvertError>,
    sink: W,
}

impl<W> Sequencer<W>
where
    W: FnMut(&FileResult) -> Result<()>,
{
    fn new(sink: W) -> Self {
        Self {
            next: 0,
            pending: BTreeMap::new(),
            done: Vec::new(),
            error: None,
            sink,
        }
    }

    /// 결과를 넣고, 순서가 된 결과들을 sink로 흘려보냄
    ///
    /// 첫 번째 에러 이후의 결과는 버립니다.
    fn push(
        &mut self,
        index: usize,
        result: Result<FileResult>,
        signal: &AbortSignal,
        stats: &Statistics,
    ) {
        self.pending.insert(index, result);

        while let Some(result) = self.pending.remove(&self.next) {
            let current = self.next;
            self.next += 1;

            if self.error.is_some() {
                continue;
            }

            match result {
                Ok(mut file) => match (self.sink)(&file) {
                    Ok(()) => {
                        stats.record_file(&file);
                        // 이미 기록된 줄은 더 들고 있지 않음
                        file.lines = Vec::new();
                        self.done.push(file);
                    }
                    Err(e) => {
                        stats.increment_error();
                        signal.fail(current);
                        self.error = Some(e);
                    }
                },
                Err(e) => self.error = Some(e),
            }
        }
    }

    fn finish(self) -> Result<Vec<FileResult>> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.done),
        }
    }
}

/// 파일 단위 병렬 변환
///
/// 각 파일의 결과는 끝나는 즉시 파일 순서대로 `sink`에 전달됩니다.
/// 어떤 파일이 실패하면 그 뒤의 파일들은 처리를 멈추고, 순서상 첫 번째 에러를 반환합니다.
/// `on_file`은 파일 하나의 처리가 끝날 때마다 (임의의 스레드에서) 호출됩니다.
///
/// 반환되는 `FileResult`의 `lines`는 비어 있습니다.
pub fn convert_files<F, W>(
    files: &[PathBuf],
    options: &ProcessOptions,
    stats: &Statistics,
    on_file: F,
    sink: W,
) -> Result<Vec<FileResult>>
where
    F: Fn(&Path, &Result<FileResult>) + Sync,
    W: FnMut(&FileResult) -> Result<()> + Send,
{
    let signal = AbortSignal::new();
    let sequencer = Mutex::new(Sequencer::new(sink));

    files.par_iter().enumerate().for_each(|(index, path)| {
        let result = process_indexed_file(path, options, &signal, index);
        match &result {
            Ok(_) | Err(ConvertError::Aborted { .. }) => {}
            Err(_) => {
                stats.increment_error();
                signal.fail(index);
            }
        }
        on_file(path, &result);

        sequencer
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(index, result, &signal, stats);
    });

    sequencer.into_inner().unwrap_or_else(|e| e.into_inner()).finish()
}

/// JSONL 출력 작성기
///
/// 출력 폴더에 임시 파일을 만들어 쓰고, `finish`에서 출력 모드에 맞게 출력 경로로 옮깁니다.
/// `finish` 없이 버려지면 임시 파일은 삭제되고 출력 파일은 그대로 남습니다.
pub struct JsonlWriter {
    output: PathBuf,
    mode: WriteMode,
    writer: BufWriter<NamedTempFile>,
}

impl JsonlWriter {
    /// 출력 경로와 같은 폴더에 임시 파일 생성
    pub fn create(output: &Path, mode: WriteMode) -> Result<Self> {
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp = NamedTempFile::new_in(dir).map_err(|e| write_error(output, e))?;

        Ok(Self {
            output: output.to_path_buf(),
            mode,
            writer: BufWriter::new(temp),
        })
    }

    /// 파일 하나의 변환 결과 기록
    pub fn write_file(&mut self, file: &FileResult, stats: &Statistics) -> Result<()> {
        for line in &file.lines {
            writeln!(self.writer, "{}", line).map_err(|e| write_error(&self.output, e))?;
        }
        stats.add_records_written(file.lines.len());
        stats.add_bytes_written(file.output_bytes());
        Ok(())
    }

    /// 임시 파일을 출력 경로로 반영
    pub fn finish(self) -> Result<()> {
        let JsonlWriter {
            output,
            mode,
            writer,
        } = self;

        // 버퍼 플러시
        let temp = writer
            .into_inner()
            .map_err(|e| write_error(&output, e.into_error()))?;

        match mode {
            WriteMode::Overwrite => temp
                .persist(&output)
                .map(|_| ())
                .map_err(|e| write_error(&output, e.error)),
            WriteMode::Error => match temp.persist_noclobber(&output) {
                Ok(_) => Ok(()),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    Err(ConvertError::OutputExists { path: output })
                }
                Err(e) => Err(write_error(&output, e.error)),
            },
            WriteMode::Append => {
                let mut source = temp.reopen().map_err(|e| write_error(&output, e))?;
                let mut target = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&output)
                    .map_err(|e| write_error(&output, e))?;
                io::copy(&mut source, &mut target).map_err(|e| write_error(&output, e))?;
                target.flush().map_err(|e| write_error(&output, e))
            }
        }
    }
}

fn write_error(path: &Path, e: io::Error) -> ConvertError {
    ConvertError::WriteError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    }
}
