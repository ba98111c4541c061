//! 통계 및 유틸리티 모듈
//!
//! 처리 통계 수집 및 포맷팅을 담당합니다.

use colored::Colorize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::processor::FileResult;

/// 처리 통계 구조체
///
/// 파일 단위 병렬 처리 중에 갱신되므로 카운터는 모두 원자적입니다.
#[derive(Debug, Default)]
pub struct Statistics {
    /// 총 파일 수
    pub total_files: usize,
    /// 변환에 성공한 파일 수
    pub files_converted: AtomicUsize,
    /// 실패한 파일 수
    pub error_count: AtomicUsize,
    /// 읽은 데이터 행 수
    pub rows_read: AtomicUsize,
    /// 변환된 레코드 수
    pub records_converted: AtomicUsize,
    /// 건너뛴 행 수
    pub rows_skipped: AtomicUsize,
    /// 출력 파일에 쓴 레코드 수
    pub records_written: AtomicUsize,
    /// 읽은 총 바이트
    pub total_bytes_read: AtomicU64,
    /// 쓴 총 바이트
    pub total_bytes_written: AtomicU64,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// 파일 하나의 처리 결과 반영
    pub fn record_file(&self, file: &FileResult) {
        self.files_converted.fetch_add(1, Ordering::Relaxed);
        self.rows_read.fetch_add(file.rows, Ordering::Relaxed);
        self.records_converted
            .fetch_add(file.records, Ordering::Relaxed);
        self.rows_skipped
            .fetch_add(file.skipped.len(), Ordering::Relaxed);
        self.total_bytes_read
            .fetch_add(file.file_size, Ordering::Relaxed);
    }

    /// 에러 카운트 증가
    pub fn increment_error(&self) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
    }

    /// 쓴 레코드 수 추가
    pub fn add_records_written(&self, records: usize) {
        self.records_written.fetch_add(records, Ordering::Relaxed);
    }

    /// 쓴 바이트 추가
    pub fn add_bytes_written(&self, bytes: u64) {
        self.total_bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn get_files_converted(&self) -> usize {
        self.files_converted.load(Ordering::Relaxed)
    }

    pub fn get_error_count(&self) -> usize {
        self.error_count.load(Ordering::Relaxed)
    }

    pub fn get_rows_read(&self) -> usize {
        self.rows_read.load(Ordering::Relaxed)
    }

    pub fn get_records_converted(&self) -> usize {
        self.records_converted.load(Ordering::Relaxed)
    }

    pub fn get_rows_skipped(&self) -> usize {
        self.rows_skipped.load(Ordering::Relaxed)
    }

    pub fn get_records_written(&self) -> usize {
        self.records_written.load(Ordering::Relaxed)
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 변환 통계 요약 출력
    pub fn print_summary(&self) {
        let skipped = self.get_rows_skipped();
        let bytes_read = self.total_bytes_read.load(Ordering::Relaxed);
        let bytes_written = self.total_bytes_written.load(Ordering::Relaxed);

        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 처리 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 전체 파일:    {}",
            "📁".bright_cyan(),
            self.total_files
        );
        println!(
            "  {} 읽은 행:      {}",
            "📋".bright_white(),
            self.get_rows_read()
        );
        println!(
            "  {} 저장 레코드:  {}",
            "✅".bright_green(),
            self.get_records_written().to_string().green()
        );

        if skipped > 0 {
            println!(
                "  {} 건너뛴 행:    {}",
                "⚠️".bright_yellow(),
                skipped.to_string().yellow()
            );
        }

        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(bytes_read)
        );
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(bytes_written)
        );
        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }

    /// 유효성 검사 통계 요약 출력
    pub fn print_validation_summary(&self) {
        let rows = self.get_rows_read();
        let valid = self.get_records_converted();
        let invalid = self.get_rows_skipped();

        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 🔍 유효성 검사 결과".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!(
            "  {} 전체 파일:    {}",
            "📁".bright_cyan(),
            self.total_files
        );
        println!(
            "  {} 유효 행:      {}",
            "✅".bright_green(),
            valid.to_string().green()
        );

        if invalid > 0 {
            println!(
                "  {} 무효 행:      {}",
                "❌".bright_red(),
                invalid.to_string().red()
            );
        } else {
            println!("  {} 무효 행:      {}", "✅".bright_green(), "0".green());
        }

        if rows > 0 {
            let valid_rate = (valid as f64 / rows as f64) * 100.0;
            println!("  {} 유효율:       {:.1}%", "📈".bright_white(), valid_rate);
        }

        println!(
            "  {} 검사 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(self.elapsed())
        );

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use inventory_jsonl::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        format!("{}시간 {}분", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}분 {}초", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000초");
        assert_eq!(format_duration(Duration::from_secs(65)), "1분 5초");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1시간 1분");
    }

    #[test]
    fn test_record_file() {
        let stats = Statistics::new(2);
        let file = FileResult {
            path: PathBuf::from("a.csv"),
            lines: vec!["{}".to_string()],
            skipped: Vec::new(),
            rows: 3,
            records: 1,
            file_size: 2048,
        };

        stats.record_file(&file);
        stats.increment_error();
        stats.add_records_written(file.lines.len());
        stats.add_bytes_written(file.output_bytes());

        assert_eq!(stats.get_files_converted(), 1);
        assert_eq!(stats.get_error_count(), 1);
        assert_eq!(stats.get_rows_read(), 3);
        assert_eq!(stats.get_records_converted(), 1);
        assert_eq!(stats.get_records_written(), 1);
        assert_eq!(stats.total_bytes_read.load(Ordering::Relaxed), 2048);
        assert_eq!(stats.total_bytes_written.load(Ordering::Relaxed), 3);
    }
}
