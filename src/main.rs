//! inventory-jsonl - INVENTORY CSV TO JSONL CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use inventory_jsonl::{
    cli::{Args, ErrorPolicy},
    converter::{check_output_mode, convert_files, scan_sources, ConvertOptions, JsonlWriter},
    error::{ConvertError, Result as ConvertResult},
    processor::FileResult,
    stats::Statistics,
};

fn main() -> Result<()> {
    let args = Args::parse();

    // 스레드 풀 설정
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| ConvertError::ThreadPoolError {
                reason: e.to_string(),
            })?;
    }

    let options = args.to_options();

    // 헤더 출력
    print_header(&args);

    // CSV 파일 수집
    let csv_files = scan_sources(&options)?;

    if csv_files.is_empty() {
        println!("{}", "⚠️ 처리할 CSV 파일이 없습니다.".yellow());
        if !args.dry_run && !args.validate_only {
            // 빈 입력도 정상 실행이므로 빈 출력 파일을 만든다
            check_output_mode(&options)?;
            JsonlWriter::create(&options.output, options.write_mode)?.finish()?;
        }
        return Ok(());
    }

    println!(
        "  {} 발견된 파일 수: {}",
        "📋".bright_white(),
        csv_files.len().to_string().bright_green()
    );

    // 드라이런 모드
    if args.dry_run {
        print_dry_run(&csv_files);
        return Ok(());
    }

    let stats = Statistics::new(csv_files.len());

    if args.validate_only {
        run_validation_mode(&args, &options, &csv_files, &stats)
    } else {
        run_conversion_mode(&args, &options, &csv_files, &stats)
    }
}

/// 헤더 출력
fn print_header(args: &Args) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!(
        "{}",
        " 🚀 INVENTORY CSV TO JSONL CONVERTER".bright_white().bold()
    );
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 입력 폴더: {:?}", "📂".bright_cyan(), args.input);

    if !args.validate_only {
        println!("  {} 출력 파일: {:?}", "📄".bright_green(), args.output);
        println!("  {} 모드: {}", "⚙️".bright_yellow(), args.mode);
    }

    println!(
        "  {} 테넌트/국가: {} / {}",
        "🏷️".bright_white(),
        args.tenant_id,
        args.country_code
    );
    println!("  {} 오류 정책: {}", "🛑".bright_red(), args.on_error);

    if let Some(ref pattern) = args.pattern {
        println!("  {} 패턴 필터: {}", "🔍".bright_magenta(), pattern);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 변환 없음)".yellow()
        );
    }

    if args.validate_only {
        println!("  {} {}", "🔍".bright_cyan(), "유효성 검사 모드".cyan());
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("\n{}", "📁 파일 검색 중...".bright_cyan());
}

/// 드라이런 출력
fn print_dry_run(csv_files: &[PathBuf]) {
    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    for (i, path) in csv_files.iter().enumerate() {
        println!("  {}. {:?}", i + 1, path.file_name().unwrap_or_default());
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        csv_files.len().to_string().bright_green()
    );
}

/// 유효성 검사 모드 실행
fn run_validation_mode(
    args: &Args,
    options: &ConvertOptions,
    csv_files: &[PathBuf],
    stats: &Statistics,
) -> Result<()> {
    println!("\n{}", "🔍 유효성 검사 중...".bright_cyan());

    let results = convert_with_progress(args, options, csv_files, stats, |_| Ok(()))?;

    let skipped = collect_skipped(&results);
    print_errors(&skipped, args.verbose);

    // 로그 파일 작성
    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &skipped)?;
    }

    stats.print_validation_summary();

    if skipped.is_empty() {
        println!("\n{} 모든 행을 변환할 수 있습니다!\n", "✅".bright_green());
    } else {
        println!(
            "\n{} {} 개의 행에 오류가 있습니다.\n",
            "⚠️".bright_yellow(),
            skipped.len().to_string().red()
        );
    }

    Ok(())
}

/// 변환 모드 실행
fn run_conversion_mode(
    args: &Args,
    options: &ConvertOptions,
    csv_files: &[PathBuf],
    stats: &Statistics,
) -> Result<()> {
    // 출력 파일 모드 확인
    check_output_mode(options)?;

    // 변환된 줄은 임시 파일에 바로 기록된다
    let mut writer = JsonlWriter::create(&options.output, options.write_mode)
        .with_context(|| format!("출력 파일을 만들 수 없습니다: {:?}", options.output))?;

    println!("\n{}", "⚡ 병렬 처리 중...".bright_cyan());

    let results = convert_with_progress(args, options, csv_files, stats, |file| {
        writer.write_file(file, stats)
    })?;

    println!("\n{}", "💾 JSONL 파일 저장 중...".bright_cyan());

    writer
        .finish()
        .with_context(|| format!("출력 파일 저장 실패: {:?}", options.output))?;

    let skipped = collect_skipped(&results);
    print_errors(&skipped, args.verbose);

    // 로그 파일 작성
    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &skipped)?;
    }

    stats.print_summary();

    println!("\n{} 저장 완료: {:?}\n", "✅".bright_green(), options.output);

    Ok(())
}

/// 진행률 바와 함께 파일 변환
///
/// Abort 정책에서 실패하면 에러 로그를 남긴 뒤 에러를 그대로 돌려준다.
fn convert_with_progress<W>(
    args: &Args,
    options: &ConvertOptions,
    csv_files: &[PathBuf],
    stats: &Statistics,
    sink: W,
) -> Result<Vec<FileResult>>
where
    W: FnMut(&FileResult) -> ConvertResult<()> + Send,
{
    let pb = create_progress_bar(csv_files.len());

    let result = convert_files(
        csv_files,
        &options.process,
        stats,
        |path, result| {
            pb.inc(1);
            if args.verbose {
                if let Some(line) = file_status_line(path, result) {
                    pb.println(line);
                }
            }
        },
        sink,
    );

    match result {
        Ok(results) => {
            pb.finish_with_message("완료!");

            if args.verbose {
                for file in &results {
                    println!(
                        "  {} {:?}: {} 레코드",
                        "•".bright_blue(),
                        file.path.file_name().unwrap_or_default(),
                        file.records
                    );
                }
            }

            Ok(results)
        }
        Err(e) => {
            pb.abandon_with_message("중단됨");

            if let Some(ref log_path) = args.log {
                write_error_log(log_path, &[&e])?;
            }

            if args.on_error == ErrorPolicy::Abort && e.is_row_error() {
                println!(
                    "\n{} {}",
                    "💡".bright_yellow(),
                    "--on-error skip 옵션으로 잘못된 행을 건너뛸 수 있습니다.".dimmed()
                );
            }

            Err(e.into())
        }
    }
}

/// 파일 하나의 처리 결과 줄 (중단된 파일은 표시하지 않음)
fn file_status_line(path: &Path, result: &ConvertResult<FileResult>) -> Option<String> {
    let name = path.file_name().unwrap_or_default();
    match result {
        Ok(_) => Some(format!("  {} {:?}", "✓".green(), name)),
        Err(ConvertError::Aborted { .. }) => None,
        Err(e) => Some(format!("  {} {:?}: {}", "✗".red(), name, e)),
    }
}

/// 모든 파일의 건너뛴 행 에러 수집 (파일 순서 × 행 순서)
fn collect_skipped(results: &[FileResult]) -> Vec<&ConvertError> {
    results.iter().flat_map(|r| r.skipped.iter()).collect()
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb
}

/// 에러 목록 출력
fn print_errors(errors: &[&ConvertError], verbose: bool) {
    if errors.is_empty() {
        return;
    }

    println!("\n{}", "❌ 건너뛴 행:".bright_red());
    for error in errors {
        if verbose {
            println!("  {} {}", "•".red(), error.to_string().dimmed());
        }
    }
    if !verbose {
        println!(
            "  {} {} 개 (자세한 내용은 --verbose 또는 --log)",
            "•".red(),
            errors.len()
        );
    }
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &Path, errors: &[&ConvertError]) -> Result<()> {
    let mut log_file = File::create(log_path)
        .with_context(|| format!("에러 로그 파일을 만들 수 없습니다: {:?}", log_path))?;

    writeln!(log_file, "inventory-jsonl 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", unix_now())?;
    writeln!(log_file, "총 에러 수: {}", errors.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for error in errors {
        writeln!(log_file, "\n[{:?}] {}", error.kind(), error)?;
    }

    println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 현재 시간 문자열 반환
fn unix_now() -> String {
    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_status_line() {
        colored::control::set_override(false);
        let path = Path::new("inventory_export/dxb.csv");

        let failed: ConvertResult<FileResult> = Err(ConvertError::ParseError {
            file: path.to_path_buf(),
            line: 2,
            field: "QuantityOnHand",
            value: String::new(),
            reason: "empty".to_string(),
        });
        let line = file_status_line(path, &failed).unwrap();
        assert!(line.contains("✗"));
        assert!(line.contains("dxb.csv:2"));

        let aborted: ConvertResult<FileResult> = Err(ConvertError::Aborted {
            file: path.to_path_buf(),
        });
        assert!(file_status_line(path, &aborted).is_none());
    }

    #[test]
    fn test_file_status_line_success() {
        colored::control::set_override(false);
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("auh.csv");
        std::fs::write(&path, "header\nP,U,S,1,2,,,,L1,Loc,1,0,1,0\n").unwrap();

        let result = inventory_jsonl::process_file(&path, &inventory_jsonl::ProcessOptions::new());
        let line = file_status_line(&path, &result).unwrap();
        assert!(line.contains("✓"));
        assert!(line.contains("auh.csv"));
    }
}
