use anyhow::{Context, Result, bail};
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// ffmpeg -progress 輸出的影格計數行，例如 "frame=123"
static REGEX_PROGRESS_FRAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^frame=\s*(\d+)\s*$").expect("Invalid regex"));

/// 使用 ffmpeg 以固定取樣率擷取影格
///
/// 影格輸出為 `frame_%05d.jpg`，檔名順序即時間順序。
/// `on_progress` 會在解析到 ffmpeg 進度行時收到目前完成的影格數。
pub(super) fn extract_video_frames(
    video_path: &Path,
    fps: u32,
    frame_dir: &Path,
    on_progress: &dyn Fn(usize),
    shutdown_signal: &AtomicBool,
) -> Result<Vec<PathBuf>> {
    let output_pattern = frame_dir.join("frame_%05d.jpg");

    debug!(
        "擷取影格: {} (fps={fps}) -> {}",
        video_path.display(),
        frame_dir.display()
    );

    let mut command = Command::new("ffmpeg");
    command
        .args(["-hide_banner", "-loglevel", "error", "-i"])
        .arg(video_path)
        .args([
            "-vf",
            &format!("fps={fps}"),
            "-qscale:v",
            "2",
            "-progress",
            "pipe:1",
            "-y",
        ])
        .arg(&output_pattern)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .with_context(|| format!("無法執行 ffmpeg 擷取影格: {}", video_path.display()))?;

    // -progress 會持續輸出 key=value 行，從 frame= 行取得完成數量
    let mut cancelled = false;
    if let Some(stdout) = child.stdout.take() {
        let reader = BufReader::new(stdout);
        for line in reader.lines().map_while(Result::ok) {
            if shutdown_signal.load(Ordering::SeqCst) {
                cancelled = true;
                let _ = child.kill();
                break;
            }

            if let Some(done) = parse_progress_frame(&line) {
                on_progress(done);
            }
        }
    }

    let status = child.wait().with_context(|| "無法等待 ffmpeg 結束")?;

    if cancelled {
        warn!("影格擷取已中斷: {}", video_path.display());
        bail!("操作已取消");
    }

    if !status.success() {
        let error_msg = child
            .stderr
            .take()
            .map(|s| {
                BufReader::new(s)
                    .lines()
                    .map_while(Result::ok)
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_else(|| "未知錯誤".to_string());
        bail!("ffmpeg 擷取影格失敗: {}", error_msg.trim());
    }

    collect_extracted_frames(frame_dir, video_path)
}

/// 解析 ffmpeg -progress 的 frame= 行
fn parse_progress_frame(line: &str) -> Option<usize> {
    REGEX_PROGRESS_FRAME
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<usize>().ok())
}

/// 收集擷取出的影格檔案（依檔名排序 = 時間順序）
fn collect_extracted_frames(frame_dir: &Path, video_path: &Path) -> Result<Vec<PathBuf>> {
    let mut frames: Vec<PathBuf> = fs::read_dir(frame_dir)
        .with_context(|| format!("無法讀取影格目錄: {}", frame_dir.display()))?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("frame_") && n.ends_with(".jpg"))
        })
        .collect();

    frames.sort();

    if frames.is_empty() {
        bail!("未擷取出任何影格: {}", video_path.display());
    }

    Ok(frames)
}
