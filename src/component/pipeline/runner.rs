use crate::component::frame_extractor::{ExtractionResult, FrameExtractor, InputType};
use crate::component::frame_selector::{SelectionMethod, select_frames};
use crate::component::output_writer::OutputWriter;
use crate::component::sharpness_analyzer::SharpnessAnalyzer;
use crate::config::Config;
use crate::tools::{Phase, ProgressSink, ProgressUpdate};
use anyhow::{Context, Result, bail};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 一次完整處理的要求
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub method: SelectionMethod,
}

/// 處理結果摘要
#[derive(Debug)]
pub struct PipelineReport {
    pub input_type: InputType,
    pub total_frames: usize,
    pub selected_count: usize,
    pub saved: usize,
    pub failed: usize,
    pub output_dir: PathBuf,
}

/// 完整流程：擷取 → 計分 → 選取 → 儲存
///
/// 任一階段的不可恢復錯誤會帶著階段名稱直接回報並中止；
/// 階段內的單格失敗則依各元件的策略就地吸收。
/// 無論成敗，影片擷取的暫存目錄都會在結束時清理。
pub fn run_pipeline(
    request: &PipelineRequest,
    config: &Config,
    progress: &dyn ProgressSink,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<PipelineReport> {
    let work_dir = request.output_dir.join(".tmp_frames");

    let result = run_stages(request, &work_dir, config, progress, shutdown_signal);

    if work_dir.exists() && fs::remove_dir_all(&work_dir).is_err() {
        warn!("無法清理暫存目錄: {}", work_dir.display());
    }

    result
}

fn run_stages(
    request: &PipelineRequest,
    work_dir: &Path,
    config: &Config,
    progress: &dyn ProgressSink,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<PipelineReport> {
    let extraction =
        extract_and_score(&request.input_path, work_dir, config, progress, shutdown_signal)?;

    select_and_save(
        &extraction,
        request.method,
        &request.output_dir,
        config,
        progress,
        shutdown_signal,
    )
}

/// 擷取影格並計算銳利度分數
///
/// 互動流程在這一步之後才讓使用者調整選取參數，
/// 所以獨立成可重用的階段函式。
pub fn extract_and_score(
    input_path: &Path,
    work_dir: &Path,
    config: &Config,
    progress: &dyn ProgressSink,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<ExtractionResult> {
    let extractor = FrameExtractor::new(
        config.file_type_table.clone(),
        config.settings.extraction_fps,
        Arc::clone(shutdown_signal),
    );
    let extraction = extractor
        .extract(input_path, work_dir, progress)
        .with_context(|| format!("{} 階段失敗", Phase::Extraction))?;
    ensure_not_cancelled(shutdown_signal)?;

    let analyzer = SharpnessAnalyzer::new(config.settings.worker_count)
        .with_chunk_size(config.settings.chunk_size);
    let scored = analyzer.calculate_sharpness(extraction, progress, shutdown_signal);
    ensure_not_cancelled(shutdown_signal)?;

    Ok(scored)
}

/// 套用選取方法並儲存結果
pub fn select_and_save(
    extraction: &ExtractionResult,
    method: SelectionMethod,
    output_dir: &Path,
    config: &Config,
    progress: &dyn ProgressSink,
    shutdown_signal: &Arc<AtomicBool>,
) -> Result<PipelineReport> {
    let description = "套用選取方法".to_string();
    progress.update(ProgressUpdate {
        phase: Phase::Selection,
        current: 0,
        total: 1,
        description: description.clone(),
    });

    let selected = select_frames(&extraction.frames, method);

    progress.update(ProgressUpdate {
        phase: Phase::Selection,
        current: 1,
        total: 1,
        description,
    });

    info!(
        "選取完成 ({}): {} / {} 格",
        method.name(),
        selected.len(),
        extraction.frames.len()
    );
    ensure_not_cancelled(shutdown_signal)?;

    let writer = OutputWriter::new(
        output_dir,
        &config.settings.output_stem,
        Arc::clone(shutdown_signal),
    );
    let summary = writer
        .save(&selected, extraction, method, progress)
        .with_context(|| format!("{} 階段失敗", Phase::Saving))?;

    Ok(PipelineReport {
        input_type: extraction.input_type,
        total_frames: extraction.frames.len(),
        selected_count: selected.len(),
        saved: summary.saved,
        failed: summary.failed,
        output_dir: output_dir.to_path_buf(),
    })
}

fn ensure_not_cancelled(shutdown_signal: &AtomicBool) -> Result<()> {
    if shutdown_signal.load(Ordering::SeqCst) {
        bail!("操作已取消");
    }
    Ok(())
}
