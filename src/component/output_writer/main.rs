use crate::component::frame_extractor::{ExtractionResult, Frame};
use crate::component::frame_selector::SelectionMethod;
use crate::tools::{Phase, ProgressSink, ProgressUpdate, ensure_directory_exists};
use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde::Serialize;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 儲存結果摘要
#[derive(Debug)]
pub struct SaveSummary {
    pub saved: usize,
    pub failed: usize,
    pub metadata_path: PathBuf,
}

/// 選取結果的中繼資料，與影格一起寫入輸出資料夾
#[derive(Serialize)]
struct SelectionMetadata {
    method: String,
    parameters: Value,
    total_frames: usize,
    selected_count: usize,
    source: serde_json::Map<String, Value>,
    frames: Vec<FrameRecord>,
}

#[derive(Serialize)]
struct FrameRecord {
    index: usize,
    sharpness_score: f64,
    output_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_video: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_index: Option<usize>,
}

/// 選取影格的輸出寫入器
///
/// 只負責把選出的影格複製到輸出資料夾並寫入中繼資料，
/// 不做任何格式轉換或縮放。
pub struct OutputWriter {
    output_dir: PathBuf,
    output_stem: String,
    shutdown_signal: Arc<AtomicBool>,
}

impl OutputWriter {
    #[must_use]
    pub fn new(output_dir: &Path, output_stem: &str, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            output_stem: output_stem.to_string(),
            shutdown_signal,
        }
    }

    /// 複製選取的影格並寫入 selection_metadata.json
    ///
    /// 個別影格複製失敗只記錄警告，不會中斷整批
    pub fn save(
        &self,
        selected: &[Frame],
        extraction: &ExtractionResult,
        method: SelectionMethod,
        progress: &dyn ProgressSink,
    ) -> Result<SaveSummary> {
        ensure_directory_exists(&self.output_dir)?;

        let total = selected.len();
        let description = "儲存選取影格".to_string();
        let mut saved = 0;
        let mut failed = 0;
        let mut records = Vec::with_capacity(total);

        for (position, frame) in selected.iter().enumerate() {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                bail!("操作已取消");
            }

            let output_name = self.output_name_for(frame);
            let destination = self
                .output_dir
                .join(format!("{output_name}.{}", extension_of(&frame.path)));

            match fs::copy(&frame.path, &destination) {
                Ok(_) => {
                    saved += 1;
                    records.push(FrameRecord {
                        index: frame.index,
                        sharpness_score: frame.sharpness_score,
                        output_name,
                        source_video: frame.source_video.clone(),
                        source_index: frame.source_index,
                    });
                }
                Err(e) => {
                    warn!(
                        "無法複製影格 {} -> {}: {e}",
                        frame.path.display(),
                        destination.display()
                    );
                    failed += 1;
                }
            }

            progress.update(ProgressUpdate {
                phase: Phase::Saving,
                current: position + 1,
                total,
                description: description.clone(),
            });
        }

        let metadata_path = self.write_metadata(extraction, method, records)?;

        info!(
            "儲存完成 - 成功: {saved}, 失敗: {failed}, 中繼資料: {}",
            metadata_path.display()
        );

        Ok(SaveSummary {
            saved,
            failed,
            metadata_path,
        })
    }

    fn output_name_for(&self, frame: &Frame) -> String {
        frame.output_name.clone().unwrap_or_else(|| {
            format!("{}_{:05}", self.output_stem, frame.index)
        })
    }

    fn write_metadata(
        &self,
        extraction: &ExtractionResult,
        method: SelectionMethod,
        records: Vec<FrameRecord>,
    ) -> Result<PathBuf> {
        let metadata = SelectionMetadata {
            method: method.name().to_string(),
            parameters: method_parameters(method),
            total_frames: extraction.frames.len(),
            selected_count: records.len(),
            source: extraction.metadata.clone(),
            frames: records,
        };

        let path = self.output_dir.join("selection_metadata.json");
        let content =
            serde_json::to_string_pretty(&metadata).context("無法序列化選取中繼資料")?;
        fs::write(&path, content)
            .with_context(|| format!("無法寫入中繼資料: {}", path.display()))?;

        Ok(path)
    }
}

fn method_parameters(method: SelectionMethod) -> Value {
    match method {
        SelectionMethod::BestN { n, min_buffer } => json!({ "n": n, "min_buffer": min_buffer }),
        SelectionMethod::Batched { batch_count } => json!({ "batch_count": batch_count }),
        SelectionMethod::OutlierRemoval {
            factor,
            window_size,
        } => json!({ "factor": factor, "window_size": window_size }),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or_else(|| "jpg".to_string(), str::to_lowercase)
}
