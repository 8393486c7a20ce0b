use super::frame_data::{ExtractionResult, Frame, InputType};
use super::video::extract_video_frames;
use crate::config::FileTypeTable;
use crate::tools::{
    Phase, ProgressSink, ProgressUpdate, ensure_directory_exists, get_video_info,
    scan_image_files, scan_video_files,
};
use anyhow::{Context, Result, bail};
use log::{info, warn};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 影格擷取器
///
/// 將輸入（單一影片、影片資料夾或影像資料夾）轉換為
/// 依索引排序的影格序列，供後續計分與選取使用。
pub struct FrameExtractor {
    file_type_table: FileTypeTable,
    extraction_fps: u32,
    shutdown_signal: Arc<AtomicBool>,
}

impl FrameExtractor {
    #[must_use]
    pub const fn new(
        file_type_table: FileTypeTable,
        extraction_fps: u32,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            file_type_table,
            extraction_fps,
            shutdown_signal,
        }
    }

    /// 判斷輸入路徑的類型
    ///
    /// 資料夾內同時有影片與影像時，以影片為準
    pub fn detect_input_type(&self, path: &Path) -> Result<InputType> {
        if path.is_file() {
            if self.file_type_table.is_video_file(path) {
                return Ok(InputType::Video);
            }
            bail!("不支援的輸入檔案類型: {}", path.display());
        }

        if path.is_dir() {
            if !scan_video_files(path, &self.file_type_table)?.is_empty() {
                return Ok(InputType::VideoDirectory);
            }
            if !scan_image_files(path, &self.file_type_table)?.is_empty() {
                return Ok(InputType::Directory);
            }
            bail!("資料夾內沒有影片或影像檔案: {}", path.display());
        }

        bail!("路徑不存在: {}", path.display());
    }

    /// 執行擷取，產出依索引排序的影格序列
    ///
    /// `work_dir` 是影片影格的暫存位置，影像資料夾輸入不會使用
    pub fn extract(
        &self,
        input_path: &Path,
        work_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<ExtractionResult> {
        let input_type = self.detect_input_type(input_path)?;
        info!(
            "開始擷取: {} (類型: {})",
            input_path.display(),
            input_type.as_str()
        );

        match input_type {
            InputType::Video => self.extract_single_video(input_path, work_dir, progress),
            InputType::VideoDirectory => {
                self.extract_video_directory(input_path, work_dir, progress)
            }
            InputType::Directory => self.load_image_directory(input_path, progress),
        }
    }

    fn extract_single_video(
        &self,
        video_path: &Path,
        work_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<ExtractionResult> {
        let video_info = get_video_info(video_path)
            .with_context(|| format!("無法讀取影片資訊: {}", video_path.display()))?;
        let estimated_total = video_info.estimated_frame_count(self.extraction_fps);

        ensure_directory_exists(work_dir)?;

        let description = "擷取影片影格".to_string();
        let on_progress = |done: usize| {
            progress.update(ProgressUpdate {
                phase: Phase::Extraction,
                current: done.min(estimated_total),
                total: estimated_total,
                description: description.clone(),
            });
        };

        let frame_paths = extract_video_frames(
            video_path,
            self.extraction_fps,
            work_dir,
            &on_progress,
            &self.shutdown_signal,
        )?;

        progress.update(ProgressUpdate {
            phase: Phase::Extraction,
            current: estimated_total,
            total: estimated_total,
            description: description.clone(),
        });

        let frames: Vec<Frame> = frame_paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| Frame::new(path, index))
            .collect();

        let mut metadata = Map::new();
        metadata.insert(
            "input".to_string(),
            Value::String(video_path.display().to_string()),
        );
        metadata.insert(
            "extraction_fps".to_string(),
            Value::from(self.extraction_fps),
        );
        metadata.insert(
            "duration_seconds".to_string(),
            Value::from(video_info.duration_seconds),
        );
        metadata.insert("total_frames".to_string(), Value::from(frames.len()));

        info!("擷取完成，共 {} 格", frames.len());

        Ok(ExtractionResult {
            frames,
            metadata,
            temp_dir: Some(work_dir.to_path_buf()),
            input_type: InputType::Video,
        })
    }

    fn extract_video_directory(
        &self,
        directory: &Path,
        work_dir: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<ExtractionResult> {
        let videos = scan_video_files(directory, &self.file_type_table)?;

        // 先逐一探測，估出總影格數做進度分母；讀不到資訊的影片跳過
        let mut probed = Vec::with_capacity(videos.len());
        for video in &videos {
            match get_video_info(&video.path) {
                Ok(video_info) => probed.push((video.path.clone(), video_info)),
                Err(e) => warn!("略過無法讀取的影片 {}: {e}", video.path.display()),
            }
        }

        if probed.is_empty() {
            bail!("資料夾內沒有可讀取的影片: {}", directory.display());
        }

        let estimated_total: usize = probed
            .iter()
            .map(|(_, video_info)| video_info.estimated_frame_count(self.extraction_fps))
            .sum();

        let description = "擷取多部影片影格".to_string();
        let mut completed_base: usize = 0;
        let mut frames: Vec<Frame> = Vec::new();
        let mut used_stems: HashSet<String> = HashSet::new();

        for (video_path, video_info) in &probed {
            if self.shutdown_signal.load(Ordering::SeqCst) {
                bail!("操作已取消");
            }

            let stem = unique_stem(video_path, &mut used_stems);
            let frame_dir = work_dir.join(&stem);
            ensure_directory_exists(&frame_dir)?;

            let video_estimate = video_info.estimated_frame_count(self.extraction_fps);
            let base = completed_base;
            let on_progress = |done: usize| {
                progress.update(ProgressUpdate {
                    phase: Phase::Extraction,
                    current: (base + done.min(video_estimate)).min(estimated_total),
                    total: estimated_total,
                    description: description.clone(),
                });
            };

            let frame_paths = extract_video_frames(
                video_path,
                self.extraction_fps,
                &frame_dir,
                &on_progress,
                &self.shutdown_signal,
            )
            .with_context(|| format!("影片擷取失敗: {}", video_path.display()))?;

            completed_base += video_estimate;

            for (source_index, path) in frame_paths.into_iter().enumerate() {
                let index = frames.len();
                frames.push(Frame {
                    path,
                    index,
                    sharpness_score: 0.0,
                    source_video: Some(stem.clone()),
                    source_index: Some(source_index),
                    output_name: Some(format!("{stem}_{source_index:05}")),
                });
            }
        }

        progress.update(ProgressUpdate {
            phase: Phase::Extraction,
            current: estimated_total,
            total: estimated_total,
            description,
        });

        let mut metadata = Map::new();
        metadata.insert(
            "input".to_string(),
            Value::String(directory.display().to_string()),
        );
        metadata.insert(
            "extraction_fps".to_string(),
            Value::from(self.extraction_fps),
        );
        metadata.insert("video_count".to_string(), Value::from(probed.len()));
        metadata.insert("total_frames".to_string(), Value::from(frames.len()));

        info!("擷取完成，{} 部影片共 {} 格", probed.len(), frames.len());

        Ok(ExtractionResult {
            frames,
            metadata,
            temp_dir: Some(work_dir.to_path_buf()),
            input_type: InputType::VideoDirectory,
        })
    }

    fn load_image_directory(
        &self,
        directory: &Path,
        progress: &dyn ProgressSink,
    ) -> Result<ExtractionResult> {
        let images = scan_image_files(directory, &self.file_type_table)?;
        let total = images.len();
        let description = "載入影像清單".to_string();

        let frames: Vec<Frame> = images
            .into_iter()
            .enumerate()
            .map(|(index, file)| {
                progress.update(ProgressUpdate {
                    phase: Phase::Extraction,
                    current: index + 1,
                    total,
                    description: description.clone(),
                });
                Frame::new(file.path, index)
            })
            .collect();

        let mut metadata = Map::new();
        metadata.insert(
            "input".to_string(),
            Value::String(directory.display().to_string()),
        );
        metadata.insert("total_frames".to_string(), Value::from(frames.len()));

        info!("載入影像完成，共 {} 格", frames.len());

        Ok(ExtractionResult {
            frames,
            metadata,
            temp_dir: None,
            input_type: InputType::Directory,
        })
    }
}

/// 取得不與其他影片衝突的檔名主幹
fn unique_stem(video_path: &Path, used: &mut HashSet<String>) -> String {
    let base = video_path
        .file_stem()
        .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string());

    let mut stem = base.clone();
    let mut counter = 2;
    while used.contains(&stem) {
        stem = format!("{base}_{counter}");
        counter += 1;
    }
    used.insert(stem.clone());
    stem
}
