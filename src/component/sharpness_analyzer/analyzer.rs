use super::laplacian::score_image;
use crate::component::frame_extractor::ExtractionResult;
use crate::config::DEFAULT_CHUNK_SIZE;
use crate::tools::{Phase, ProgressSink, ProgressUpdate};
use log::{error, info, warn};
use rayon::prelude::*;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// 銳利度分析器
///
/// 以分塊方式平行計算每格影格的銳利度分數。分塊大小限制
/// 記憶體用量；每個分塊使用上限為 `min(worker 數, 分塊長度)`
/// 的執行緒池。輸出順序永遠與輸入路徑順序一致，與各執行緒
/// 的完成順序無關。
pub struct SharpnessAnalyzer {
    max_workers: usize,
    chunk_size: usize,
}

impl SharpnessAnalyzer {
    /// 建立分析器，`max_workers` 為 None 時使用 CPU 核心數
    #[must_use]
    pub fn new(max_workers: Option<usize>) -> Self {
        Self {
            max_workers: max_workers.unwrap_or_else(num_cpus::get).max(1),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// 調整分塊大小（只影響記憶體用量與進度粒度，不影響結果）
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// 為擷取結果的每格影格附上銳利度分數
    ///
    /// 回傳新的 `ExtractionResult`，影格順序與其餘欄位保持不變。
    /// 個別影格失敗以 0.0 分數吸收，不會讓整批失敗。
    #[must_use]
    pub fn calculate_sharpness(
        &self,
        extraction: ExtractionResult,
        progress: &dyn ProgressSink,
        shutdown_signal: &AtomicBool,
    ) -> ExtractionResult {
        if extraction.frames.is_empty() {
            return extraction;
        }

        let description = if extraction.input_type.is_video_input() {
            "計算影片影格銳利度"
        } else {
            "計算影像銳利度"
        };

        let paths: Vec<PathBuf> = extraction
            .frames
            .iter()
            .map(|frame| frame.path.clone())
            .collect();

        let scores = self.score_paths(&paths, description, progress, shutdown_signal);

        let scored_frames = extraction
            .frames
            .iter()
            .zip(scores)
            .map(|(frame, score)| frame.with_score(score))
            .collect();

        extraction.with_frames(scored_frames)
    }

    /// 計算一串影像路徑的銳利度分數
    ///
    /// 回傳的分數序列長度與順序都與 `paths` 相同
    pub fn score_paths(
        &self,
        paths: &[PathBuf],
        description: &str,
        progress: &dyn ProgressSink,
        shutdown_signal: &AtomicBool,
    ) -> Vec<f64> {
        let total = paths.len();
        if total == 0 {
            return Vec::new();
        }

        info!("開始計算銳利度，共 {total} 格（worker: {}）", self.max_workers);

        let completed = Mutex::new(0usize);
        let mut scores: Vec<f64> = Vec::with_capacity(total);

        for chunk in paths.chunks(self.chunk_size) {
            if shutdown_signal.load(Ordering::SeqCst) {
                warn!("計分已中斷，剩餘影格以預設分數補齊");
                break;
            }

            let chunk_scores = self.score_chunk(
                chunk,
                total,
                description,
                &completed,
                progress,
                shutdown_signal,
            );
            scores.extend(chunk_scores);
        }

        // 中斷時補齊長度，維持輸出與輸入一一對應
        scores.resize(total, 0.0);
        scores
    }

    fn score_chunk(
        &self,
        chunk: &[PathBuf],
        total: usize,
        description: &str,
        completed: &Mutex<usize>,
        progress: &dyn ProgressSink,
        shutdown_signal: &AtomicBool,
    ) -> Vec<f64> {
        let workers = self.max_workers.min(chunk.len()).max(1);
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
            Ok(pool) => pool,
            Err(e) => {
                // 平行計分無法啟動，整個分塊退回預設分數後繼續
                error!("無法建立計分執行緒池: {e}");
                report_progress(completed, chunk.len(), total, description, progress);
                return vec![0.0; chunk.len()];
            }
        };

        pool.install(|| {
            chunk
                .par_iter()
                .map(|path| {
                    if shutdown_signal.load(Ordering::SeqCst) {
                        // 尚未開始的工作直接略過，進行中的讓它完成
                        report_progress(completed, 1, total, description, progress);
                        return 0.0;
                    }

                    let score = match score_image(path) {
                        Ok(score) => score,
                        Err(e) => {
                            warn!("影格計分失敗 {}: {e}", path.display());
                            0.0
                        }
                    };

                    report_progress(completed, 1, total, description, progress);
                    score
                })
                .collect()
        })
    }
}

/// 回報進度
///
/// 在鎖內遞增並回報，保證 `current` 對接收端單調遞增
fn report_progress(
    completed: &Mutex<usize>,
    increment: usize,
    total: usize,
    description: &str,
    progress: &dyn ProgressSink,
) {
    let mut guard = completed.lock().unwrap();
    *guard += increment;
    progress.update(ProgressUpdate {
        phase: Phase::Sharpness,
        current: *guard,
        total,
        description: description.to_string(),
    });
}
