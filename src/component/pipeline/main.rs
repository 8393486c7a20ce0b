use super::runner::{PipelineReport, extract_and_score, select_and_save};
use crate::component::frame_extractor::ExtractionResult;
use crate::component::frame_selector::{
    DEFAULT_BATCH_COUNT, DEFAULT_BEST_N_COUNT, DEFAULT_MIN_BUFFER, DEFAULT_OUTLIER_FACTOR,
    DEFAULT_OUTLIER_WINDOW, SelectionMethod, preview_selection,
};
use crate::config::{Config, add_recent_path, save_settings};
use crate::tools::{ConsoleProgress, ensure_directory_exists, validate_directory_exists};
use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input, Select};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 銳利影格選取流程（互動版）
///
/// 四階段流程：
/// A. 擷取影格（影片經 ffmpeg，影像資料夾直接載入）
/// B. 平行計算每格的銳利度分數
/// C. 互動選擇選取方法與參數（以預估數量即時回饋）
/// D. 套用選取並儲存結果
pub struct SelectionPipeline {
    shutdown_signal: Arc<AtomicBool>,
}

impl SelectionPipeline {
    #[must_use]
    pub fn new(shutdown_signal: &Arc<AtomicBool>) -> Self {
        Self {
            shutdown_signal: Arc::clone(shutdown_signal),
        }
    }

    pub fn run(&self, config: &mut Config) -> Result<()> {
        println!("{}", style("=== 銳利影格選取 ===").cyan().bold());

        let input_path = self.prompt_input_path(config)?;

        // 記住這次的輸入路徑
        add_recent_path(&mut config.settings, &input_path.display().to_string());
        if let Err(e) = save_settings(&config.settings) {
            warn!("無法儲存設定: {e}");
        }

        let output_dir = Self::prompt_output_path()?;
        ensure_directory_exists(&output_dir)?;

        let work_dir = output_dir.join(".tmp_frames");
        let result = self.process(config, &input_path, &output_dir, &work_dir);

        // 無論成敗都清理暫存影格
        if work_dir.exists() && fs::remove_dir_all(&work_dir).is_err() {
            warn!("無法清理暫存目錄: {}", work_dir.display());
        }

        result
    }

    fn process(
        &self,
        config: &Config,
        input_path: &Path,
        output_dir: &Path,
        work_dir: &Path,
    ) -> Result<()> {
        // Stage A + B: 擷取與計分
        println!("{}", style("擷取與計分中...").cyan());
        let progress = ConsoleProgress::new();
        let extraction = extract_and_score(
            input_path,
            work_dir,
            config,
            &progress,
            &self.shutdown_signal,
        )?;

        println!(
            "{}",
            style(format!("共 {} 格影格完成計分", extraction.frames.len())).green()
        );

        // Stage C: 互動選擇方法與參數
        let method = Self::prompt_method(&extraction)?;

        // Stage D: 套用選取並儲存
        let report = select_and_save(
            &extraction,
            method,
            output_dir,
            config,
            &progress,
            &self.shutdown_signal,
        )?;

        Self::print_summary(&report);
        Ok(())
    }

    fn prompt_input_path(&self, config: &Config) -> Result<PathBuf> {
        if !config.settings.recent_paths.is_empty() {
            println!("{}", style("最近使用:").dim());
            for path in config.settings.recent_paths.iter().take(3) {
                println!("  {}", style(path).dim());
            }
        }

        let path: String = Input::new()
            .with_prompt("請輸入影片檔或資料夾路徑")
            .interact_text()?;
        let path = PathBuf::from(path.trim());

        if !path.is_file() {
            validate_directory_exists(&path)?;
        }

        Ok(path)
    }

    fn prompt_output_path() -> Result<PathBuf> {
        let path: String = Input::new()
            .with_prompt("請輸入輸出資料夾路徑")
            .interact_text()?;
        Ok(PathBuf::from(path.trim()))
    }

    /// 選擇選取方法與參數，以預估數量即時回饋
    ///
    /// outlier_removal 的預估是粗略值，會特別標示
    fn prompt_method(extraction: &ExtractionResult) -> Result<SelectionMethod> {
        let total = extraction.frames.len();

        loop {
            let items = [
                "最佳 N 格 (best_n) - 選出最銳利的 N 格並保持時間分佈",
                "分批選取 (batched) - 均分成批次，每批選最銳利的一格",
                "移除異常 (outlier_removal) - 移除比鄰近影格明顯模糊者",
            ];
            let choice = Select::new()
                .with_prompt("選取方法")
                .items(&items)
                .default(0)
                .interact()?;

            let method = match choice {
                0 => {
                    let n: usize = Input::new()
                        .with_prompt("目標數量")
                        .default(DEFAULT_BEST_N_COUNT)
                        .interact_text()?;
                    let min_buffer: usize = Input::new()
                        .with_prompt("最小索引間距")
                        .default(DEFAULT_MIN_BUFFER)
                        .interact_text()?;
                    SelectionMethod::BestN { n, min_buffer }
                }
                1 => {
                    let batch_count: usize = Input::new()
                        .with_prompt("批次數量")
                        .default(DEFAULT_BATCH_COUNT)
                        .interact_text()?;
                    SelectionMethod::Batched { batch_count }
                }
                _ => {
                    let factor: f64 = Input::new()
                        .with_prompt("敏感度係數 (0.1-3.0，越低移除越多)")
                        .default(DEFAULT_OUTLIER_FACTOR)
                        .interact_text()?;
                    let window_size: usize = Input::new()
                        .with_prompt("鄰近窗格大小")
                        .default(DEFAULT_OUTLIER_WINDOW)
                        .interact_text()?;
                    SelectionMethod::OutlierRemoval {
                        factor,
                        window_size,
                    }
                }
            };

            let estimate = preview_selection(&extraction.frames, method);
            println!(
                "{}",
                style(format!("預估選取 {estimate} / {total} 格")).cyan()
            );
            if matches!(method, SelectionMethod::OutlierRemoval { .. }) {
                println!(
                    "  {}",
                    style("(粗略估計，實際數量以執行結果為準)").dim()
                );
            }

            let confirmed = Confirm::new()
                .with_prompt("使用這組參數？")
                .default(true)
                .interact()?;
            if confirmed {
                info!("選取方法: {} (預估 {estimate} 格)", method.name());
                return Ok(method);
            }
        }
    }

    fn print_summary(report: &PipelineReport) {
        println!();
        println!("{}", style("=== 處理摘要 ===").cyan().bold());
        println!("  輸入類型: {}", report.input_type.as_str());
        println!("  總影格數: {}", report.total_frames);
        println!("  選取: {} 格", style(report.selected_count).green());
        println!("  儲存成功: {} 格", style(report.saved).green());

        if report.failed > 0 {
            println!("  儲存失敗: {} 格", style(report.failed).red());
        }

        println!("  輸出位置: {}", report.output_dir.display());

        info!(
            "處理完成 - 選取: {}, 儲存: {}, 失敗: {}",
            report.selected_count, report.saved, report.failed
        );
    }
}
