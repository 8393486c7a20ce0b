//! 整合測試 - 以產生的影像資料驗證完整流程
//!
//! 不依賴 ffmpeg：影像資料夾輸入可以走完擷取、計分、選取、
//! 儲存四個階段。

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use image::{GrayImage, Luma};
use tempfile::TempDir;

use sharp_frame_select::component::frame_selector::{
    SelectionMethod, preview_selection, select_frames,
};
use sharp_frame_select::component::pipeline::{PipelineRequest, run_pipeline};
use sharp_frame_select::component::sharpness_analyzer::SharpnessAnalyzer;
use sharp_frame_select::config::{Config, FileTypeTable, UserSettings};
use sharp_frame_select::tools::NullProgress;

fn test_config() -> Config {
    Config {
        file_type_table: FileTypeTable {
            video_file: vec![".mp4".to_string()],
            image_file: vec![".png".to_string(), ".jpg".to_string()],
        },
        settings: UserSettings {
            worker_count: Some(2),
            chunk_size: 8,
            ..UserSettings::default()
        },
    }
}

/// 棋盤格影像：高頻內容，銳利度高
fn write_sharp_image(path: &Path) {
    GrayImage::from_fn(48, 48, |x, y| {
        if (x + y) % 2 == 0 { Luma([255]) } else { Luma([0]) }
    })
    .save(path)
    .unwrap();
}

/// 均勻影像：沒有邊緣，銳利度為 0
fn write_flat_image(path: &Path) {
    GrayImage::from_pixel(48, 48, Luma([100])).save(path).unwrap();
}

/// 測試 1: 影像資料夾完整流程
#[test]
fn test_image_directory_pipeline() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();

    // 20 格影像，每 4 格一張棋盤格
    for i in 0..20 {
        let path = input_dir.path().join(format!("frame_{i:05}.png"));
        if i % 4 == 0 {
            write_sharp_image(&path);
        } else {
            write_flat_image(&path);
        }
    }

    let request = PipelineRequest {
        input_path: input_dir.path().to_path_buf(),
        output_dir: output_dir.path().to_path_buf(),
        method: SelectionMethod::BestN { n: 5, min_buffer: 3 },
    };
    let shutdown_signal = Arc::new(AtomicBool::new(false));

    let report = run_pipeline(&request, &test_config(), &NullProgress, &shutdown_signal).unwrap();

    println!("處理結果:");
    println!("  - 總影格: {}", report.total_frames);
    println!("  - 選取: {}", report.selected_count);
    println!("  - 儲存: {}", report.saved);

    assert_eq!(report.total_frames, 20, "應該載入 20 格影像");
    assert_eq!(report.selected_count, 5, "應該選出 5 格");
    assert_eq!(report.saved, 5, "應該儲存 5 格");
    assert_eq!(report.failed, 0, "不應該有失敗");

    // 中繼資料應該記錄選取結果，且索引嚴格遞增
    let metadata: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(output_dir.path().join("selection_metadata.json")).unwrap(),
    )
    .unwrap();

    assert_eq!(metadata["method"], "best_n");
    assert_eq!(metadata["total_frames"], 20);

    let records = metadata["frames"].as_array().unwrap();
    assert_eq!(records.len(), 5);
    let indices: Vec<u64> = records
        .iter()
        .map(|r| r["index"].as_u64().unwrap())
        .collect();
    for window in indices.windows(2) {
        assert!(window[1] > window[0], "輸出索引應嚴格遞增");
    }

    // 棋盤格影像分數遠高於均勻影像，選出的應該都是棋盤格（索引 % 4 == 0）
    for index in &indices {
        assert_eq!(index % 4, 0, "索引 {index} 不是棋盤格影像");
    }

    // 每一格選出的影像都應該被複製到輸出資料夾
    for index in &indices {
        let output_path = output_dir.path().join(format!("frame_{index:05}.png"));
        assert!(output_path.exists(), "缺少輸出影格: {}", output_path.display());
    }

    println!("✓ 影像資料夾完整流程測試通過");
}

/// 測試 2: 計分順序與設定無關
#[test]
fn test_scorer_order_invariant_across_configs() {
    let input_dir = TempDir::new().unwrap();

    let mut paths = Vec::new();
    for i in 0..15 {
        let path = input_dir.path().join(format!("frame_{i:05}.png"));
        if i % 2 == 0 {
            write_sharp_image(&path);
        } else {
            write_flat_image(&path);
        }
        paths.push(path);
    }

    let shutdown_signal = AtomicBool::new(false);
    let baseline = SharpnessAnalyzer::new(Some(1)).with_chunk_size(100).score_paths(
        &paths,
        "測試",
        &NullProgress,
        &shutdown_signal,
    );

    // worker 數與分塊大小的任何組合都不應改變輸出
    for (workers, chunk_size) in [(2, 4), (4, 1), (8, 7), (3, 15)] {
        let scores = SharpnessAnalyzer::new(Some(workers))
            .with_chunk_size(chunk_size)
            .score_paths(&paths, "測試", &NullProgress, &shutdown_signal);

        assert_eq!(
            scores, baseline,
            "workers={workers}, chunk_size={chunk_size} 的結果與基準不同"
        );
    }

    println!("✓ 計分順序不變性測試通過");
}

/// 測試 3: 壞檔案只影響自己的分數
#[test]
fn test_scorer_fault_tolerance() {
    let input_dir = TempDir::new().unwrap();

    let mut paths = Vec::new();
    for i in 0..5 {
        let path = input_dir.path().join(format!("frame_{i:05}.png"));
        write_sharp_image(&path);
        paths.push(path);
    }

    // 索引 2 改成無法解碼的假影像
    fs::write(&paths[2], b"not an image").unwrap();

    let shutdown_signal = AtomicBool::new(false);
    let scores = SharpnessAnalyzer::new(Some(2)).score_paths(
        &paths,
        "測試",
        &NullProgress,
        &shutdown_signal,
    );

    assert_eq!(scores.len(), 5, "輸出長度應等於輸入長度");
    assert!((scores[2] - 0.0).abs() < f64::EPSILON, "壞檔應得預設分數 0.0");
    for (i, score) in scores.iter().enumerate() {
        if i != 2 {
            assert!(*score > 0.0, "正常影格 {i} 的分數應大於 0");
        }
    }

    println!("✓ 計分容錯測試通過");
}

/// 測試 4: 三種方法在同一份計分結果上的行為
#[test]
fn test_selection_methods_on_scored_frames() {
    let input_dir = TempDir::new().unwrap();

    let mut paths = Vec::new();
    for i in 0..12 {
        let path = input_dir.path().join(format!("frame_{i:05}.png"));
        if i == 3 || i == 9 {
            write_sharp_image(&path);
        } else {
            write_flat_image(&path);
        }
        paths.push(path);
    }

    let shutdown_signal = AtomicBool::new(false);
    let analyzer = SharpnessAnalyzer::new(Some(2));
    let scores = analyzer.score_paths(&paths, "測試", &NullProgress, &shutdown_signal);

    let frames: Vec<_> = paths
        .iter()
        .zip(&scores)
        .enumerate()
        .map(|(index, (path, &score))| {
            sharp_frame_select::component::frame_extractor::Frame::new(path.clone(), index)
                .with_score(score)
        })
        .collect();

    // batched: 每批的最高分都應該是批內最大值
    let batched = select_frames(&frames, SelectionMethod::Batched { batch_count: 4 });
    assert_eq!(batched.len(), 4);
    for (i, selected) in batched.iter().enumerate() {
        let start = i * 3;
        let end = if i == 3 { frames.len() } else { start + 3 };
        let batch_max = frames[start..end]
            .iter()
            .map(|f| f.sharpness_score)
            .fold(f64::NEG_INFINITY, f64::max);
        assert!(
            (selected.sharpness_score - batch_max).abs() < f64::EPSILON,
            "批次 {i} 選出的不是最高分"
        );
    }

    // best_n: 最銳利的兩格就是棋盤格
    let best = select_frames(&frames, SelectionMethod::BestN { n: 2, min_buffer: 1 });
    let best_indices: Vec<usize> = best.iter().map(|f| f.index).collect();
    assert_eq!(best_indices, vec![3, 9]);

    // preview 與實際數量在精確方法上一致
    assert_eq!(
        preview_selection(&frames, SelectionMethod::Batched { batch_count: 4 }),
        batched.len()
    );
    assert_eq!(
        preview_selection(&frames, SelectionMethod::BestN { n: 2, min_buffer: 1 }),
        best.len()
    );

    println!("✓ 選取方法整合測試通過");
}

/// 測試 5: 空資料夾回報錯誤而非崩潰
#[test]
fn test_empty_input_directory_fails_cleanly() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();

    let request = PipelineRequest {
        input_path: input_dir.path().to_path_buf(),
        output_dir: output_dir.path().to_path_buf(),
        method: SelectionMethod::Batched { batch_count: 3 },
    };
    let shutdown_signal = Arc::new(AtomicBool::new(false));

    let result = run_pipeline(&request, &test_config(), &NullProgress, &shutdown_signal);
    assert!(result.is_err(), "空資料夾應回報錯誤");

    println!("✓ 空輸入測試通過");
}
