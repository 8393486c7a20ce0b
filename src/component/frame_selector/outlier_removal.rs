use crate::component::frame_extractor::Frame;

/// 判定異常所需的最少鄰居數
const MIN_NEIGHBORS: usize = 3;

/// 門檻換算除數：threshold = (100 - sensitivity) / 4
const THRESHOLD_DIVISOR: f64 = 4.0;

/// 移除比鄰近影格明顯模糊的異常影格
///
/// `factor` 與敏感度成反比：係數越低移除越積極。
/// 逐格與左右鄰居的平均分數比較，落差超過全域分數範圍的
/// 一定百分比才視為異常。過濾保留原本順序，不需要重新排序。
pub(super) fn select_outlier_removal(
    frames: &[Frame],
    factor: f64,
    window_size: usize,
) -> Vec<Frame> {
    if frames.is_empty() {
        return Vec::new();
    }

    let sensitivity = factor_to_sensitivity(factor);

    let scores: Vec<f64> = frames.iter().map(|f| f.sharpness_score).collect();
    let global_min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let global_max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let global_range = global_max - global_min;

    frames
        .iter()
        .enumerate()
        .filter(|(i, _)| !is_outlier(*i, &scores, global_range, sensitivity, window_size))
        .map(|(_, frame)| frame.clone())
        .collect()
}

/// 將敏感度係數換算為 0..=100 的敏感度
///
/// factor 0.5 → 75（積極移除）、1.5 → 25、2.0 → 0（全保留）
pub(super) fn factor_to_sensitivity(factor: f64) -> i32 {
    ((2.0 - factor) * 50.0).round().clamp(0.0, 100.0) as i32
}

fn is_outlier(
    index: usize,
    scores: &[f64],
    global_range: f64,
    sensitivity: i32,
    window_size: usize,
) -> bool {
    // 敏感度邊界是明確的捷徑，不經過公式
    if sensitivity <= 0 {
        return false;
    }
    if sensitivity >= 100 {
        return true;
    }

    // 窗格保持奇數，兩側對稱
    let window = if window_size % 2 == 0 {
        window_size + 1
    } else {
        window_size
    };
    let half = window / 2;

    let window_start = index.saturating_sub(half);
    let window_end = (index + half + 1).min(scores.len());

    // 鄰居不含自己
    let neighbor_count = window_end - window_start - 1;
    if neighbor_count < MIN_NEIGHBORS {
        // 序列邊緣或輸入太小，證據不足就不視為異常
        return false;
    }

    let neighbor_sum: f64 = scores[window_start..window_end].iter().sum::<f64>() - scores[index];
    let window_avg = neighbor_sum / neighbor_count as f64;
    let current_score = scores[index];

    if global_range == 0.0 {
        return false;
    }

    let percent_of_range = (window_avg - current_score) / global_range * 100.0;
    let threshold = f64::from(100 - sensitivity) / THRESHOLD_DIVISOR;

    current_score < window_avg && percent_of_range > threshold
}
