use crate::component::frame_extractor::Frame;
use std::cmp::Ordering;
use std::collections::HashSet;

/// 銳利度在加權分數中的占比
const SHARPNESS_WEIGHT: f64 = 0.7;

/// 時間分佈的占比
///
/// 分佈不以加法併入分數，而是由最小索引間距的硬性限制實現；
/// 這個常數記錄兩者的相對比重。
#[allow(dead_code)]
const DISTRIBUTION_WEIGHT: f64 = 0.3;

/// 選出加權分數最高的 N 格
///
/// 兩階段貪婪選取：
/// 1. 依加權分數由高到低，只接受與已選影格索引距離 ≥ `min_buffer` 者
/// 2. 若數量不足，改用放寬間距 `max(1, min_buffer / 2)` 從剩餘影格補滿
///
/// 放寬階段以間距品質換取數量，確保影格夠多時一定能湊滿 N 格。
/// 結果依索引升冪排列。
pub(super) fn select_best_n(frames: &[Frame], n: usize, min_buffer: usize) -> Vec<Frame> {
    if frames.is_empty() || n == 0 {
        return Vec::new();
    }

    let n = n.min(frames.len());

    // 依加權分數由高到低排序；穩定排序讓同分者保持原始順序
    let mut order: Vec<usize> = (0..frames.len()).collect();
    order.sort_by(|&a, &b| {
        weighted_score(&frames[b])
            .partial_cmp(&weighted_score(&frames[a]))
            .unwrap_or(Ordering::Equal)
    });

    let mut selected_indices: HashSet<usize> = HashSet::with_capacity(n);

    // 第一階段：嚴格間距
    for &candidate in &order {
        if selected_indices.len() >= n {
            break;
        }
        if is_gap_sufficient(frames[candidate].index, &selected_indices, min_buffer) {
            selected_indices.insert(frames[candidate].index);
        }
    }

    // 第二階段：數量不足時放寬間距補滿
    if selected_indices.len() < n {
        let relaxed_buffer = (min_buffer / 2).max(1);
        for &candidate in &order {
            if selected_indices.len() >= n {
                break;
            }
            let index = frames[candidate].index;
            if selected_indices.contains(&index) {
                continue;
            }
            if is_gap_sufficient(index, &selected_indices, relaxed_buffer) {
                selected_indices.insert(index);
            }
        }
    }

    // 還原時間順序
    frames
        .iter()
        .filter(|frame| selected_indices.contains(&frame.index))
        .cloned()
        .collect()
}

fn weighted_score(frame: &Frame) -> f64 {
    frame.sharpness_score * SHARPNESS_WEIGHT
}

/// 檢查候選索引與所有已選索引的距離是否都達到下限
fn is_gap_sufficient(candidate: usize, selected: &HashSet<usize>, min_gap: usize) -> bool {
    selected
        .iter()
        .all(|&index| candidate.abs_diff(index) >= min_gap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn make_frames(scores: &[f64]) -> Vec<Frame> {
        scores
            .iter()
            .enumerate()
            .map(|(index, &score)| {
                Frame::new(PathBuf::from(format!("/frames/frame_{index:05}.jpg")), index)
                    .with_score(score)
            })
            .collect()
    }

    #[test]
    fn test_best_n_zero_returns_empty() {
        let frames = make_frames(&[1.0, 2.0, 3.0]);
        assert!(select_best_n(&frames, 0, 3).is_empty());
    }

    #[test]
    fn test_best_n_clamps_to_frame_count() {
        let frames = make_frames(&[1.0, 2.0, 3.0]);
        let selected = select_best_n(&frames, 100, 0);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_best_n_reaches_target_with_uniform_scores() {
        // 分數一致、影格充足時，放寬階段保證湊滿目標數量
        let frames = make_frames(&vec![10.0; 50]);
        let selected = select_best_n(&frames, 12, 3);
        assert_eq!(selected.len(), 12);
    }

    #[test]
    fn test_best_n_first_pass_respects_min_buffer() {
        // 間距寬鬆到第一階段就能湊滿時，所有間距都應達到下限
        let frames = make_frames(&vec![10.0; 100]);
        let min_buffer = 5;
        let selected = select_best_n(&frames, 10, min_buffer);

        assert_eq!(selected.len(), 10);
        for a in &selected {
            for b in &selected {
                if a.index != b.index {
                    assert!(
                        a.index.abs_diff(b.index) >= min_buffer,
                        "索引 {} 與 {} 間距不足",
                        a.index,
                        b.index
                    );
                }
            }
        }
    }

    #[test]
    fn test_best_n_relaxed_pass_fills_when_strict_gap_starves() {
        // 10 格要選 5 格、間距 4：嚴格間距只容得下 3 格（0, 4, 8），
        // 放寬到 2 之後補進 2 與 6 才湊滿
        let frames = make_frames(&vec![10.0; 10]);
        let selected = select_best_n(&frames, 5, 4);

        let indices: Vec<usize> = selected.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2, 4, 6, 8]);
    }

    #[test]
    fn test_best_n_output_sorted_by_index() {
        let frames = make_frames(&[5.0, 50.0, 1.0, 40.0, 2.0, 30.0, 3.0, 20.0, 4.0, 10.0]);
        let selected = select_best_n(&frames, 4, 1);

        for window in selected.windows(2) {
            assert!(window[1].index > window[0].index);
        }
    }

    #[test]
    fn test_best_n_prefers_sharpest_region() {
        // 100 格：前 20 格分數 50+i、中間 60 格 100+i、最後 20 格 200+i。
        // 選 10 格、間距 3，應全部落在最高分的 80..=99 區段
        let mut scores = Vec::with_capacity(100);
        for i in 0..20 {
            scores.push(50.0 + i as f64);
        }
        for i in 0..60 {
            scores.push(100.0 + i as f64);
        }
        for i in 0..20 {
            scores.push(200.0 + i as f64);
        }
        let frames = make_frames(&scores);

        let selected = select_best_n(&frames, 10, 3);

        // 間距 3 之下 80..=99 只容得下 7 格，其餘由次高分區段的
        // 尾端遞補；貪婪順序完全決定結果
        let indices: Vec<usize> = selected.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![72, 75, 78, 81, 84, 87, 90, 93, 96, 99]);
    }

    #[test]
    fn test_best_n_min_buffer_zero_is_pure_top_n() {
        let frames = make_frames(&[1.0, 9.0, 2.0, 8.0, 3.0]);
        let selected = select_best_n(&frames, 2, 0);

        let indices: Vec<usize> = selected.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn test_best_n_stable_on_ties() {
        // 全部同分時，排序穩定性讓較前面的影格優先
        let frames = make_frames(&[7.0, 7.0, 7.0, 7.0, 7.0, 7.0]);
        let selected = select_best_n(&frames, 2, 2);

        let indices: Vec<usize> = selected.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }
}
