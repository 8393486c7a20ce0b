use crate::component::frame_extractor::Frame;

/// 將序列均分為連續批次，每批選出銳利度最高的一格
///
/// 批次大小為 `total / batch_count`，最後一批吸收餘數，
/// 所有影格都會被涵蓋。同分時取批次內最先出現者。
/// 批次順序即索引順序，輸出不需要再排序。
pub(super) fn select_batched(frames: &[Frame], batch_count: usize) -> Vec<Frame> {
    if frames.is_empty() || batch_count == 0 {
        return Vec::new();
    }

    let batch_count = batch_count.min(frames.len());
    let batch_size = frames.len() / batch_count;

    let mut selected = Vec::with_capacity(batch_count);
    for i in 0..batch_count {
        let start = i * batch_size;
        let end = if i == batch_count - 1 {
            frames.len()
        } else {
            ((i + 1) * batch_size).min(frames.len())
        };

        if let Some(best) = batch_max(&frames[start..end]) {
            selected.push(best.clone());
        }
    }

    selected
}

/// 批次內銳利度最高的影格；同分時取第一個
fn batch_max(batch: &[Frame]) -> Option<&Frame> {
    let mut best: Option<&Frame> = None;
    for frame in batch {
        if best.is_none_or(|b| frame.sharpness_score > b.sharpness_score) {
            best = Some(frame);
        }
    }
    best
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
    fn test_batched_count_equals_batch_count() {
        let frames = make_frames(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        for batch_count in 1..=10 {
            let selected = select_batched(&frames, batch_count);
            assert_eq!(selected.len(), batch_count);
        }
    }

    #[test]
    fn test_batched_clamps_to_frame_count() {
        let frames = make_frames(&[1.0, 2.0, 3.0]);
        let selected = select_batched(&frames, 100);
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_batched_picks_max_per_batch() {
        // 兩批各 3 格（最後一批吸收餘數後是 4 格）
        let frames = make_frames(&[1.0, 9.0, 2.0, 3.0, 8.0, 4.0, 5.0]);
        let selected = select_batched(&frames, 2);

        let indices: Vec<usize> = selected.iter().map(|f| f.index).collect();
        // 批次 0..3 最高分在索引 1，批次 3..7 最高分在索引 4
        assert_eq!(indices, vec![1, 4]);
    }

    #[test]
    fn test_batched_last_batch_absorbs_remainder() {
        // 10 格分 3 批：3 + 3 + 4
        let frames = make_frames(&[0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 9.0]);
        let selected = select_batched(&frames, 3);

        let indices: Vec<usize> = selected.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![2, 4, 9]);
    }

    #[test]
    fn test_batched_tie_takes_first_occurrence() {
        let frames = make_frames(&[5.0, 5.0, 5.0, 5.0]);
        let selected = select_batched(&frames, 2);

        let indices: Vec<usize> = selected.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_batched_output_preserves_index_order() {
        let frames = make_frames(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0]);
        let selected = select_batched(&frames, 4);

        for window in selected.windows(2) {
            assert!(window[1].index > window[0].index);
        }
    }
}
