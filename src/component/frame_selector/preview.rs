use super::SelectionMethod;
use crate::component::frame_extractor::Frame;

/// 估計選取後會剩下多少影格，供互動調整參數時即時顯示
///
/// `best_n` 與 `batched` 的估計就是精確值。`outlier_removal`
/// 只依係數套用固定的移除率區間，刻意犧牲準確度換取 O(1)
/// 延遲；實際數量要跑完整個演算法才知道，兩者可能有明顯落差。
#[must_use]
pub fn preview_selection(frames: &[Frame], method: SelectionMethod) -> usize {
    if frames.is_empty() {
        return 0;
    }

    match method {
        SelectionMethod::BestN { n, .. } => n.min(frames.len()),
        SelectionMethod::Batched { batch_count } => batch_count.min(frames.len()),
        SelectionMethod::OutlierRemoval { factor, .. } => {
            estimate_outlier_survivors(frames.len(), factor)
        }
    }
}

/// 以係數對應的粗略移除率估計保留數量，至少回報 1 格
fn estimate_outlier_survivors(total: usize, factor: f64) -> usize {
    let removal_rate = if factor >= 2.0 {
        0.05
    } else if factor >= 1.5 {
        0.10
    } else if factor >= 1.0 {
        0.20
    } else {
        0.30
    };

    let estimated = (total as f64 * (1.0 - removal_rate)) as usize;
    estimated.max(1)
}
