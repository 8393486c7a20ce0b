mod batched;
mod best_n;
mod outlier_removal;
mod preview;

pub use preview::preview_selection;

use crate::component::frame_extractor::Frame;
use anyhow::{Result, bail};

/// best_n 的預設選取數量
pub const DEFAULT_BEST_N_COUNT: usize = 300;
/// best_n 的預設最小索引間距
pub const DEFAULT_MIN_BUFFER: usize = 3;
/// batched 的預設批次數
pub const DEFAULT_BATCH_COUNT: usize = 5;
/// outlier_removal 的預設敏感度係數
pub const DEFAULT_OUTLIER_FACTOR: f64 = 1.5;
/// outlier_removal 的預設鄰近窗格大小
pub const DEFAULT_OUTLIER_WINDOW: usize = 15;

/// 選取方法與其參數
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionMethod {
    /// 選出加權分數最高的 N 格，以最小索引間距維持時間分佈
    BestN { n: usize, min_buffer: usize },
    /// 將序列均分為若干連續批次，每批選出銳利度最高的一格
    Batched { batch_count: usize },
    /// 移除比鄰近影格明顯模糊的異常影格
    OutlierRemoval { factor: f64, window_size: usize },
}

impl SelectionMethod {
    /// 以預設參數建立指定名稱的方法
    ///
    /// 未知名稱是呼叫端的錯誤，直接回報不重試
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "best_n" => Ok(Self::BestN {
                n: DEFAULT_BEST_N_COUNT,
                min_buffer: DEFAULT_MIN_BUFFER,
            }),
            "batched" => Ok(Self::Batched {
                batch_count: DEFAULT_BATCH_COUNT,
            }),
            "outlier_removal" => Ok(Self::OutlierRemoval {
                factor: DEFAULT_OUTLIER_FACTOR,
                window_size: DEFAULT_OUTLIER_WINDOW,
            }),
            _ => bail!("不支援的選取方法: {name}"),
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::BestN { .. } => "best_n",
            Self::Batched { .. } => "batched",
            Self::OutlierRemoval { .. } => "outlier_removal",
        }
    }
}

/// 依選取方法取得影格子序列
///
/// 輸入假定已依 `index` 升冪排列；輸出一律維持同樣順序，
/// 不含重複索引。空輸入回傳空結果而非錯誤。
#[must_use]
pub fn select_frames(frames: &[Frame], method: SelectionMethod) -> Vec<Frame> {
    if frames.is_empty() {
        return Vec::new();
    }

    match method {
        SelectionMethod::BestN { n, min_buffer } => best_n::select_best_n(frames, n, min_buffer),
        SelectionMethod::Batched { batch_count } => batched::select_batched(frames, batch_count),
        SelectionMethod::OutlierRemoval {
            factor,
            window_size,
        } => outlier_removal::select_outlier_removal(frames, factor, window_size),
    }
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
    fn test_from_name_defaults() {
        assert_eq!(
            SelectionMethod::from_name("best_n").unwrap(),
            SelectionMethod::BestN {
                n: DEFAULT_BEST_N_COUNT,
                min_buffer: DEFAULT_MIN_BUFFER
            }
        );
        assert_eq!(
            SelectionMethod::from_name("batched").unwrap(),
            SelectionMethod::Batched {
                batch_count: DEFAULT_BATCH_COUNT
            }
        );
        assert_eq!(
            SelectionMethod::from_name("outlier_removal").unwrap(),
            SelectionMethod::OutlierRemoval {
                factor: DEFAULT_OUTLIER_FACTOR,
                window_size: DEFAULT_OUTLIER_WINDOW
            }
        );
    }

    #[test]
    fn test_from_name_unknown_fails() {
        assert!(SelectionMethod::from_name("sharpest").is_err());
        assert!(SelectionMethod::from_name("").is_err());
    }

    #[test]
    fn test_name_round_trip() {
        for name in ["best_n", "batched", "outlier_removal"] {
            let method = SelectionMethod::from_name(name).unwrap();
            assert_eq!(method.name(), name);
        }
    }

    #[test]
    fn test_select_frames_empty_input() {
        for name in ["best_n", "batched", "outlier_removal"] {
            let method = SelectionMethod::from_name(name).unwrap();
            assert!(select_frames(&[], method).is_empty());
        }
    }

    #[test]
    fn test_select_frames_output_is_ordered_subset() {
        let frames = make_frames(&[5.0, 1.0, 9.0, 3.0, 7.0, 2.0, 8.0, 4.0, 6.0, 0.5]);

        let methods = [
            SelectionMethod::BestN { n: 4, min_buffer: 2 },
            SelectionMethod::Batched { batch_count: 3 },
            SelectionMethod::OutlierRemoval {
                factor: 1.5,
                window_size: 5,
            },
        ];

        for method in methods {
            let selected = select_frames(&frames, method);
            // 索引應嚴格遞增且皆來自輸入
            for window in selected.windows(2) {
                assert!(
                    window[1].index > window[0].index,
                    "{} 的輸出應依索引嚴格遞增",
                    method.name()
                );
            }
            for frame in &selected {
                assert!(frame.index < frames.len());
            }
        }
    }
}
