use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::sync::Mutex;

/// 處理流程的階段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extraction,
    Sharpness,
    Selection,
    Saving,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Sharpness => "sharpness",
            Self::Selection => "selection",
            Self::Saving => "saving",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 單次進度回報的不可變記錄
///
/// `current` 在同一階段內單調遞增，階段的最後一次回報 `current == total`。
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub phase: Phase,
    pub current: usize,
    pub total: usize,
    pub description: String,
}

/// 進度回報介面
///
/// 計分與選取邏輯只透過這個介面回報進度，不持有任何 UI 狀態；
/// 省略回報不影響結果正確性。
pub trait ProgressSink: Send + Sync {
    fn update(&self, update: ProgressUpdate);
}

/// 不顯示任何進度（測試與嵌入用）
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn update(&self, _update: ProgressUpdate) {}
}

/// 以 indicatif 進度條顯示進度
///
/// 每個階段使用獨立的進度條，切換階段時結束前一個
pub struct ConsoleProgress {
    state: Mutex<Option<(Phase, ProgressBar)>>,
}

impl ConsoleProgress {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    fn make_bar(total: usize, description: &str) -> ProgressBar {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("#>-"),
        );
        bar.set_message(description.to_string());
        bar
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn update(&self, update: ProgressUpdate) {
        let mut state = self.state.lock().unwrap();

        let needs_new_bar = match state.as_ref() {
            Some((phase, _)) => *phase != update.phase,
            None => true,
        };

        if needs_new_bar {
            if let Some((_, old_bar)) = state.take() {
                old_bar.finish_and_clear();
            }
            *state = Some((
                update.phase,
                Self::make_bar(update.total, &update.description),
            ));
        }

        if let Some((_, bar)) = state.as_ref() {
            bar.set_position(update.current as u64);

            if update.current >= update.total {
                bar.finish_with_message(format!("{} 完成", update.description));
            }
        }
    }
}
