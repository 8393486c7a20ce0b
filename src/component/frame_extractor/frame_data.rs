use std::path::PathBuf;

/// 單一影格的資料
///
/// 值本身不可變：計分階段以 `with_score` 建立新值取代舊值，
/// 不就地修改。`index` 反映時間順序，選取演算法以索引差
/// 作為時間距離的依據。
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub path: PathBuf,
    pub index: usize,
    pub sharpness_score: f64,
    /// 來源影片名稱（多影片輸入時使用）
    pub source_video: Option<String>,
    /// 在來源影片內的影格序號
    pub source_index: Option<usize>,
    /// 輸出時使用的檔名（不含副檔名）
    pub output_name: Option<String>,
}

impl Frame {
    #[must_use]
    pub fn new(path: PathBuf, index: usize) -> Self {
        Self {
            path,
            index,
            sharpness_score: 0.0,
            source_video: None,
            source_index: None,
            output_name: None,
        }
    }

    /// 建立帶有銳利度分數的新影格，其餘欄位保持不變
    #[must_use]
    pub fn with_score(&self, sharpness_score: f64) -> Self {
        Self {
            sharpness_score,
            ..self.clone()
        }
    }
}

/// 輸入來源的類型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    /// 單一影片檔
    Video,
    /// 含多個影片檔的資料夾
    VideoDirectory,
    /// 含影像檔的資料夾
    Directory,
}

impl InputType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::VideoDirectory => "video_directory",
            Self::Directory => "directory",
        }
    }

    /// 輸入是否來自影片（影響進度描述與暫存目錄清理）
    #[must_use]
    pub const fn is_video_input(self) -> bool {
        matches!(self, Self::Video | Self::VideoDirectory)
    }
}

/// 擷取階段的產出，後續階段以唯讀方式使用
///
/// 計分階段會以新的 `frames` 重建整個值，其餘欄位原樣保留。
#[derive(Debug)]
pub struct ExtractionResult {
    /// 依 `index` 升冪排列的影格
    pub frames: Vec<Frame>,
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// 擷取影格的暫存目錄，處理完成後由呼叫端清理
    pub temp_dir: Option<PathBuf>,
    pub input_type: InputType,
}

impl ExtractionResult {
    /// 以計分後的影格建立新結果，保留其餘欄位
    #[must_use]
    pub fn with_frames(self, frames: Vec<Frame>) -> Self {
        Self { frames, ..self }
    }
}
