use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// 最近使用路徑的保留數量
pub const MAX_RECENT_PATHS: usize = 8;

/// 預設每秒擷取的影格數
pub const DEFAULT_EXTRACTION_FPS: u32 = 10;

/// 銳利度計分的預設分塊大小
pub const DEFAULT_CHUNK_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
    #[serde(rename = "IMAGE_FILE")]
    pub image_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        self.video_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn image_extensions_set(&self) -> HashSet<String> {
        self.image_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        Self::has_extension_in(path, &self.video_extensions_set())
    }

    #[must_use]
    pub fn is_image_file(&self, path: &Path) -> bool {
        Self::has_extension_in(path, &self.image_extensions_set())
    }

    fn has_extension_in(path: &Path, extensions: &HashSet<String>) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

/// 使用者設定，儲存於工作目錄的 settings.json
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    /// 最近使用過的輸入路徑（最新的在最前面）
    pub recent_paths: Vec<String>,
    /// 計分工作執行緒數量，None 表示使用 CPU 核心數
    pub worker_count: Option<usize>,
    /// 計分分塊大小，限制大量影格時的記憶體用量
    pub chunk_size: usize,
    /// 影片擷取影格的取樣率（每秒幾格）
    pub extraction_fps: u32,
    /// 輸出檔名的前綴
    pub output_stem: String,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            recent_paths: Vec::new(),
            worker_count: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            extraction_fps: DEFAULT_EXTRACTION_FPS,
            output_stem: "frame".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_table() -> FileTypeTable {
        FileTypeTable {
            video_file: vec![".mp4".to_string(), ".mkv".to_string()],
            image_file: vec![".jpg".to_string(), ".png".to_string()],
        }
    }

    #[test]
    fn test_is_video_file() {
        let table = test_table();
        assert!(table.is_video_file(Path::new("/videos/a.mp4")));
        assert!(table.is_video_file(Path::new("/videos/A.MKV")));
        assert!(!table.is_video_file(Path::new("/videos/a.jpg")));
        assert!(!table.is_video_file(Path::new("/videos/noext")));
    }

    #[test]
    fn test_is_image_file() {
        let table = test_table();
        assert!(table.is_image_file(Path::new("frame_00001.jpg")));
        assert!(table.is_image_file(Path::new("frame_00001.PNG")));
        assert!(!table.is_image_file(Path::new("frame_00001.mp4")));
    }

    #[test]
    fn test_user_settings_default() {
        let settings = UserSettings::default();
        assert!(settings.recent_paths.is_empty());
        assert!(settings.worker_count.is_none());
        assert_eq!(settings.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(settings.extraction_fps, DEFAULT_EXTRACTION_FPS);
        assert_eq!(settings.output_stem, "frame");
    }
}
