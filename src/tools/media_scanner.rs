use crate::config::FileTypeTable;
use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct MediaFileInfo {
    pub path: PathBuf,
    pub size: u64,
}

/// 掃描目錄下的影片檔案（不遞迴），依檔名排序
pub fn scan_video_files(directory: &Path, table: &FileTypeTable) -> Result<Vec<MediaFileInfo>> {
    scan_by_filter(directory, &|path| table.is_video_file(path))
}

/// 掃描目錄下的影像檔案（不遞迴），依檔名排序
///
/// 檔名順序就是影格的時間順序，後續選取演算法以此為準
pub fn scan_image_files(directory: &Path, table: &FileTypeTable) -> Result<Vec<MediaFileInfo>> {
    scan_by_filter(directory, &|path| table.is_image_file(path))
}

fn scan_by_filter(
    directory: &Path,
    matches: &dyn Fn(&Path) -> bool,
) -> Result<Vec<MediaFileInfo>> {
    let mut files: Vec<MediaFileInfo> = WalkDir::new(directory)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| matches(entry.path()))
        .filter_map(|entry| {
            let metadata = entry.metadata().ok()?;
            Some(MediaFileInfo {
                path: entry.into_path(),
                size: metadata.len(),
            })
        })
        .collect();

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}
