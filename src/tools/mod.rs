mod media_scanner;
mod path_validator;
mod progress;
mod video_info;

pub use media_scanner::{MediaFileInfo, scan_image_files, scan_video_files};
pub use path_validator::{ensure_directory_exists, validate_directory_exists, validate_file_exists};
pub use progress::{ConsoleProgress, NullProgress, Phase, ProgressSink, ProgressUpdate};
pub use video_info::{VideoInfo, get_video_info};
