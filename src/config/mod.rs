pub mod load;
pub mod save;
pub mod types;

pub use save::{add_recent_path, save_settings};
pub use types::{
    Config, DEFAULT_CHUNK_SIZE, DEFAULT_EXTRACTION_FPS, FileTypeTable, MAX_RECENT_PATHS,
    UserSettings,
};
