mod frame_data;
mod main;
mod video;

pub use frame_data::{ExtractionResult, Frame, InputType};
pub use main::FrameExtractor;
