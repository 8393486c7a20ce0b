mod analyzer;
mod laplacian;

pub use analyzer::SharpnessAnalyzer;
pub use laplacian::score_image;
