mod main;

pub use main::{OutputWriter, SaveSummary};
