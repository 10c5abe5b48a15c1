pub mod export;
pub mod format;
