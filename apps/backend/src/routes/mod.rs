pub mod lessons;
pub mod preferences;
pub mod sessions;
