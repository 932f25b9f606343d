// Configuration loading

pub mod settings;

pub use settings::{AlignmentSetting, MergeSettings, Settings};
