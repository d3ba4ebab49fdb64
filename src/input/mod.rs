//! Reference document input
//! Handles file detection, text extraction, and corpus loading

pub mod file_detector;
pub mod text_extractor;
pub mod manager;
