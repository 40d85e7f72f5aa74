//! Placement and classification of candidate files.
//!
//! # Responsibility
//! - Decide *where* a new file reference is rooted (`tree_resolver`).
//! - Decide *what kind* of file it is and which phase it joins
//!   (`file_classifier`).
//! - Isolate the single filesystem query the engine makes (`fs_probe`).

pub mod file_classifier;
pub mod fs_probe;
pub mod tree_resolver;
