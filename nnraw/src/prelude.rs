pub use super::dataset::{convert, ConvertConfig, ConvertReport, DatasetLayout, Stage, Stages};
pub use super::overlay::{overlay_folder, OverlayConfig};
pub use super::prep::imgio::{DecodeOptions, IMAGE_EXTENSIONS};
pub use super::prep::{AccTimer, BACKGROUND, FOREGROUND, MAX_INTENSITY, SENTINEL};
pub use super::remap::{remap_file, remap_folder, RemapConfig};
pub use super::verify::{check_layout, verify_labels, LayoutReport, VerificationReport};
pub use super::{BatchSummary, PrepError, Result};
