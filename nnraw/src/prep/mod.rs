pub mod imgio;
pub mod pixel;
pub mod timer;

pub use imgio::DecodeOptions;
pub use pixel::consts::{BACKGROUND, FOREGROUND, MAX_INTENSITY, SENTINEL};
pub use timer::AccTimer;
