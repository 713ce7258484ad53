//! Rendering modes selectable at runtime.

use std::fmt;

/// Which branch of the cartoon pipeline produces the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Pass the source frame through untouched
    Original,
    /// White canvas with the black outline map
    Edge,
    /// Flat colour masked by a despeckled outline map
    ReduceNoise,
    /// Smoothed grayscale with black outlines
    BlackAndWhite,
    /// Flat colour with black outlines
    #[default]
    Normal,
}

impl Mode {
    /// Every mode, in the order the help legend lists their keys.
    pub const ALL: [Mode; 5] = [
        Mode::Normal,
        Mode::BlackAndWhite,
        Mode::Edge,
        Mode::ReduceNoise,
        Mode::Original,
    ];

    /// Internal label, also used as the prefix of saved filenames.
    ///
    /// `Original` has an empty label.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Original => "",
            Mode::Edge => "edge",
            Mode::ReduceNoise => "reduceNoise",
            Mode::BlackAndWhite => "blackAndWhite",
            Mode::Normal => "normal",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Original => f.write_str("original"),
            other => f.write_str(other.label()),
        }
    }
}
