//! CLI argument parsing with clap.

use clap::Parser;
use std::path::PathBuf;

/// Cartoonish camera effect
#[derive(Parser, Debug)]
#[command(name = "cartoon-camera")]
#[command(version, about = "A simple program to create a cartoonish camera effect")]
#[command(after_help = "KEYS:
    n  normal cartoon        b  black and white cartoon
    e  edge cartoon          r  noise reduction
    o  original image        s  save image
    q  quit

Settings such as the camera device and save directory are read from
<config dir>/cartoon-camera/config.toml, or the file named by
CARTOON_CAMERA_CONFIG.")]
pub struct Args {
    /// Create a cartoon image from the image at PATH instead of the camera
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,
}
