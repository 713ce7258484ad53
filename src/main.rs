use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cartoon_camera::camera::{list_devices, CameraError};
use cartoon_camera::cli::Args;
use cartoon_camera::config::Config;
use cartoon_camera::display::WindowPresenter;
use cartoon_camera::save::ImageWriter;
use cartoon_camera::session::{Session, SessionConfig, SessionError};
use cartoon_camera::source::{FrameSource, LiveCamera, SourceError, StillImage};

/// Exit code when no first frame could be acquired.
const EXIT_NO_INPUT: u8 = 2;

/// Route `log` records to stderr, filtered by `RUST_LOG` (default `info`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Open the acquisition source the configuration asks for.
fn open_source(config: &SessionConfig) -> Result<Box<dyn FrameSource>, SourceError> {
    match &config.input {
        Some(path) => {
            log::info!("Reading image {}", path.display());
            Ok(Box::new(StillImage::open(path)?))
        }
        None => {
            log::info!("Opening camera {}", config.camera.device_index);
            Ok(Box::new(LiveCamera::open(config.camera.clone())?))
        }
    }
}

/// Print the available cameras after a device lookup failed.
fn print_camera_hint(error: &SourceError) {
    if let SourceError::Camera(CameraError::DeviceNotFound(_)) = error {
        match list_devices() {
            Ok(devices) if devices.is_empty() => eprintln!("No cameras found."),
            Ok(devices) => {
                eprintln!("Available cameras:");
                for device in devices {
                    eprintln!("  {}", device);
                }
            }
            Err(e) => eprintln!("{}", e),
        }
    }
}

fn run(config: SessionConfig) -> Result<(), SessionError> {
    let source = open_source(&config).map_err(SessionError::AcquisitionUnavailable)?;
    let sink = ImageWriter::new(config.output_dir.clone());
    let session = Session::start(config, source, WindowPresenter::new(), sink)?;
    session.run()
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    let config = match Config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let session_config = SessionConfig::from_config(args.input, &config);

    match run(session_config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(SessionError::AcquisitionUnavailable(e)) => {
            eprintln!("Error: {}", e);
            print_camera_hint(&e);
            ExitCode::from(EXIT_NO_INPUT)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
