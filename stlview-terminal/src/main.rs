/// stlview - ASCII STL model viewer for the terminal
///
/// Usage: stlview [path/to/model.stl]
/// Controls:
///   - Left mouse drag: Rotate the model
///   - R: Reset orientation
///   - Q/ESC: Quit
///
/// Diagnostics go to `stlview.log`; set `RUST_LOG=debug` for more detail.
use env_logger::{Env, Target};
use log::{debug, error, info};
use std::env;
use std::fs::File;
use std::process::ExitCode;
use stlview_core::config::{DEFAULT_STL_PATH, LOG_FILE};
use stlview_core::{load_stl, Viewer, ViewerConfig};
use stlview_terminal::TerminalApp;

fn init_logging() -> std::io::Result<()> {
    let file = File::create(LOG_FILE)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn main() -> ExitCode {
    if let Err(e) = init_logging() {
        eprintln!("[FATAL] Could not open log file {}: {}. Exiting.", LOG_FILE, e);
        return ExitCode::FAILURE;
    }
    info!("Application started. Log file: {}", LOG_FILE);

    let path = match env::args().nth(1) {
        Some(path) => {
            debug!("STL filename from args: {}", path);
            path
        }
        None => {
            info!(
                "No command line argument for STL file. Using default: {}",
                DEFAULT_STL_PATH
            );
            DEFAULT_STL_PATH.to_string()
        }
    };

    let config = ViewerConfig::default();

    println!("Loading STL file: {}", path);
    let model = match load_stl(&path, &config.loader) {
        Ok(model) => model,
        Err(e) => {
            error!("{}", e);
            info!("Exiting due to STL load failure.");
            eprintln!("[ERROR] {}", e);
            return ExitCode::FAILURE;
        }
    };

    let report = &model.report;
    println!(
        "Loaded {} faces, {} vertices ({} warnings, see {})",
        model.mesh.face_count(),
        model.mesh.vertex_count(),
        report.warnings.len(),
        LOG_FILE
    );
    println!("Starting terminal viewer (press Q to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let viewer = Viewer::new(model.mesh, &config);
    let result = TerminalApp::new(viewer, config.fps).and_then(|mut app| app.run());

    if let Err(e) = result {
        error!("Terminal error: {}", e);
        eprintln!("[ERROR] Terminal error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Application terminated normally.");
    ExitCode::SUCCESS
}
