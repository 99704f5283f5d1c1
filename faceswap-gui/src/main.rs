//! Desktop GUI for FaceSwap Studio.

use eframe::NativeOptions;
use faceswap_gui::FaceSwapApp;
use faceswap_utils::init_logging;

fn main() -> eframe::Result<()> {
    if let Err(err) = init_logging(log::LevelFilter::Info) {
        eprintln!("failed to initialize logging: {err:#}");
    }
    let mut options = NativeOptions::default();
    options.viewport = options
        .viewport
        .with_inner_size([1280.0, 800.0])
        .with_min_inner_size([900.0, 560.0])
        .with_drag_and_drop(true);

    eframe::run_native(
        "FaceSwap Studio",
        options,
        Box::new(|cc| Ok(Box::new(FaceSwapApp::new(cc)))),
    )
}
