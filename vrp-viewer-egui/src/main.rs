#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), vrp_viewer_egui::AppError> {
    let config = vrp_viewer::ViewerConfig::from_env()?;
    vrp_viewer_egui::run(config)
}

#[cfg(target_arch = "wasm32")]
fn main() {}
