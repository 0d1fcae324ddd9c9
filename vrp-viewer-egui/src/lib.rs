//! VRP route viewer window: a galileo map of Lisbon with depot selection, a solve button and the
//! solver routes drawn on top.
//!
//! The same code runs as a native application (see the `vrp-viewer` binary) and in the browser,
//! where the `main` function exported through `wasm-bindgen` starts it on the `the_canvas_id`
//! canvas of the page.

use galileo::control::UserEventHandler;
use galileo::layer::raster_tile_layer::RasterTileLayerBuilder;
use galileo::{Map, MapBuilder};
use thiserror::Error;
use vrp_viewer::overlay::OverlayLoader;
use vrp_viewer::{HttpSolverClient, ViewerConfig, ViewerError};

mod app;
mod surface;

pub use app::{ClickQueue, MapClick, ViewerApp};
pub use surface::GalileoSurface;

/// Failure to start the viewer.
#[derive(Debug, Error)]
pub enum AppError {
    /// The configuration could not be loaded or used.
    #[error(transparent)]
    Viewer(#[from] ViewerError),
    /// The window or the rendering context could not be created.
    #[error("failed to start the UI: {0}")]
    Ui(#[from] eframe::Error),
}

/// Starts the viewer with the given configuration.
///
/// Natively this blocks until the window is closed. In the browser it returns as soon as the
/// application is scheduled.
pub fn run(config: ViewerConfig) -> Result<(), AppError> {
    let solver = HttpSolverClient::new(config.solve_url()?);
    let overlay_loader = OverlayLoader::from_config(&config)?;

    let surface = GalileoSurface::new();
    let map = create_map(&config, &surface)?;

    let clicks = ClickQueue::default();
    let handler = clicks.handler();

    galileo_egui::InitBuilder::new(map)
        .with_handlers([Box::new(handler) as Box<dyn UserEventHandler>])
        .with_app_builder(move |egui_map_state| {
            Box::new(ViewerApp::new(
                egui_map_state,
                surface,
                clicks,
                solver,
                overlay_loader,
            ))
        })
        .init()?;

    Ok(())
}

fn create_map(config: &ViewerConfig, surface: &GalileoSurface) -> Result<Map, ViewerError> {
    let tiles = RasterTileLayerBuilder::new_osm();

    #[cfg(not(target_arch = "wasm32"))]
    let tiles = match &config.tile_cache {
        Some(path) => tiles.with_file_cache_checked(path),
        None => tiles,
    };

    let tiles = tiles
        .build()
        .map_err(|err| ViewerError::Rendering(format!("failed to create tile layer: {err}")))?;

    let builder = MapBuilder::default()
        .with_latlon(config.center.lat, config.center.lng)
        .with_z_level(config.z_level)
        .with_layer(tiles);

    Ok(surface.add_layers(builder).build())
}

/// Browser entry point. The solver and the overlay documents are expected on the origin the page
/// was loaded from.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn main() {
    console_error_panic_hook::set_once();

    let mut config = ViewerConfig::default();
    if let Some(origin) = web_sys::window().and_then(|window| window.location().origin().ok()) {
        config = config.with_base_url(format!("{origin}/"));
    }

    if let Err(err) = run(config) {
        web_sys::console::error_1(&err.to_string().into());
    }
}
