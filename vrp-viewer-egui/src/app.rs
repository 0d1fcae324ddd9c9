use std::sync::Arc;

use egui::{Button, Color32, RichText};
use galileo::control::{EventPropagation, MouseButton, UserEvent, UserEventHandler};
use galileo::Map;
use galileo_egui::{EguiMap, EguiMapState};
use galileo_types::geo::GeoPoint;
use parking_lot::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use vrp_viewer::overlay::{Overlay, OverlayKind, OverlayLoader, StaticOverlays};
use vrp_viewer::{
    platform, Color, Coordinate, HttpSolverClient, Route, SolveTicket, SolverClient,
    ViewerController, ViewerError,
};

use crate::surface::GalileoSurface;

/// Screen distance from a taxi rank within which a click opens its popup instead of moving the
/// depot.
const PICK_RADIUS_PX: f64 = 8.0;

/// Left click on the map, converted to geographic coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MapClick {
    /// Clicked location.
    pub position: Coordinate,
    /// Ground distance in meters that corresponds to [`PICK_RADIUS_PX`] at the current zoom.
    pub pick_tolerance_m: f64,
}

/// Clicks caught by the map event handler and not yet processed by the UI loop.
#[derive(Debug, Clone, Default)]
pub struct ClickQueue(Arc<Mutex<Vec<MapClick>>>);

impl ClickQueue {
    /// Event handler that records left clicks into the queue.
    pub fn handler(&self) -> impl UserEventHandler {
        let queue = self.0.clone();
        move |ev: &UserEvent, map: &mut Map| {
            if let UserEvent::Click(MouseButton::Left, event) = ev {
                let view = map.view();
                let Some(position) = view.screen_to_map_geo(event.screen_pointer_position) else {
                    return EventPropagation::Stop;
                };

                let position = Coordinate::new(position.lat(), position.lon());
                queue.lock().push(MapClick {
                    position,
                    pick_tolerance_m: pick_tolerance_m(view.resolution(), position.lat),
                });

                return EventPropagation::Stop;
            }

            EventPropagation::Propagate
        }
    }

    fn drain(&self) -> Vec<MapClick> {
        std::mem::take(&mut *self.0.lock())
    }
}

// Web mercator resolution is in projected meters per pixel; they shrink by cos(lat) on the ground.
fn pick_tolerance_m(resolution: f64, lat: f64) -> f64 {
    resolution * lat.to_radians().cos() * PICK_RADIUS_PX
}

/// Result of a background task.
enum AppEvent {
    Solved(SolveTicket, Result<Vec<Route>, ViewerError>),
    OverlayLoaded(OverlayKind, Result<Overlay, ViewerError>),
}

/// The viewer window: a control bar with the solve button and status above the map.
pub struct ViewerApp {
    map: EguiMapState,
    surface: GalileoSurface,
    clicks: ClickQueue,
    controller: ViewerController,
    overlays: StaticOverlays,
    solver: Arc<HttpSolverClient>,
    overlay_loader: Option<OverlayLoader>,
    events_tx: UnboundedSender<AppEvent>,
    events_rx: UnboundedReceiver<AppEvent>,
    popup: Option<String>,
}

impl ViewerApp {
    /// Creates the app. Overlays start loading on the first frame.
    pub fn new(
        map: EguiMapState,
        surface: GalileoSurface,
        clicks: ClickQueue,
        solver: HttpSolverClient,
        overlay_loader: OverlayLoader,
    ) -> Self {
        log::info!("Using VRP solver at {}", solver.url());

        let (events_tx, events_rx) = unbounded_channel();
        Self {
            map,
            surface,
            clicks,
            controller: ViewerController::new(),
            overlays: StaticOverlays::default(),
            solver: Arc::new(solver),
            overlay_loader: Some(overlay_loader),
            events_tx,
            events_rx,
            popup: None,
        }
    }

    fn start_overlay_loads(&mut self, ctx: &egui::Context) {
        let Some(loader) = self.overlay_loader.take() else {
            return;
        };

        let loader = Arc::new(loader);
        for kind in [OverlayKind::Roads, OverlayKind::TaxiRanks] {
            log::info!("Loading {kind} from {}", loader.url(kind));

            let loader = loader.clone();
            let events_tx = self.events_tx.clone();
            let ctx = ctx.clone();
            platform::spawn(async move {
                let result = loader.load(kind).await;
                if events_tx.send(AppEvent::OverlayLoaded(kind, result)).is_ok() {
                    ctx.request_repaint();
                }
            });
        }
    }

    fn start_solve(&mut self, ctx: &egui::Context) {
        let Some(ticket) = self.controller.begin_solve(&mut self.surface) else {
            return;
        };

        let solver = self.solver.clone();
        let events_tx = self.events_tx.clone();
        let ctx = ctx.clone();
        platform::spawn(async move {
            let outcome = solver.solve(ticket.request()).await;
            if events_tx.send(AppEvent::Solved(ticket, outcome)).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    fn handle_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                AppEvent::Solved(ticket, outcome) => {
                    self.controller
                        .complete_solve(&mut self.surface, ticket, outcome);
                }
                AppEvent::OverlayLoaded(kind, result) => {
                    self.overlays.apply(&mut self.surface, kind, result);
                }
            }
        }
    }

    fn handle_clicks(&mut self) {
        for click in self.clicks.drain() {
            if let Some(rank) = self
                .overlays
                .pick_taxi_rank(click.position, click.pick_tolerance_m)
            {
                self.popup = Some(rank.popup());
                continue;
            }

            self.popup = None;
            self.controller
                .select_depot(&mut self.surface, click.position);
        }
    }

    fn show_controls(&self, ui: &mut egui::Ui) -> bool {
        let mut solve_clicked = false;
        ui.horizontal(|ui| {
            solve_clicked = ui
                .add_enabled(self.controller.can_solve(), Button::new("Solve VRP"))
                .clicked();

            let status = self.controller.status();
            ui.label(RichText::new(status.text()).color(egui_color(status.color())));

            if self.controller.is_solving() {
                ui.spinner();
            }
        });

        solve_clicked
    }

    fn show_popup(&mut self, ctx: &egui::Context) {
        let Some(text) = &self.popup else {
            return;
        };

        let mut open = true;
        egui::Window::new("Taxi rank")
            .open(&mut open)
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::LEFT_BOTTOM, [10., -10.])
            .show(ctx, |ui| {
                ui.label(text.as_str());
            });

        if !open {
            self.popup = None;
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.start_overlay_loads(ctx);
        self.handle_events();
        self.handle_clicks();

        let solve_clicked = egui::TopBottomPanel::top("controls")
            .show(ctx, |ui| self.show_controls(ui))
            .inner;
        if solve_clicked {
            self.start_solve(ctx);
        }

        if self.surface.take_changed() {
            self.map.request_redraw();
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::default())
            .show(ctx, |ui| {
                EguiMap::new(&mut self.map).show_ui(ui);
            });

        self.show_popup(ctx);
    }
}

fn egui_color(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), color.a())
}
