//! Interaction state of the viewer: depot, routes and status.
//!
//! [`ViewerController`] is driven by the UI loop. Solving is split into [`begin_solve`] and
//! [`complete_solve`] so that the request itself can run on a background task while the UI keeps
//! processing events. Every solve and every depot change bumps a request generation; a response
//! that arrives for an older generation is dropped, so a slow answer can never overwrite the
//! routes of a newer request.
//!
//! [`begin_solve`]: ViewerController::begin_solve
//! [`complete_solve`]: ViewerController::complete_solve

use crate::depot::DepotSelector;
use crate::routes::RouteRenderer;
use crate::solver::{SolveRequest, SolverClient};
use crate::surface::MapSurface;
use crate::{Coordinate, Route, StatusMessage, ViewerError};

const SOLVING_MESSAGE: &str = "Solving VRP...";
const DEPOT_ERROR_MESSAGE: &str = "Error setting depot!";

/// Handle of a solve request started by [`ViewerController::begin_solve`].
#[derive(Debug, Clone)]
pub struct SolveTicket {
    generation: u64,
    request: SolveRequest,
}

impl SolveTicket {
    /// Request to send to the solver.
    pub fn request(&self) -> &SolveRequest {
        &self.request
    }
}

/// What [`ViewerController::complete_solve`] did with a solver outcome.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SolveCompletion {
    /// The outcome was shown to the user.
    Applied,
    /// A newer solve or depot change happened since the request was sent; the outcome was dropped.
    Stale,
}

/// Owns the interaction state and applies user actions to a [`MapSurface`].
#[derive(Debug, Default)]
pub struct ViewerController {
    depot: DepotSelector,
    routes: RouteRenderer,
    status: StatusMessage,
    generation: u64,
    pending: Option<u64>,
}

impl ViewerController {
    /// Creates a controller with no depot and the initial prompt as status.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status message.
    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    /// Current depot.
    pub fn depot(&self) -> Option<Coordinate> {
        self.depot.depot()
    }

    /// Whether the solve command should be enabled.
    pub fn can_solve(&self) -> bool {
        self.depot().is_some()
    }

    /// Returns true while a solve request is waiting for its response.
    pub fn is_solving(&self) -> bool {
        self.pending.is_some()
    }

    /// Number of routes currently drawn.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Handles a click on the map: moves the depot to `at`.
    ///
    /// Drawn routes are cleared and any solve in flight is abandoned, since its routes were
    /// computed for the previous depot.
    pub fn select_depot(&mut self, surface: &mut dyn MapSurface, at: Coordinate) {
        self.abandon_pending();
        self.routes.clear(surface);

        match self.depot.place(surface, at) {
            Ok(depot) => self.set_status(StatusMessage::success(format!(
                "Depot set at {depot}. Click Solve VRP!"
            ))),
            Err(err) => {
                log::error!("Failed to set depot at {at}: {err}");
                self.set_status(StatusMessage::error(DEPOT_ERROR_MESSAGE));
            }
        }
    }

    /// Starts a solve for the current depot.
    ///
    /// Returns `None` and sets an error status if no depot is placed. Otherwise clears the drawn
    /// routes and returns the ticket to pass to [`ViewerController::complete_solve`] once the
    /// solver answers.
    pub fn begin_solve(&mut self, surface: &mut dyn MapSurface) -> Option<SolveTicket> {
        let Some(depot) = self.depot() else {
            self.set_status(StatusMessage::error(ViewerError::NoDepot.to_string()));
            return None;
        };

        if self.pending.is_some() {
            log::debug!("Solve requested while another one is in flight; the older one is dropped");
        }

        self.routes.clear(surface);
        self.generation += 1;
        self.pending = Some(self.generation);
        self.set_status(StatusMessage::success(SOLVING_MESSAGE));

        Some(SolveTicket {
            generation: self.generation,
            request: SolveRequest::new(depot),
        })
    }

    /// Applies the solver outcome for `ticket`.
    pub fn complete_solve(
        &mut self,
        surface: &mut dyn MapSurface,
        ticket: SolveTicket,
        outcome: Result<Vec<Route>, ViewerError>,
    ) -> SolveCompletion {
        if self.pending != Some(ticket.generation) {
            log::debug!(
                "Dropping solver response for request {} (current is {})",
                ticket.generation,
                self.generation
            );
            return SolveCompletion::Stale;
        }

        self.pending = None;

        let drawn = outcome.and_then(|routes| {
            self.routes.draw(surface, &routes)?;
            Ok(routes.len())
        });

        match drawn {
            Ok(count) => {
                self.set_status(StatusMessage::success(format!(
                    "Solved! {count} routes found."
                )));
            }
            Err(err) => {
                log::error!("Solve failed: {err}");
                self.set_status(StatusMessage::error(format!("Error: {err}")));
            }
        }

        SolveCompletion::Applied
    }

    /// Runs a whole solve round trip with `client`.
    ///
    /// Returns `None` if no request was sent because there is no depot.
    pub async fn solve<C>(
        &mut self,
        surface: &mut dyn MapSurface,
        client: &C,
    ) -> Option<SolveCompletion>
    where
        C: SolverClient + ?Sized,
    {
        let ticket = self.begin_solve(surface)?;
        let outcome = client.solve(ticket.request()).await;
        Some(self.complete_solve(surface, ticket, outcome))
    }

    fn abandon_pending(&mut self) {
        if let Some(generation) = self.pending.take() {
            log::debug!("Abandoning solve request {generation}");
            self.generation += 1;
        }
    }

    fn set_status(&mut self, status: StatusMessage) {
        log::debug!("Status: {}", status.text());
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use reqwest::StatusCode;

    use super::*;
    use crate::solver::interpret_response;
    use crate::surface::testing::{RecordingSurface, SurfaceOp};
    use crate::{MarkerIcon, StatusKind};

    const LISBON: Coordinate = Coordinate::new(38.7223, -9.1393);

    struct FakeSolver<F> {
        respond: F,
        calls: AtomicUsize,
    }

    impl<F> FakeSolver<F>
    where
        F: Fn(&SolveRequest) -> Result<Vec<Route>, ViewerError> + Send + Sync,
    {
        fn new(respond: F) -> Self {
            Self {
                respond,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait::async_trait]
    impl<F> SolverClient for FakeSolver<F>
    where
        F: Fn(&SolveRequest) -> Result<Vec<Route>, ViewerError> + Send + Sync,
    {
        async fn solve(&self, request: &SolveRequest) -> Result<Vec<Route>, ViewerError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            (self.respond)(request)
        }
    }

    fn two_routes() -> Vec<Route> {
        interpret_response(
            StatusCode::OK,
            br#"{"status":"success","routes":[[[0,0],[1,1]],[[2,2],[3,3]]]}"#,
        )
        .unwrap()
    }

    #[test]
    fn initial_state() {
        let controller = ViewerController::new();

        assert_eq!(controller.depot(), None);
        assert!(!controller.can_solve());
        assert!(!controller.is_solving());
        assert_eq!(controller.status().kind(), StatusKind::Success);
    }

    #[test]
    fn select_depot_places_marker_and_enables_solve() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();

        controller.select_depot(&mut surface, LISBON);

        assert_eq!(controller.depot(), Some(LISBON));
        assert!(controller.can_solve());
        assert_eq!(
            controller.status(),
            &StatusMessage::success("Depot set at 38.7223, -9.1393. Click Solve VRP!")
        );
        assert_eq!(surface.markers(MarkerIcon::Depot)[0].position, LISBON);
    }

    #[test]
    fn repeated_clicks_leave_one_marker_at_last_click() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();

        let clicks = [
            Coordinate::new(38.70, -9.10),
            Coordinate::new(38.71, -9.20),
            Coordinate::new(38.72, -9.30),
        ];
        for click in clicks {
            controller.select_depot(&mut surface, click);
        }

        let markers = surface.markers(MarkerIcon::Depot);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].position, clicks[2]);
    }

    #[test]
    fn new_depot_clears_routes_before_marker_appears() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();
        controller.select_depot(&mut surface, LISBON);
        let solver = FakeSolver::new(|_| Ok(two_routes()));
        tokio_test::block_on(controller.solve(&mut surface, &solver));
        assert_eq!(surface.lines().len(), 2);

        let ops_before = surface.operations().len();
        controller.select_depot(&mut surface, Coordinate::new(38.75, -9.15));

        assert!(surface.lines().is_empty());
        assert_eq!(controller.route_count(), 0);
        let ops = &surface.operations()[ops_before..];
        assert_matches!(
            ops,
            [
                SurfaceOp::RemoveLine(_),
                SurfaceOp::RemoveLine(_),
                SurfaceOp::RemoveMarker(_),
                SurfaceOp::AddMarker(_)
            ]
        );
    }

    #[test]
    fn solve_without_depot_sends_nothing() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();
        let solver = FakeSolver::new(|_| Ok(vec![]));

        let result = tokio_test::block_on(controller.solve(&mut surface, &solver));

        assert_eq!(result, None);
        assert_eq!(solver.calls(), 0);
        assert_eq!(
            controller.status(),
            &StatusMessage::error("Please set a depot first!")
        );
    }

    #[test]
    fn begin_solve_sets_progress_status_and_request() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();
        controller.select_depot(&mut surface, LISBON);

        let ticket = controller.begin_solve(&mut surface).unwrap();

        assert_eq!(ticket.request().depot, LISBON);
        assert!(controller.is_solving());
        assert_eq!(controller.status(), &StatusMessage::success("Solving VRP..."));
    }

    #[test]
    fn successful_solve_draws_routes() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();
        controller.select_depot(&mut surface, LISBON);
        let solver = FakeSolver::new(|request| {
            assert_eq!(request.depot, LISBON);
            Ok(two_routes())
        });

        let result = tokio_test::block_on(controller.solve(&mut surface, &solver));

        assert_eq!(result, Some(SolveCompletion::Applied));
        assert_eq!(solver.calls(), 1);
        let colors: Vec<_> = surface
            .lines()
            .iter()
            .map(|line| line.style.color.to_hex())
            .collect();
        assert_eq!(colors, ["#FF0000", "#00FF00"]);
        assert_eq!(
            controller.status(),
            &StatusMessage::success("Solved! 2 routes found.")
        );
        assert!(!controller.is_solving());
    }

    #[test]
    fn solver_error_with_ok_status_shows_message() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();
        controller.select_depot(&mut surface, LISBON);
        let solver = FakeSolver::new(|_| {
            interpret_response(StatusCode::OK, br#"{"status":"error","message":"no depot"}"#)
        });

        tokio_test::block_on(controller.solve(&mut surface, &solver));

        assert!(controller.status().is_error());
        assert_eq!(controller.status().text(), "Error: no depot");
        assert!(surface.lines().is_empty());
    }

    #[test]
    fn network_failure_shows_message() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();
        controller.select_depot(&mut surface, LISBON);
        let solver =
            FakeSolver::new(|_| Err(ViewerError::Network("error sending request".into())));

        tokio_test::block_on(controller.solve(&mut surface, &solver));

        assert_eq!(
            controller.status(),
            &StatusMessage::error("Error: error sending request")
        );
        assert!(!controller.is_solving());
    }

    #[test]
    fn solving_again_clears_previous_routes() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();
        controller.select_depot(&mut surface, LISBON);
        let solver = FakeSolver::new(|_| Ok(two_routes()));
        tokio_test::block_on(controller.solve(&mut surface, &solver));

        controller.begin_solve(&mut surface).unwrap();

        assert!(surface.lines().is_empty());
        assert_eq!(controller.route_count(), 0);
    }

    #[test]
    fn older_response_is_dropped_when_solve_is_repeated() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();
        controller.select_depot(&mut surface, LISBON);

        let first = controller.begin_solve(&mut surface).unwrap();
        let second = controller.begin_solve(&mut surface).unwrap();

        let late_first = controller.complete_solve(&mut surface, first, Ok(two_routes()));
        assert_eq!(late_first, SolveCompletion::Stale);
        assert!(surface.lines().is_empty());
        assert_eq!(controller.status(), &StatusMessage::success("Solving VRP..."));

        let second_result = controller.complete_solve(
            &mut surface,
            second,
            Ok(vec![Route::new(vec![LISBON])]),
        );
        assert_eq!(second_result, SolveCompletion::Applied);
        assert_eq!(surface.lines().len(), 1);
        assert_eq!(
            controller.status(),
            &StatusMessage::success("Solved! 1 routes found.")
        );
    }

    #[test]
    fn response_after_depot_change_is_dropped() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();
        controller.select_depot(&mut surface, LISBON);
        let ticket = controller.begin_solve(&mut surface).unwrap();

        controller.select_depot(&mut surface, Coordinate::new(38.75, -9.15));
        let result = controller.complete_solve(&mut surface, ticket, Ok(two_routes()));

        assert_eq!(result, SolveCompletion::Stale);
        assert!(surface.lines().is_empty());
        assert!(!controller.is_solving());
        assert_eq!(
            controller.status(),
            &StatusMessage::success("Depot set at 38.7500, -9.1500. Click Solve VRP!")
        );
    }

    #[test]
    fn depot_rendering_failure_sets_error_status() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();
        surface.set_failing(true);

        controller.select_depot(&mut surface, LISBON);

        assert_eq!(
            controller.status(),
            &StatusMessage::error("Error setting depot!")
        );
        assert!(!controller.can_solve());
    }

    #[test]
    fn route_rendering_failure_sets_error_status() {
        let mut surface = RecordingSurface::default();
        let mut controller = ViewerController::new();
        controller.select_depot(&mut surface, LISBON);
        let ticket = controller.begin_solve(&mut surface).unwrap();

        surface.set_failing(true);
        controller.complete_solve(&mut surface, ticket, Ok(two_routes()));

        assert!(controller.status().is_error());
        assert!(controller.status().text().starts_with("Error: rendering failed"));
    }
}
