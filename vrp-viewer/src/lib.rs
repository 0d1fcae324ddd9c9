//! Core of the VRP route viewer: everything between a user clicking a map and routes appearing
//! on it, without depending on any particular map widget.
//!
//! # Main components
//!
//! * [`MapSurface`] is the rendering capability the rest of the crate draws through. It can add
//!   and remove lines and markers, nothing else. The application implements it over galileo
//!   feature layers; tests use [`surface::testing::RecordingSurface`].
//! * [`ViewerController`] owns the interaction state: the current depot, the drawn routes and the
//!   status message. All of its methods take `&mut self` and are meant to be called from the UI
//!   loop only.
//! * [`SolverClient`] sends a [`SolveRequest`] to the external solver and turns the answer into a
//!   list of [`Route`]s. [`HttpSolverClient`] is the `POST /solve-vrp` implementation.
//! * [`overlay`] loads the static road network and taxi rank GeoJSON documents.
//!
//! A solve round trip from an event loop looks like this:
//!
//! ```no_run
//! use vrp_viewer::{Coordinate, SolverClient, ViewerController};
//! use vrp_viewer::surface::testing::RecordingSurface;
//! # use vrp_viewer::HttpSolverClient;
//!
//! # tokio_test::block_on(async {
//! # let client = HttpSolverClient::new("http://localhost:5000/solve-vrp".parse().unwrap());
//! let mut surface = RecordingSurface::default();
//! let mut controller = ViewerController::new();
//!
//! controller.select_depot(&mut surface, Coordinate::new(38.7223, -9.1393));
//!
//! if let Some(ticket) = controller.begin_solve(&mut surface) {
//!     // Usually spawned on a background task, see `platform::spawn`.
//!     let outcome = client.solve(ticket.request()).await;
//!     controller.complete_solve(&mut surface, ticket, outcome);
//! }
//!
//! println!("{}", controller.status().text());
//! # });
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

mod color;
pub mod config;
pub mod controller;
pub mod depot;
pub mod error;
mod geo;
pub mod overlay;
pub mod platform;
pub mod routes;
pub mod solver;
mod status;
pub mod surface;

pub use color::Color;
pub use config::ViewerConfig;
pub use controller::{SolveCompletion, SolveTicket, ViewerController};
pub use error::ViewerError;
pub use geo::{Coordinate, Route};
pub use solver::{HttpSolverClient, SolveRequest, SolverClient};
pub use status::{StatusKind, StatusMessage};
pub use surface::{LayerId, LineStyle, MapSurface, Marker, MarkerIcon};
