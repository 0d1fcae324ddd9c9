//! The rendering capability the viewer draws through.
//!
//! [`MapSurface`] is intentionally small: it only knows how to add and remove polylines and
//! markers. Everything that decides *what* is drawn lives in the controller, the
//! [route renderer](crate::routes::RouteRenderer) and the [overlay loader](crate::overlay), so
//! that logic can run against [`testing::RecordingSurface`] instead of a real map widget.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{Color, Coordinate, ViewerError};

/// Identifier of a line or marker added to a [`MapSurface`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LayerId(u64);

impl LayerId {
    /// Returns a new id, unique for the running process.
    pub fn next_id() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Stroke parameters of a polyline.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LineStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub weight: f64,
    /// Stroke opacity in `0.0..=1.0`.
    pub opacity: f64,
}

impl LineStyle {
    /// Road network overlay style.
    pub const ROAD: LineStyle = LineStyle {
        color: Color::GRAY,
        weight: 1.0,
        opacity: 0.7,
    };

    /// Style of a solver route drawn with the given color.
    pub const fn route(color: Color) -> Self {
        Self {
            color,
            weight: 4.0,
            opacity: 0.7,
        }
    }

    /// Stroke color with the opacity applied to its alpha channel.
    pub fn effective_color(&self) -> Color {
        self.color.with_opacity(self.opacity)
    }
}

/// Kind of icon a marker is drawn with.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MarkerIcon {
    /// The depot pin.
    Depot,
    /// A taxi rank from the static overlay.
    TaxiRank,
}

/// Point marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Position of the marker.
    pub position: Coordinate,
    /// Icon of the marker.
    pub icon: MarkerIcon,
    /// Text shown when the marker is selected.
    pub popup: Option<String>,
}

impl Marker {
    /// Depot marker at the given position.
    pub fn depot(position: Coordinate) -> Self {
        Self {
            position,
            icon: MarkerIcon::Depot,
            popup: None,
        }
    }
}

/// Map widget capabilities needed by the viewer.
pub trait MapSurface {
    /// Draws a polyline through `points`.
    fn add_line(&mut self, points: &[Coordinate], style: &LineStyle)
        -> Result<LayerId, ViewerError>;

    /// Removes a polyline previously returned by [`MapSurface::add_line`].
    fn remove_line(&mut self, id: LayerId) -> Result<(), ViewerError>;

    /// Draws a marker.
    fn add_marker(&mut self, marker: &Marker) -> Result<LayerId, ViewerError>;

    /// Removes a marker previously returned by [`MapSurface::add_marker`].
    fn remove_marker(&mut self, id: LayerId) -> Result<(), ViewerError>;

    /// Removes all the given polylines.
    ///
    /// A failed removal does not stop the rest; the first error is returned once all ids were
    /// tried.
    fn clear_lines(&mut self, ids: &[LayerId]) -> Result<(), ViewerError> {
        let mut result = Ok(());
        for id in ids {
            if let Err(err) = self.remove_line(*id) {
                if result.is_ok() {
                    result = Err(err);
                }
            }
        }

        result
    }
}

/// In-memory [`MapSurface`] for tests and headless use.
pub mod testing {
    use super::*;

    /// Polyline stored by [`RecordingSurface`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedLine {
        /// Id returned from `add_line`.
        pub id: LayerId,
        /// Points of the line.
        pub points: Vec<Coordinate>,
        /// Style of the line.
        pub style: LineStyle,
    }

    /// Surface operation, in the order it was applied.
    #[derive(Debug, Clone, PartialEq)]
    pub enum SurfaceOp {
        /// A line was added.
        AddLine(LayerId),
        /// A line was removed.
        RemoveLine(LayerId),
        /// A marker was added.
        AddMarker(LayerId),
        /// A marker was removed.
        RemoveMarker(LayerId),
    }

    /// Surface that keeps everything drawn on it in memory.
    #[derive(Debug, Default)]
    pub struct RecordingSurface {
        lines: Vec<RecordedLine>,
        markers: Vec<(LayerId, Marker)>,
        log: Vec<SurfaceOp>,
        fail: bool,
    }

    impl RecordingSurface {
        /// Makes all following operations fail with [`ViewerError::Rendering`] while `fail` is set.
        pub fn set_failing(&mut self, fail: bool) {
            self.fail = fail;
        }

        /// Currently drawn lines.
        pub fn lines(&self) -> &[RecordedLine] {
            &self.lines
        }

        /// Currently drawn markers with the given icon.
        pub fn markers(&self, icon: MarkerIcon) -> Vec<&Marker> {
            self.markers
                .iter()
                .map(|(_, marker)| marker)
                .filter(|marker| marker.icon == icon)
                .collect()
        }

        /// All operations applied to the surface so far.
        pub fn operations(&self) -> &[SurfaceOp] {
            &self.log
        }

        fn check(&self) -> Result<(), ViewerError> {
            if self.fail {
                Err(ViewerError::Rendering("surface is unavailable".into()))
            } else {
                Ok(())
            }
        }
    }

    impl MapSurface for RecordingSurface {
        fn add_line(
            &mut self,
            points: &[Coordinate],
            style: &LineStyle,
        ) -> Result<LayerId, ViewerError> {
            self.check()?;
            let id = LayerId::next_id();
            self.lines.push(RecordedLine {
                id,
                points: points.to_vec(),
                style: *style,
            });
            self.log.push(SurfaceOp::AddLine(id));
            Ok(id)
        }

        fn remove_line(&mut self, id: LayerId) -> Result<(), ViewerError> {
            self.check()?;
            let index = self
                .lines
                .iter()
                .position(|line| line.id == id)
                .ok_or_else(|| ViewerError::Rendering(format!("unknown line {id:?}")))?;
            self.lines.remove(index);
            self.log.push(SurfaceOp::RemoveLine(id));
            Ok(())
        }

        fn add_marker(&mut self, marker: &Marker) -> Result<LayerId, ViewerError> {
            self.check()?;
            let id = LayerId::next_id();
            self.markers.push((id, marker.clone()));
            self.log.push(SurfaceOp::AddMarker(id));
            Ok(id)
        }

        fn remove_marker(&mut self, id: LayerId) -> Result<(), ViewerError> {
            self.check()?;
            let index = self
                .markers
                .iter()
                .position(|(marker_id, _)| *marker_id == id)
                .ok_or_else(|| ViewerError::Rendering(format!("unknown marker {id:?}")))?;
            self.markers.remove(index);
            self.log.push(SurfaceOp::RemoveMarker(id));
            Ok(())
        }
    }
}
