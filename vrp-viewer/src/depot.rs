//! Depot placement.

use crate::surface::{LayerId, MapSurface, Marker};
use crate::{Coordinate, ViewerError};

/// Holds the current depot and the marker drawn for it.
#[derive(Debug, Default)]
pub struct DepotSelector {
    depot: Option<Coordinate>,
    marker: Option<LayerId>,
}

impl DepotSelector {
    /// Current depot, if one was placed.
    pub fn depot(&self) -> Option<Coordinate> {
        self.depot
    }

    /// Moves the depot to `at`, replacing the previous marker.
    ///
    /// The previous marker stays registered until the surface confirms its removal, so a failed
    /// placement is retried on the next call instead of leaving an orphaned marker on the map.
    pub fn place(
        &mut self,
        surface: &mut dyn MapSurface,
        at: Coordinate,
    ) -> Result<Coordinate, ViewerError> {
        if let Some(marker) = self.marker {
            surface.remove_marker(marker)?;
            self.marker = None;
        }

        // No marker on the map means no depot.
        self.depot = None;
        self.marker = Some(surface.add_marker(&Marker::depot(at))?);
        self.depot = Some(at);

        Ok(at)
    }
}
