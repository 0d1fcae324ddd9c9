//! Drawing of solver routes.

use crate::surface::{LayerId, LineStyle, MapSurface};
use crate::{Color, Route, ViewerError};

/// Colors routes are drawn with. Route `i` gets `PALETTE[i % PALETTE.len()]`.
pub const PALETTE: [Color; 4] = [Color::RED, Color::GREEN, Color::BLUE, Color::MAGENTA];

/// Style of the route at the given position in the solver response.
pub fn route_style(index: usize) -> LineStyle {
    LineStyle::route(PALETTE[index % PALETTE.len()])
}

/// Keeps track of the route lines currently drawn on a surface.
#[derive(Debug, Default)]
pub struct RouteRenderer {
    drawn: Vec<LayerId>,
}

impl RouteRenderer {
    /// Replaces the drawn routes with `routes`.
    ///
    /// Routes are not validated: an empty list draws nothing, and empty or single point routes
    /// are handed to the surface as is.
    pub fn draw(
        &mut self,
        surface: &mut dyn MapSurface,
        routes: &[Route],
    ) -> Result<(), ViewerError> {
        self.clear(surface);

        for (index, route) in routes.iter().enumerate() {
            let id = surface.add_line(route.points(), &route_style(index))?;
            self.drawn.push(id);
        }

        log::trace!("Drew {} routes", self.drawn.len());

        Ok(())
    }

    /// Removes all drawn routes from the surface.
    ///
    /// The registry is emptied even if the surface fails to remove some of the lines, since a
    /// line that cannot be removed cannot be removed on the next attempt either.
    pub fn clear(&mut self, surface: &mut dyn MapSurface) {
        let drawn = std::mem::take(&mut self.drawn);
        if let Err(err) = surface.clear_lines(&drawn) {
            log::error!("Failed to remove route lines: {err}");
        }
    }

    /// Number of routes currently drawn.
    pub fn len(&self) -> usize {
        self.drawn.len()
    }

    /// Returns true if no routes are drawn.
    pub fn is_empty(&self) -> bool {
        self.drawn.is_empty()
    }
}
