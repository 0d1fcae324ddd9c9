//! [`MapSurface`] over galileo feature layers.

use std::sync::Arc;

use ahash::{HashMap, HashMapExt};
use galileo::layer::{FeatureId, FeatureLayer};
use galileo::symbol::{CirclePointSymbol, SimpleContourSymbol};
use galileo::MapBuilder;
use galileo_types::geo::impls::GeoPoint2d;
use galileo_types::geo::{Crs, NewGeoPoint};
use galileo_types::geometry_type::GeoSpace2d;
use galileo_types::impls::Contour;
use galileo_types::Disambig;
use parking_lot::RwLock;
use vrp_viewer::routes::PALETTE;
use vrp_viewer::{
    Color, Coordinate, LayerId, LineStyle, MapSurface, Marker, MarkerIcon, ViewerError,
};

type LineFeature = Disambig<Contour<GeoPoint2d>, GeoSpace2d>;
type LineLayer = FeatureLayer<GeoPoint2d, LineFeature, SimpleContourSymbol, GeoSpace2d>;
type PointLayer = FeatureLayer<GeoPoint2d, GeoPoint2d, CirclePointSymbol, GeoSpace2d>;

const DEPOT_COLOR: Color = Color::rgba(0x2A, 0x81, 0xCB, 255);
const DEPOT_SIZE: f64 = 14.0;
const TAXI_RANK_COLOR: Color = Color::rgba(0xF0, 0xA3, 0x0A, 255);
const TAXI_RANK_SIZE: f64 = 8.0;

/// Layer a feature lives in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Slot {
    Road,
    Route(usize),
    Depot,
    TaxiRank,
}

impl Slot {
    fn for_line(style: &LineStyle) -> Result<Self, ViewerError> {
        if *style == LineStyle::ROAD {
            return Ok(Slot::Road);
        }

        PALETTE
            .iter()
            .position(|color| LineStyle::route(*color) == *style)
            .map(Slot::Route)
            .ok_or_else(|| ViewerError::Rendering(format!("unsupported line style {style:?}")))
    }

    fn for_marker(icon: MarkerIcon) -> Self {
        match icon {
            MarkerIcon::Depot => Slot::Depot,
            MarkerIcon::TaxiRank => Slot::TaxiRank,
        }
    }
}

/// Draws viewer lines and markers into a fixed set of feature layers.
///
/// Galileo symbols are per layer, so every line style gets a layer of its own: one for roads and
/// one for each route color. The layers are shared with the [`galileo::Map`] through
/// [`GalileoSurface::add_layers`].
pub struct GalileoSurface {
    roads: Arc<RwLock<LineLayer>>,
    routes: Vec<Arc<RwLock<LineLayer>>>,
    depots: Arc<RwLock<PointLayer>>,
    taxi_ranks: Arc<RwLock<PointLayer>>,
    features: HashMap<LayerId, (Slot, FeatureId)>,
    changed: bool,
}

impl GalileoSurface {
    /// Creates the surface with empty layers.
    pub fn new() -> Self {
        Self {
            roads: line_layer(&LineStyle::ROAD),
            routes: PALETTE
                .iter()
                .map(|color| line_layer(&LineStyle::route(*color)))
                .collect(),
            depots: point_layer(DEPOT_COLOR, DEPOT_SIZE),
            taxi_ranks: point_layer(TAXI_RANK_COLOR, TAXI_RANK_SIZE),
            features: HashMap::new(),
            changed: false,
        }
    }

    /// Adds the layers of the surface to the map, roads at the bottom and markers on top.
    pub fn add_layers(&self, mut builder: MapBuilder) -> MapBuilder {
        builder = builder.with_layer(self.roads.clone());
        for layer in &self.routes {
            builder = builder.with_layer(layer.clone());
        }

        builder
            .with_layer(self.taxi_ranks.clone())
            .with_layer(self.depots.clone())
    }

    /// Returns true if anything was drawn or removed since the last call.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    fn line_layer(&self, slot: Slot) -> Option<&Arc<RwLock<LineLayer>>> {
        match slot {
            Slot::Road => Some(&self.roads),
            Slot::Route(index) => self.routes.get(index),
            Slot::Depot | Slot::TaxiRank => None,
        }
    }

    fn point_layer(&self, slot: Slot) -> Option<&Arc<RwLock<PointLayer>>> {
        match slot {
            Slot::Depot => Some(&self.depots),
            Slot::TaxiRank => Some(&self.taxi_ranks),
            Slot::Road | Slot::Route(_) => None,
        }
    }

    fn feature(&self, id: LayerId) -> Result<(Slot, FeatureId), ViewerError> {
        self.features
            .get(&id)
            .copied()
            .ok_or_else(|| ViewerError::Rendering(format!("unknown map feature {id:?}")))
    }
}

impl Default for GalileoSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSurface for GalileoSurface {
    fn add_line(
        &mut self,
        points: &[Coordinate],
        style: &LineStyle,
    ) -> Result<LayerId, ViewerError> {
        let slot = Slot::for_line(style)?;
        let Some(layer) = self.line_layer(slot) else {
            return Err(ViewerError::Rendering(format!("no line layer for {slot:?}")));
        };

        let contour = Contour::open(points.iter().map(|point| geo_point(*point)).collect());
        let feature_id = {
            let mut layer = layer.write();
            let feature_id = layer.features_mut().add(Disambig::new(contour));
            layer.update_feature(feature_id);
            feature_id
        };

        let id = LayerId::next_id();
        log::trace!("Added line {id:?} with {} points to {slot:?}", points.len());
        self.features.insert(id, (slot, feature_id));
        self.changed = true;

        Ok(id)
    }

    fn remove_line(&mut self, id: LayerId) -> Result<(), ViewerError> {
        let (slot, feature_id) = self.feature(id)?;
        let Some(layer) = self.line_layer(slot).cloned() else {
            return Err(ViewerError::Rendering(format!("{id:?} is not a line")));
        };

        self.features.remove(&id);
        {
            let mut layer = layer.write();
            layer.features_mut().remove(feature_id);
            layer.update_feature(feature_id);
        }

        log::trace!("Removed {id:?} from {slot:?}");
        self.changed = true;

        Ok(())
    }

    fn add_marker(&mut self, marker: &Marker) -> Result<LayerId, ViewerError> {
        let slot = Slot::for_marker(marker.icon);
        let Some(layer) = self.point_layer(slot) else {
            return Err(ViewerError::Rendering(format!("no point layer for {slot:?}")));
        };

        let feature_id = {
            let mut layer = layer.write();
            let feature_id = layer.features_mut().add(geo_point(marker.position));
            layer.update_feature(feature_id);
            feature_id
        };

        let id = LayerId::next_id();
        log::trace!("Added {:?} marker {id:?} at {}", marker.icon, marker.position);
        self.features.insert(id, (slot, feature_id));
        self.changed = true;

        Ok(id)
    }

    fn remove_marker(&mut self, id: LayerId) -> Result<(), ViewerError> {
        let (slot, feature_id) = self.feature(id)?;
        let Some(layer) = self.point_layer(slot).cloned() else {
            return Err(ViewerError::Rendering(format!("{id:?} is not a marker")));
        };

        self.features.remove(&id);
        {
            let mut layer = layer.write();
            layer.features_mut().remove(feature_id);
            layer.update_feature(feature_id);
        }

        log::trace!("Removed {id:?} from {slot:?}");
        self.changed = true;

        Ok(())
    }
}

fn line_layer(style: &LineStyle) -> Arc<RwLock<LineLayer>> {
    let symbol = SimpleContourSymbol {
        color: galileo_color(style.effective_color()),
        width: style.weight,
    };

    Arc::new(RwLock::new(FeatureLayer::new(vec![], symbol, Crs::WGS84)))
}

fn point_layer(color: Color, size: f64) -> Arc<RwLock<PointLayer>> {
    let symbol = CirclePointSymbol::new(galileo_color(color), size);
    Arc::new(RwLock::new(FeatureLayer::new(vec![], symbol, Crs::WGS84)))
}

fn geo_point(coordinate: Coordinate) -> GeoPoint2d {
    GeoPoint2d::latlon(coordinate.lat, coordinate.lng)
}

pub(crate) fn galileo_color(color: Color) -> galileo::Color {
    galileo::Color::rgba(color.r(), color.g(), color.b(), color.a())
}
