//! Static overlays: the road network and the taxi ranks.
//!
//! Both documents are fetched independently of each other and of anything the user does. A
//! failure to load or draw an overlay is logged and otherwise ignored; the map stays usable
//! without them.

use std::fmt::{Display, Formatter};

use bytes::Bytes;
use reqwest::Url;

use crate::surface::{LineStyle, MapSurface, Marker, MarkerIcon};
use crate::{Coordinate, ViewerConfig, ViewerError};

mod geojson;

pub use self::geojson::{parse_roads, parse_taxi_ranks};

/// Road geometry as a sequence of points.
pub type Polyline = Vec<Coordinate>;

/// Taxi rank point from the overlay document.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxiRank {
    /// Location of the rank.
    pub position: Coordinate,
    /// Value of the `name` property of the feature.
    pub name: Option<String>,
}

impl TaxiRank {
    /// Text shown in the popup of the rank marker.
    pub fn popup(&self) -> String {
        match &self.name {
            Some(name) => format!("Taxi Rank: {name}"),
            None => "Taxi Rank".to_string(),
        }
    }
}

/// Which of the two static documents.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OverlayKind {
    /// Road network lines.
    Roads,
    /// Taxi rank points.
    TaxiRanks,
}

impl Display for OverlayKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayKind::Roads => write!(f, "roads"),
            OverlayKind::TaxiRanks => write!(f, "taxi ranks"),
        }
    }
}

/// Decoded overlay document.
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    /// Road lines.
    Roads(Vec<Polyline>),
    /// Taxi ranks.
    TaxiRanks(Vec<TaxiRank>),
}

/// Downloads and decodes the overlay documents.
#[derive(Debug, Clone)]
pub struct OverlayLoader {
    http_client: reqwest::Client,
    roads_url: Url,
    taxi_ranks_url: Url,
}

impl OverlayLoader {
    /// Creates a loader for the given document urls.
    pub fn new(roads_url: Url, taxi_ranks_url: Url) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            roads_url,
            taxi_ranks_url,
        }
    }

    /// Creates a loader for the urls set in the configuration.
    pub fn from_config(config: &ViewerConfig) -> Result<Self, ViewerError> {
        Ok(Self::new(config.roads_url()?, config.taxi_ranks_url()?))
    }

    /// Url the given overlay is loaded from.
    pub fn url(&self, kind: OverlayKind) -> &Url {
        match kind {
            OverlayKind::Roads => &self.roads_url,
            OverlayKind::TaxiRanks => &self.taxi_ranks_url,
        }
    }

    /// Downloads and decodes one overlay.
    pub async fn load(&self, kind: OverlayKind) -> Result<Overlay, ViewerError> {
        let bytes = self.load_bytes(self.url(kind)).await?;
        let overlay = match kind {
            OverlayKind::Roads => Overlay::Roads(parse_roads(&bytes)?),
            OverlayKind::TaxiRanks => Overlay::TaxiRanks(parse_taxi_ranks(&bytes)?),
        };

        Ok(overlay)
    }

    async fn load_bytes(&self, url: &Url) -> Result<Bytes, ViewerError> {
        let response = self.http_client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(ViewerError::Network(format!(
                "failed to load {url}: {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?)
    }
}

/// Overlays drawn on the map.
#[derive(Debug, Default)]
pub struct StaticOverlays {
    taxi_ranks: Vec<TaxiRank>,
    road_count: usize,
}

impl StaticOverlays {
    /// Draws a loaded overlay, or logs why it could not be loaded.
    pub fn apply(
        &mut self,
        surface: &mut dyn MapSurface,
        kind: OverlayKind,
        loaded: Result<Overlay, ViewerError>,
    ) {
        let overlay = match loaded {
            Ok(overlay) => overlay,
            Err(err) => {
                log::error!("Failed to load {kind} overlay: {err}");
                return;
            }
        };

        if let Err(err) = self.render(surface, overlay) {
            log::error!("Failed to draw {kind} overlay: {err}");
        }
    }

    fn render(&mut self, surface: &mut dyn MapSurface, overlay: Overlay) -> Result<(), ViewerError> {
        match overlay {
            Overlay::Roads(roads) => {
                for road in &roads {
                    surface.add_line(road, &LineStyle::ROAD)?;
                    self.road_count += 1;
                }
                log::info!("Drew {} road lines", roads.len());
            }
            Overlay::TaxiRanks(ranks) => {
                for rank in ranks {
                    surface.add_marker(&Marker {
                        position: rank.position,
                        icon: MarkerIcon::TaxiRank,
                        popup: Some(rank.popup()),
                    })?;
                    self.taxi_ranks.push(rank);
                }
                log::info!("Drew {} taxi ranks", self.taxi_ranks.len());
            }
        }

        Ok(())
    }

    /// Number of road lines drawn.
    pub fn road_count(&self) -> usize {
        self.road_count
    }

    /// Returns the taxi rank closest to `at`, if it is no further than `tolerance_m` meters.
    pub fn pick_taxi_rank(&self, at: Coordinate, tolerance_m: f64) -> Option<&TaxiRank> {
        self.taxi_ranks
            .iter()
            .map(|rank| (rank.position.distance_m(&at), rank))
            .filter(|(distance, _)| *distance <= tolerance_m)
            .min_by(|(a, _), (b, _)| a.total_cmp(b))
            .map(|(_, rank)| rank)
    }
}
