use ::geojson::{Feature, FeatureCollection, Geometry, Value};

use crate::{Coordinate, ViewerError};

use super::{Polyline, TaxiRank};

const NAME_PROPERTY: &str = "name";

/// Extracts every `LineString`, and every part of a `MultiLineString`, from a feature collection.
/// Other geometries are skipped.
pub fn parse_roads(bytes: &[u8]) -> Result<Vec<Polyline>, ViewerError> {
    let collection: FeatureCollection = serde_json::from_slice(bytes)?;

    let mut lines = vec![];
    for geometry in collection.features.iter().filter_map(|f| f.geometry.as_ref()) {
        collect_lines(geometry, &mut lines);
    }

    Ok(lines)
}

/// Extracts every `Point`, and every point of a `MultiPoint`, from a feature collection together
/// with the `name` property of its feature.
pub fn parse_taxi_ranks(bytes: &[u8]) -> Result<Vec<TaxiRank>, ViewerError> {
    let collection: FeatureCollection = serde_json::from_slice(bytes)?;

    let mut ranks = vec![];
    for feature in &collection.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };

        let name = feature_name(feature);
        let mut points = vec![];
        collect_points(geometry, &mut points);
        ranks.extend(points.into_iter().map(|position| TaxiRank {
            position,
            name: name.clone(),
        }));
    }

    Ok(ranks)
}

fn collect_lines(geometry: &Geometry, lines: &mut Vec<Polyline>) {
    match &geometry.value {
        Value::LineString(positions) => lines.push(to_coordinates(positions)),
        Value::MultiLineString(parts) => lines.extend(parts.iter().map(|p| to_coordinates(p))),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_lines(geometry, lines);
            }
        }
        _ => {}
    }
}

fn collect_points(geometry: &Geometry, points: &mut Vec<Coordinate>) {
    match &geometry.value {
        Value::Point(position) => points.extend(to_coordinate(position)),
        Value::MultiPoint(positions) => points.extend(to_coordinates(positions)),
        Value::GeometryCollection(geometries) => {
            for geometry in geometries {
                collect_points(geometry, points);
            }
        }
        _ => {}
    }
}

// GeoJSON positions are `[lng, lat]`.
fn to_coordinate(position: &[f64]) -> Option<Coordinate> {
    match position {
        [lng, lat, ..] => Some(Coordinate::new(*lat, *lng)),
        _ => None,
    }
}

fn to_coordinates(positions: &[Vec<f64>]) -> Vec<Coordinate> {
    positions.iter().filter_map(|p| to_coordinate(p)).collect()
}

fn feature_name(feature: &Feature) -> Option<String> {
    match feature.property(NAME_PROPERTY)? {
        serde_json::Value::String(name) => Some(name.clone()),
        serde_json::Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}
