//! Points of interest shown on the merchant map. Display only.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub coordinate: Coordinate,
}

/// A map viewport: a center plus the span shown in each direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub center: Coordinate,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Region {
    pub fn contains(&self, point: &Coordinate) -> bool {
        (point.latitude - self.center.latitude).abs() <= self.latitude_delta / 2.0
            && (point.longitude - self.center.longitude).abs() <= self.longitude_delta / 2.0
    }
}

const CENTRO: Coordinate = Coordinate {
    latitude: 19.4326,
    longitude: -99.1332,
};

lazy_static! {
    static ref PLACES: Vec<Place> = [
        (1, "Centro Histórico", "Historic center of Mexico City", CENTRO),
        (2, "Chapultepec", "Chapultepec Castle and Park", Coordinate { latitude: 19.4205, longitude: -99.1862 }),
        (3, "Coyoacán", "Artistic neighborhood", Coordinate { latitude: 19.3450, longitude: -99.1626 }),
        (4, "Polanco", "Upscale shopping district", Coordinate { latitude: 19.4333, longitude: -99.2000 }),
        (5, "Xochimilco", "Floating gardens", Coordinate { latitude: 19.2578, longitude: -99.1036 }),
    ]
    .into_iter()
    .map(|(id, title, description, coordinate)| Place {
        id,
        title: title.to_string(),
        description: description.to_string(),
        coordinate,
    })
    .collect();
}

pub fn places() -> &'static [Place] {
    &PLACES
}

/// The viewport the map opens on.
pub fn default_region() -> Region {
    Region {
        center: CENTRO,
        latitude_delta: 0.0922,
        longitude_delta: 0.0421,
    }
}

/// Places inside `region`, in catalogue order.
pub fn places_in(region: &Region) -> Vec<&'static Place> {
    places()
        .iter()
        .filter(|place| region.contains(&place.coordinate))
        .collect()
}
