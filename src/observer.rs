use crate::config::ReceiverConfig;
use crate::geodesy::Geodetic;

/// Ground station that receives the rocket's downlink.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceivingPoint {
    pub name: String,
    pub latitude: f64,  // degrees
    pub longitude: f64, // degrees
    pub altitude: f64,  // meters
}

impl Default for ReceivingPoint {
    fn default() -> Self {
        Self {
            name: "Asanai receiving point".to_string(),
            latitude: 40.249892,
            longitude: 140.012233,
            altitude: 0.0,
        }
    }
}

impl ReceivingPoint {
    pub fn new(name: String, lat: f64, lon: f64, alt: f64) -> Self {
        Self {
            name,
            latitude: lat,
            longitude: lon,
            altitude: alt,
        }
    }

    pub fn position(&self) -> Geodetic {
        Geodetic::new(self.latitude, self.longitude, self.altitude)
    }
}

impl From<ReceiverConfig> for ReceivingPoint {
    fn from(config: ReceiverConfig) -> Self {
        Self::new(
            config.name,
            config.latitude,
            config.longitude,
            config.altitude,
        )
    }
}
