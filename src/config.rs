use serde::Deserialize;
use std::path::Path;

use crate::error::RxError;

/// Flight configuration shared with the simulator. Only the launch pad
/// section is read here; everything else in the file is ignored.
#[derive(Debug, Deserialize)]
pub struct FlightConfig {
    #[serde(rename = "Launch Pad")]
    pub launch_pad: Option<LaunchPadConfig>,
}

#[derive(Debug, Deserialize)]
pub struct LaunchPadConfig {
    #[serde(rename = "Site")]
    pub site: Option<String>,
}

impl FlightConfig {
    pub fn load(path: &Path) -> Result<Self, RxError> {
        let contents = std::fs::read_to_string(path).map_err(|e| RxError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|source| RxError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn site_name(&self) -> Option<&str> {
        self.launch_pad.as_ref()?.site.as_deref()
    }
}

/// Optional receiving station override, read from TOML.
#[derive(Debug, Deserialize)]
pub struct StationConfig {
    pub receiver: ReceiverConfig,
}

#[derive(Debug, Deserialize)]
pub struct ReceiverConfig {
    #[serde(default = "default_receiver_name")]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

fn default_receiver_name() -> String {
    "receiving point".to_string()
}

impl StationConfig {
    pub fn load(path: &Path) -> Result<Self, RxError> {
        let contents = std::fs::read_to_string(path).map_err(|e| RxError::io(path, e))?;
        toml::from_str(&contents).map_err(|source| RxError::Station {
            path: path.to_path_buf(),
            source,
        })
    }
}
