use std::path::{Path, PathBuf};

use crate::config::{FlightConfig, StationConfig};
use crate::error::RxError;
use crate::geodesy::{GeodeticTransformer, LookAngles, OriginHeight};
use crate::launch_site::{resolve_site, LaunchSite};
use crate::observer::ReceivingPoint;
use crate::report;
use crate::trajectory::{LogTable, TrajectorySample};

pub const DIST_COLUMN: &str = "dist_Receive";
pub const AZI_COLUMN: &str = "azi_Receive";
pub const ELV_COLUMN: &str = "elv_Receive";

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub station: Option<PathBuf>,
    pub origin_height: OriginHeight,
    pub plots: bool,
    pub font: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub site: &'static LaunchSite,
    pub receiver: ReceivingPoint,
    pub origin_height_m: f64,
    pub rows: usize,
    pub min_range_m: Option<f64>,
    pub max_range_m: Option<f64>,
    pub max_elevation_deg: Option<f64>,
    pub written: Vec<PathBuf>,
}

pub fn derive_observations(
    transformer: &GeodeticTransformer,
    samples: &[TrajectorySample],
) -> Vec<LookAngles> {
    samples
        .iter()
        .map(|s| transformer.look_angles(s.east, s.north, s.up))
        .collect()
}

fn load_receiver(station: Option<&Path>) -> Result<ReceivingPoint, RxError> {
    match station {
        Some(path) => {
            let config = StationConfig::load(path)?;
            Ok(config.receiver.into())
        }
        None => Ok(ReceivingPoint::default()),
    }
}

/// Config -> site -> log -> look angles -> rewritten log -> charts.
///
/// The log is rewritten before any chart is rendered, so a chart failure
/// leaves the augmented CSV behind.
pub fn run(
    config_path: &Path,
    result_dir: &Path,
    options: &RunOptions,
) -> Result<PipelineSummary, RxError> {
    let config = FlightConfig::load(config_path)?;
    let site_name = config
        .site_name()
        .ok_or_else(|| RxError::MissingSiteField(config_path.to_path_buf()))?;
    let site = resolve_site(site_name)?;
    log::info!("Launch site {:?} resolved to {}", site_name, site.name);

    let receiver = load_receiver(options.station.as_deref())?;
    let transformer = GeodeticTransformer::new(site, &receiver, options.origin_height);
    log::info!(
        "Receiving point {} at {:.6}, {:.6}, {:.1} m",
        receiver.name,
        receiver.latitude,
        receiver.longitude,
        receiver.altitude
    );

    let mut table = LogTable::load(result_dir)?;
    let samples = table.samples()?;
    log::info!("Loaded {} rows from {}", samples.len(), table.path().display());
    log::debug!("Columns: {}", table.headers().join(", "));
    if table.is_empty() {
        log::warn!("{} has no data rows", table.path().display());
    }

    let looks = derive_observations(&transformer, &samples);

    let ranges: Vec<f64> = looks.iter().map(|l| l.range).collect();
    let azimuths: Vec<f64> = looks.iter().map(|l| l.azimuth).collect();
    let elevations: Vec<f64> = looks.iter().map(|l| l.elevation).collect();

    table.set_column(DIST_COLUMN, &ranges)?;
    table.set_column(AZI_COLUMN, &azimuths)?;
    table.set_column(ELV_COLUMN, &elevations)?;
    table.save()?;
    log::info!("Wrote {}", table.path().display());

    let mut written = vec![table.path().to_path_buf()];

    if options.plots {
        let labels = report::init_font(options.font.as_deref());
        let times: Vec<f64> = samples.iter().map(|s| s.time).collect();
        written.extend(report::render_all(result_dir, &times, &looks, labels)?);
    }

    let summary = PipelineSummary {
        site,
        receiver,
        origin_height_m: transformer.origin().height,
        rows: samples.len(),
        min_range_m: ranges.iter().copied().reduce(f64::min),
        max_range_m: ranges.iter().copied().reduce(f64::max),
        max_elevation_deg: elevations.iter().copied().reduce(f64::max),
        written,
    };
    log::debug!("{:?}", summary);

    Ok(summary)
}
