use nalgebra::{Matrix3, Vector3};

use crate::launch_site::LaunchSite;
use crate::observer::ReceivingPoint;

// WGS84 ellipsoid parameters
const A: f64 = 6378137.0; // semi-major axis (meters)
const F: f64 = 1.0 / 298.257223563; // flattening
const E2: f64 = F * (2.0 - F); // eccentricity squared

const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;
const MAX_ITERATIONS: usize = 20;

// Look-angle components smaller than this are treated as zero so that a
// target directly overhead gets a stable azimuth.
const SNAP_M: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude: f64,  // degrees
    pub longitude: f64, // degrees
    pub height: f64,    // meters above the ellipsoid
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub azimuth: f64,   // degrees, [0, 360)
    pub elevation: f64, // degrees
    pub range: f64,     // meters
}

impl Geodetic {
    pub fn new(latitude: f64, longitude: f64, height: f64) -> Self {
        Self {
            latitude,
            longitude,
            height,
        }
    }

    pub fn to_ecef(&self) -> Vector3<f64> {
        let lat_rad = self.latitude.to_radians();
        let lon_rad = self.longitude.to_radians();

        let n = prime_vertical_radius(lat_rad);

        let x = (n + self.height) * lat_rad.cos() * lon_rad.cos();
        let y = (n + self.height) * lat_rad.cos() * lon_rad.sin();
        let z = (n * (1.0 - E2) + self.height) * lat_rad.sin();

        Vector3::new(x, y, z)
    }

    pub fn from_ecef(ecef: &Vector3<f64>) -> Self {
        let lon = ecef.y.atan2(ecef.x);
        let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();

        // On the polar axis the latitude iteration divides by cos(lat).
        if p < 1e-9 {
            let b = A * (1.0 - F);
            let latitude = if ecef.z >= 0.0 { 90.0 } else { -90.0 };
            return Self::new(latitude, lon.to_degrees(), ecef.z.abs() - b);
        }

        let mut lat = ecef.z.atan2(p * (1.0 - E2));
        for _ in 0..MAX_ITERATIONS {
            let n = prime_vertical_radius(lat);
            let h = p / lat.cos() - n;
            let next = ecef.z.atan2(p * (1.0 - E2 * n / (n + h)));
            let converged = (next - lat).abs() < LATITUDE_TOLERANCE_RAD;
            lat = next;
            if converged {
                break;
            }
        }

        let height = p / lat.cos() - prime_vertical_radius(lat);
        Self::new(lat.to_degrees(), lon.to_degrees(), height)
    }
}

fn prime_vertical_radius(lat_rad: f64) -> f64 {
    A / (1.0 - E2 * lat_rad.sin().powi(2)).sqrt()
}

/// Rotation taking ECEF offsets into the local East-North-Up frame at the
/// given point. Its transpose maps ENU back to ECEF.
fn ecef_to_enu_rotation(origin: &Geodetic) -> Matrix3<f64> {
    let lat_rad = origin.latitude.to_radians();
    let lon_rad = origin.longitude.to_radians();
    let (sin_lat, cos_lat) = lat_rad.sin_cos();
    let (sin_lon, cos_lon) = lon_rad.sin_cos();

    Matrix3::new(
        -sin_lon,
        cos_lon,
        0.0,
        -sin_lat * cos_lon,
        -sin_lat * sin_lon,
        cos_lat,
        cos_lat * cos_lon,
        cos_lat * sin_lon,
        sin_lat,
    )
}

pub fn enu_to_geodetic(enu: &Vector3<f64>, origin: &Geodetic) -> Geodetic {
    let offset = ecef_to_enu_rotation(origin).transpose() * enu;
    Geodetic::from_ecef(&(origin.to_ecef() + offset))
}

pub fn geodetic_to_enu(target: &Geodetic, origin: &Geodetic) -> Vector3<f64> {
    ecef_to_enu_rotation(origin) * (target.to_ecef() - origin.to_ecef())
}

pub fn geodetic_to_aer(target: &Geodetic, observer: &Geodetic) -> LookAngles {
    let enu = geodetic_to_enu(target, observer).map(|c| if c.abs() < SNAP_M { 0.0 } else { c });

    let horizontal = enu.x.hypot(enu.y);
    let azimuth = enu.x.atan2(enu.y).to_degrees().rem_euclid(360.0);
    let elevation = enu.z.atan2(horizontal).to_degrees();

    LookAngles {
        azimuth,
        elevation,
        range: horizontal.hypot(enu.z),
    }
}

/// Which height the launch site's ENU frame is anchored at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OriginHeight {
    /// Always 0 m, regardless of the site's own altitude.
    #[default]
    SeaLevel,
    SiteAltitude,
}

/// Converts simulator ENU positions into look angles from the receiving point.
#[derive(Debug, Clone)]
pub struct GeodeticTransformer {
    origin: Geodetic,
    receiver: Geodetic,
}

impl GeodeticTransformer {
    pub fn new(site: &LaunchSite, receiver: &ReceivingPoint, height: OriginHeight) -> Self {
        let origin_height = match height {
            OriginHeight::SeaLevel => 0.0,
            OriginHeight::SiteAltitude => site.origin_altitude_m,
        };

        Self {
            origin: Geodetic::new(
                site.origin_latitude_deg,
                site.origin_longitude_deg,
                origin_height,
            ),
            receiver: receiver.position(),
        }
    }

    pub fn origin(&self) -> &Geodetic {
        &self.origin
    }

    pub fn to_geodetic(&self, east: f64, north: f64, up: f64) -> Geodetic {
        enu_to_geodetic(&Vector3::new(east, north, up), &self.origin)
    }

    pub fn look_angles(&self, east: f64, north: f64, up: f64) -> LookAngles {
        geodetic_to_aer(&self.to_geodetic(east, north, up), &self.receiver)
    }
}
