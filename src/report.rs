use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};

use crate::error::RxError;
use crate::geodesy::LookAngles;

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 768;
const GRID_DIVISIONS: usize = 10;
const X_DESC: &str = "Time [sec]";

pub struct ChartSpec {
    pub file_name: &'static str,
    pub y_desc: &'static str,
    pub value: fn(&LookAngles) -> f64,
}

fn range_of(look: &LookAngles) -> f64 {
    look.range
}

fn elevation_of(look: &LookAngles) -> f64 {
    look.elevation
}

fn azimuth_of(look: &LookAngles) -> f64 {
    look.azimuth
}

pub const CHARTS: [ChartSpec; 3] = [
    ChartSpec {
        file_name: "Distance_ReceivePoint.png",
        y_desc: "Distance - 3D [m]",
        value: range_of,
    },
    ChartSpec {
        file_name: "Elevation_ReceivePoint.png",
        y_desc: "Elevation [deg]",
        value: elevation_of,
    },
    ChartSpec {
        file_name: "Azimuth_ReceivePoint.png",
        y_desc: "Azimuth [deg]",
        value: azimuth_of,
    },
];

// Searched in order when no font is given on the command line.
const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

const PREFERRED_FONTS: &[&str] = &[
    "DejaVuSans.ttf",
    "LiberationSans-Regular.ttf",
    "NotoSans-Regular.ttf",
    "FreeSans.ttf",
    "Arial.ttf",
    "arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Register a sans-serif font for axis labels. Only the first call in a
/// process has any effect. Returns whether labels can be drawn.
pub fn init_font(explicit: Option<&Path>) -> bool {
    *FONT_READY.get_or_init(|| {
        let candidate = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_system_font(),
        };

        match candidate {
            Some(path) => match register_font_file(&path) {
                Ok(()) => {
                    log::debug!("Using font {}", path.display());
                    true
                }
                Err(reason) => {
                    log::warn!("Cannot use font {}: {}", path.display(), reason);
                    false
                }
            },
            None => {
                log::warn!("No TrueType font found, charts will be drawn without labels");
                false
            }
        }
    })
}

fn register_font_file(path: &Path) -> Result<(), String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    // plotters keeps registered fonts for the life of the process.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font("sans-serif", FontStyle::Normal, bytes).map_err(|_| "invalid font data".to_string())
}

fn find_system_font() -> Option<PathBuf> {
    let mut found = Vec::new();
    for dir in FONT_DIRS {
        collect_fonts(Path::new(dir), 4, &mut found);
    }

    PREFERRED_FONTS
        .iter()
        .find_map(|name| {
            found
                .iter()
                .find(|p| p.file_name().is_some_and(|f| f == *name))
                .cloned()
        })
        .or_else(|| found.into_iter().next())
}

fn collect_fonts(dir: &Path, depth: usize, found: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };

    let mut entries: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if depth > 0 {
                collect_fonts(&path, depth - 1, found);
            }
        } else if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("ttf"))
        {
            found.push(path);
        }
    }
}

/// Axis range covering all finite values, padded when degenerate.
fn axis_range(values: &[f64]) -> Range<f64> {
    let (min, max) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if min > max {
        0.0..1.0
    } else if min == max {
        let pad = if min == 0.0 { 1.0 } else { min.abs() * 0.05 };
        (min - pad)..(max + pad)
    } else {
        min..max
    }
}

fn grid_lines(x: &Range<f64>, y: &Range<f64>) -> Vec<PathElement<(f64, f64)>> {
    let style = BLACK.mix(0.15).stroke_width(1);
    let dx = (x.end - x.start) / GRID_DIVISIONS as f64;
    let dy = (y.end - y.start) / GRID_DIVISIONS as f64;

    (0..=GRID_DIVISIONS)
        .flat_map(|i| {
            let fx = x.start + dx * i as f64;
            let fy = y.start + dy * i as f64;
            [
                PathElement::new(vec![(fx, y.start), (fx, y.end)], style),
                PathElement::new(vec![(x.start, fy), (x.end, fy)], style),
            ]
        })
        .collect()
}

fn plot_error<E: std::fmt::Display>(file: &str) -> impl Fn(E) -> RxError + '_ {
    move |e| RxError::Plot {
        file: file.to_string(),
        reason: e.to_string(),
    }
}

/// Draw one time series as a line chart with a grid.
pub fn render_chart(
    path: &Path,
    y_desc: &str,
    time: &[f64],
    values: &[f64],
    labels: bool,
) -> Result<(), RxError> {
    let file = path.display().to_string();
    let err = plot_error(&file);

    let x = axis_range(time);
    let y = axis_range(values);

    let root = BitMapBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(&err)?;

    let (x_area, y_area) = if labels { (50, 90) } else { (0, 0) };
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area)
        .build_cartesian_2d(x.clone(), y.clone())
        .map_err(&err)?;

    if labels {
        chart
            .configure_mesh()
            .x_desc(X_DESC)
            .y_desc(y_desc)
            .draw()
            .map_err(&err)?;
    } else {
        chart.draw_series(grid_lines(&x, &y)).map_err(&err)?;
    }

    chart
        .draw_series(LineSeries::new(
            time.iter().copied().zip(values.iter().copied()),
            &BLUE,
        ))
        .map_err(&err)?;

    root.present().map_err(&err)?;
    Ok(())
}

/// Render range, elevation and azimuth against time into `dir`.
pub fn render_all(
    dir: &Path,
    time: &[f64],
    looks: &[LookAngles],
    labels: bool,
) -> Result<Vec<PathBuf>, RxError> {
    let mut written = Vec::with_capacity(CHARTS.len());

    for chart in &CHARTS {
        let path = dir.join(chart.file_name);
        let values: Vec<f64> = looks.iter().map(chart.value).collect();
        render_chart(&path, chart.y_desc, time, &values, labels)?;
        log::info!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::tests::scratch_dir;

    #[test]
    fn test_axis_range() {
        assert_eq!(axis_range(&[]), 0.0..1.0);
        assert_eq!(axis_range(&[f64::NAN]), 0.0..1.0);
        assert_eq!(axis_range(&[0.0, 0.0]), -1.0..1.0);
        assert_eq!(axis_range(&[100.0]), 95.0..105.0);
        assert_eq!(axis_range(&[3.0, -2.0, f64::INFINITY, 7.5]), -2.0..7.5);
    }

    #[test]
    fn test_grid_lines() {
        let lines = grid_lines(&(0.0..10.0), &(-1.0..1.0));
        assert_eq!(lines.len(), 2 * (GRID_DIVISIONS + 1));
    }

    #[test]
    fn test_render_without_labels() {
        let dir = scratch_dir("chart");
        let path = dir.join("bare.png");
        render_chart(&path, "Range [m]", &[0.0, 1.0, 2.0], &[5.0, 7.0, 6.0], false).unwrap();
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_render_all_empty_series() {
        let dir = scratch_dir("charts-empty");
        let written = render_all(&dir, &[], &[], false).unwrap();
        assert_eq!(written.len(), 3);
        for path in written {
            assert!(path.is_file());
        }
    }
}
