mod config;
mod error;
mod geodesy;
mod launch_site;
mod observer;
mod pipeline;
mod report;
mod trajectory;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use error::RxError;
use geodesy::OriginHeight;
use pipeline::{PipelineSummary, RunOptions};

#[derive(Parser)]
#[command(name = "rxlook")]
#[command(about = "Append receiving-station look angles to a rocket flight log")]
struct Cli {
    /// Flight config (*.json) and result directory, in either order
    #[arg(value_name = "CONFIG.json | RESULT_DIR")]
    paths: Vec<PathBuf>,

    /// TOML file with a [receiver] table overriding the receiving point
    #[arg(long, value_name = "FILE")]
    station: Option<PathBuf>,

    /// Anchor the launch site frame at the site's altitude instead of sea level
    #[arg(long)]
    use_site_altitude: bool,

    /// Only rewrite log.csv, skip the charts
    #[arg(long)]
    no_plots: bool,

    /// TrueType font for chart labels
    #[arg(long, value_name = "FILE")]
    font: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Pick out (config, result_dir); the config is whichever argument has
/// `.json` in its name. Extra arguments are ignored.
fn split_paths(paths: &[PathBuf]) -> Result<(PathBuf, PathBuf), RxError> {
    let [first, second, ..] = paths else {
        return Err(RxError::MissingArguments);
    };

    let is_config = |p: &PathBuf| p.to_string_lossy().contains(".json");

    if is_config(first) {
        Ok((first.clone(), second.clone()))
    } else if is_config(second) {
        Ok((second.clone(), first.clone()))
    } else {
        Err(RxError::MissingArguments)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn summary_lines(summary: &PipelineSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Launch site: {}", summary.site.name),
        format!(
            "Receiving point: {} ({:.6}, {:.6})",
            summary.receiver.name, summary.receiver.latitude, summary.receiver.longitude
        ),
        format!("Launch frame origin height: {:.1} m", summary.origin_height_m),
        format!("Processed {} samples", summary.rows),
    ];

    if let (Some(min), Some(max)) = (summary.min_range_m, summary.max_range_m) {
        lines.push(format!("  Range: {:.1} m - {:.1} m", min, max));
    }
    if let Some(elevation) = summary.max_elevation_deg {
        lines.push(format!("  Max elevation: {:.2}°", elevation));
    }
    for path in &summary.written {
        lines.push(format!("  Wrote {}", path.display()));
    }
    lines
}

fn print_summary(summary: &PipelineSummary) {
    for line in summary_lines(summary) {
        println!("{}", line);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (config_path, result_dir) = split_paths(&cli.paths)?;

    let options = RunOptions {
        station: cli.station,
        origin_height: if cli.use_site_altitude {
            OriginHeight::SiteAltitude
        } else {
            OriginHeight::SeaLevel
        },
        plots: !cli.no_plots,
        font: cli.font,
    };

    let summary = pipeline::run(&config_path, &result_dir, &options)
        .with_context(|| format!("processing {}", result_dir.display()))?;
    print_summary(&summary);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(args: &[&str]) -> Vec<PathBuf> {
        args.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_config_first() {
        let (config, dir) = split_paths(&paths(&["flight.json", "result"])).unwrap();
        assert_eq!(config, PathBuf::from("flight.json"));
        assert_eq!(dir, PathBuf::from("result"));
    }

    #[test]
    fn test_config_second() {
        let (config, dir) = split_paths(&paths(&["out/run1", "cfg/flight.json"])).unwrap();
        assert_eq!(config, PathBuf::from("cfg/flight.json"));
        assert_eq!(dir, PathBuf::from("out/run1"));
    }

    #[test]
    fn test_missing_arguments() {
        assert!(matches!(
            split_paths(&paths(&["flight.json"])),
            Err(RxError::MissingArguments)
        ));
        assert!(matches!(split_paths(&[]), Err(RxError::MissingArguments)));
        assert!(matches!(
            split_paths(&paths(&["a", "b"])),
            Err(RxError::MissingArguments)
        ));
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "rxlook",
            "flight.json",
            "result",
            "--no-plots",
            "--use-site-altitude",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.paths.len(), 2);
        assert!(cli.no_plots);
        assert!(cli.use_site_altitude);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_summary_reports_origin_height() {
        let summary = PipelineSummary {
            site: launch_site::SiteId::NoshiroOchiai.site(),
            receiver: observer::ReceivingPoint::default(),
            origin_height_m: 3000.0,
            rows: 2,
            min_range_m: Some(10.0),
            max_range_m: Some(25.5),
            max_elevation_deg: None,
            written: vec![PathBuf::from("result/log.csv")],
        };
        let lines = summary_lines(&summary);
        assert!(lines.contains(&"Launch frame origin height: 3000.0 m".to_string()));
        assert!(lines.contains(&"  Range: 10.0 m - 25.5 m".to_string()));
        assert!(!lines.iter().any(|l| l.contains("Max elevation")));
        assert_eq!(lines.last().unwrap(), "  Wrote result/log.csv");
    }
}
