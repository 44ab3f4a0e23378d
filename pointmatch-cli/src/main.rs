use clap::Parser;
use pointmatch::io::load_gray_image;
use pointmatch::{
    summarize_with_gate, DisparitySummary, FeaturePoint, Forstner, ForstnerConfig, Grid,
    InterestDetector, MatchConfig, Moravec, MoravecConfig, Offset, PointMatch, StereoMatcher,
    Threshold, DEFAULT_OUTLIER_GATE,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "PointMatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MoravecJson {
    window_radius: usize,
    /// `null` derives the threshold from the interest map.
    threshold: Option<i64>,
    tile_size: usize,
    parallel: bool,
}

impl Default for MoravecJson {
    fn default() -> Self {
        let cfg = MoravecConfig::default();
        Self {
            window_radius: cfg.window_radius,
            threshold: None,
            tile_size: cfg.tile_size,
            parallel: cfg.parallel,
        }
    }
}

impl From<MoravecJson> for MoravecConfig {
    fn from(value: MoravecJson) -> Self {
        Self {
            window_radius: value.window_radius,
            threshold: value.threshold.map_or(Threshold::Auto, Threshold::Fixed),
            tile_size: value.tile_size,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ForstnerJson {
    window_radius: usize,
    preselect_threshold: f64,
    q_threshold: f64,
    mean_factor: f64,
    median_factor: f64,
    tile_size: usize,
    parallel: bool,
}

impl Default for ForstnerJson {
    fn default() -> Self {
        let cfg = ForstnerConfig::default();
        Self {
            window_radius: cfg.window_radius,
            preselect_threshold: cfg.preselect_threshold,
            q_threshold: cfg.q_threshold,
            mean_factor: cfg.mean_factor,
            median_factor: cfg.median_factor,
            tile_size: cfg.tile_size,
            parallel: cfg.parallel,
        }
    }
}

impl From<ForstnerJson> for ForstnerConfig {
    fn from(value: ForstnerJson) -> Self {
        Self {
            window_radius: value.window_radius,
            preselect_threshold: value.preselect_threshold,
            q_threshold: value.q_threshold,
            mean_factor: value.mean_factor,
            median_factor: value.median_factor,
            tile_size: value.tile_size,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DetectorJson {
    Moravec(MoravecJson),
    Forstner(ForstnerJson),
}

impl Default for DetectorJson {
    fn default() -> Self {
        DetectorJson::Moravec(MoravecJson::default())
    }
}

#[derive(Debug, Default, Deserialize)]
struct OffsetJson {
    dx: i64,
    dy: i64,
}

#[derive(Debug, Deserialize)]
struct MatchingJson {
    #[serde(default = "default_window_radius")]
    window_radius: usize,
    #[serde(default = "default_search_radius")]
    search_radius: usize,
    #[serde(default = "default_cc_threshold")]
    cc_threshold: f64,
    offset: OffsetJson,
    #[serde(default = "default_outlier_gate")]
    outlier_gate: f64,
    #[serde(default)]
    parallel: bool,
}

fn default_window_radius() -> usize {
    MatchConfig::new(Offset::default()).window_radius
}

fn default_search_radius() -> usize {
    MatchConfig::new(Offset::default()).search_radius
}

fn default_cc_threshold() -> f64 {
    MatchConfig::new(Offset::default()).cc_threshold
}

fn default_outlier_gate() -> f64 {
    DEFAULT_OUTLIER_GATE
}

impl From<&MatchingJson> for MatchConfig {
    fn from(value: &MatchingJson) -> Self {
        Self {
            window_radius: value.window_radius,
            search_radius: value.search_radius,
            cc_threshold: value.cc_threshold,
            offset: Offset::new(value.offset.dx, value.offset.dy),
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Config {
    left_path: String,
    /// Matching runs only when the second image is given.
    right_path: Option<String>,
    output_path: Option<String>,
    #[serde(default)]
    detector: DetectorJson,
    matching: Option<MatchingJson>,
}

#[derive(Debug, Serialize)]
struct PointRecord {
    row: usize,
    col: usize,
}

impl From<FeaturePoint> for PointRecord {
    fn from(value: FeaturePoint) -> Self {
        Self {
            row: value.row,
            col: value.col,
        }
    }
}

#[derive(Debug, Serialize)]
struct MatchRecord {
    feature: PointRecord,
    matched: Option<PointRecord>,
    score: Option<f64>,
}

#[derive(Debug, Serialize)]
struct SummaryRecord {
    mean_dx: f64,
    mean_dy: f64,
    var_dx: f64,
    var_dy: f64,
    raw_mean_dx: f64,
    raw_mean_dy: f64,
    raw_count: usize,
    filtered_count: usize,
}

impl From<DisparitySummary> for SummaryRecord {
    fn from(value: DisparitySummary) -> Self {
        Self {
            mean_dx: value.mean_dx,
            mean_dy: value.mean_dy,
            var_dx: value.var_dx,
            var_dy: value.var_dy,
            raw_mean_dx: value.raw_mean_dx,
            raw_mean_dy: value.raw_mean_dy,
            raw_count: value.raw_count,
            filtered_count: value.filtered_count,
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    detector: &'static str,
    features: Vec<PointRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    matches: Option<Vec<MatchRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<SummaryRecord>,
    /// Why no summary was produced, when matching ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    summary_error: Option<String>,
}

fn detect<D: InterestDetector>(
    detector: &D,
    left: &Grid<u8>,
) -> Result<Vec<FeaturePoint>, Box<dyn std::error::Error>> {
    Ok(detector.detect(left.view())?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("pointmatch=info".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.left_path.is_empty() {
        return Err("left_path must be set in the config".into());
    }
    if config.right_path.is_some() && config.matching.is_none() {
        return Err("matching must be set when right_path is given".into());
    }

    let left = load_gray_image(&config.left_path)?;
    let (name, features) = match config.detector {
        DetectorJson::Moravec(cfg) => {
            let detector = Moravec::new(cfg.into())?;
            (detector.name(), detect(&detector, &left)?)
        }
        DetectorJson::Forstner(cfg) => {
            let detector = Forstner::new(cfg.into())?;
            (detector.name(), detect(&detector, &left)?)
        }
    };
    tracing::info!(detector = name, features = features.len(), "detection finished");

    let mut output = Output {
        detector: name,
        features: features.iter().copied().map(PointRecord::from).collect(),
        matches: None,
        summary: None,
        summary_error: None,
    };

    if let (Some(right_path), Some(matching)) = (&config.right_path, &config.matching) {
        let right = load_gray_image(right_path)?;
        let matcher = StereoMatcher::new(matching.into())?;
        let matches = matcher.match_points(left.view(), right.view(), &features)?;

        match summarize_with_gate(&features, &matches, matching.outlier_gate) {
            Ok(summary) => output.summary = Some(summary.into()),
            Err(err) => output.summary_error = Some(err.to_string()),
        }
        output.matches = Some(
            features
                .iter()
                .zip(&matches)
                .map(|(&feature, m)| MatchRecord {
                    feature: feature.into(),
                    matched: match *m {
                        PointMatch::Matched { row, col, .. } => Some(PointRecord { row, col }),
                        PointMatch::Unmatched => None,
                    },
                    score: m.score(),
                })
                .collect(),
        );
    }

    let json = serde_json::to_string_pretty(&output)?;
    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
