use pointmatch::lowlevel::{
    forstner_candidates, forstner_preselect, forstner_shape_maps, GrayCovariance,
};
use pointmatch::{
    feature_points, FeaturePoint, FlagMap, Forstner, ForstnerConfig, ImageView, InterestDetector,
    PointMatchError, ScoreMap,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn square_image(size: usize, top: usize, left: usize, side: usize, value: u8) -> Vec<u8> {
    let mut data = vec![0u8; size * size];
    for row in top..top + side {
        for col in left..left + side {
            data[row * size + col] = value;
        }
    }
    data
}

#[test]
fn square_corners_are_the_only_candidates() {
    let data = square_image(50, 20, 20, 10, 255);
    let view = ImageView::from_slice(&data, 50, 50).unwrap();
    let detector = Forstner::new(ForstnerConfig::default()).unwrap();
    let maps = detector.analyze(view).unwrap();

    assert_eq!(
        feature_points(&maps.candidates),
        vec![
            FeaturePoint::new(20, 20),
            FeaturePoint::new(20, 29),
            FeaturePoint::new(29, 20),
            FeaturePoint::new(29, 29),
        ]
    );
    // Most of the map is flat, so the median gate collapses to zero.
    assert_eq!(maps.weight_median, 0.0);
    assert!(maps.weight_mean > 0.0);
}

#[test]
fn suppression_keeps_the_strongest_corner_per_tile() {
    let data = square_image(50, 20, 20, 10, 255);
    let view = ImageView::from_slice(&data, 50, 50).unwrap();
    let detector = Forstner::new(ForstnerConfig::default()).unwrap();
    let maps = detector.analyze(view).unwrap();
    let features = detector.detect(view).unwrap();

    assert_eq!(features, vec![FeaturePoint::new(20, 20)]);
    assert_eq!(maps.weight.at(20, 20), 144_500.0);
    for p in &features {
        assert!(maps.candidates.at(p.row, p.col));
        assert!(maps.primary.at(p.row, p.col));
    }
}

#[test]
fn features_are_candidates_on_textured_input() {
    let (width, height) = (48, 40);
    let mut rng = StdRng::seed_from_u64(5);
    let data: Vec<u8> = (0..width * height).map(|_| rng.random::<u8>()).collect();
    let view = ImageView::from_slice(&data, width, height).unwrap();
    let detector = Forstner::new(ForstnerConfig::default()).unwrap();
    let maps = detector.analyze(view).unwrap();
    let features = detector.detect(view).unwrap();

    let radius = detector.border();
    for p in &features {
        assert!(maps.candidates.at(p.row, p.col));
        assert!(p.row >= radius && p.row < height - radius);
        assert!(p.col >= radius && p.col < width - radius);
    }
    let mut sorted = features.clone();
    sorted.sort();
    assert_eq!(sorted, features);
}

#[test]
fn preselection_uses_median_of_axis_differences() {
    // Centre 100; neighbours differ by 0, 10, 30 and 50: median is 20.
    let mut data = vec![100u8; 25];
    data[2 * 5 + 3] = 110;
    data[3 * 5 + 2] = 130;
    data[5 + 2] = 150;
    let view = ImageView::from_slice(&data, 5, 5).unwrap();

    let at_median = forstner_preselect(view, 1, 20.0, false).unwrap();
    assert!(at_median.at(2, 2));
    let above = forstner_preselect(view, 1, 20.5, false).unwrap();
    assert!(!above.at(2, 2));
}

#[test]
fn flat_windows_carry_zero_weight() {
    let data = vec![77u8; 30 * 30];
    let view = ImageView::from_slice(&data, 30, 30).unwrap();
    let (roundness, weight) = forstner_shape_maps(view, 2, false).unwrap();
    assert!(roundness.as_slice().iter().all(|&v| v == 0.0));
    assert!(weight.as_slice().iter().all(|&v| v == 0.0));

    let cov = GrayCovariance::at(&view, 10, 10, 2);
    assert_eq!(cov.trace(), 0);
    assert_eq!(cov.weight(), 0.0);
    assert_eq!(cov.roundness(), 0.0);
}

#[test]
fn invalid_configurations_are_rejected() {
    let zero_radius = ForstnerConfig {
        window_radius: 0,
        ..ForstnerConfig::default()
    };
    assert!(matches!(
        Forstner::new(zero_radius),
        Err(PointMatchError::InvalidConfig { .. })
    ));

    let nan_factor = ForstnerConfig {
        median_factor: f64::NAN,
        ..ForstnerConfig::default()
    };
    assert!(matches!(
        Forstner::new(nan_factor),
        Err(PointMatchError::InvalidConfig { .. })
    ));
}

#[test]
fn full_range_u16_square_scales_like_u8() {
    let data: Vec<u16> = square_image(50, 20, 20, 10, 255)
        .into_iter()
        .map(|v| u16::from(v) * 257)
        .collect();
    let view = ImageView::from_slice(&data, 50, 50).unwrap();
    let detector = Forstner::new(ForstnerConfig::default()).unwrap();
    let maps = detector.analyze(view).unwrap();

    assert_eq!(
        feature_points(&maps.candidates),
        vec![
            FeaturePoint::new(20, 20),
            FeaturePoint::new(20, 29),
            FeaturePoint::new(29, 20),
            FeaturePoint::new(29, 29),
        ]
    );
    // The weight grows with the squared intensity scale.
    assert_eq!(maps.weight.at(20, 20), 144_500.0 * 257.0 * 257.0);
    assert_eq!(detector.detect(view).unwrap(), vec![FeaturePoint::new(20, 20)]);
}

#[test]
fn full_contrast_u16_stripes_accumulate_exactly() {
    // Columns alternate between 0 and u16::MAX.
    let size = 24;
    let data: Vec<u16> = (0..size * size)
        .map(|i| if i % 2 == 1 { u16::MAX } else { 0 })
        .collect();
    let view = ImageView::from_slice(&data, size, size).unwrap();

    let step = 65_535i128 * 65_535;
    let cov = GrayCovariance::at(&view, 6, 6, 2);
    assert_eq!(cov.guu, 16 * step);
    assert_eq!(cov.gvv, 16 * step);
    assert_eq!(cov.guv, -16 * step);
    assert_eq!(cov.determinant(), 0);
    assert_eq!(cov.trace(), 32 * step);
    assert_eq!(cov.weight(), 0.0);

    let detector = Forstner::new(ForstnerConfig::default()).unwrap();
    assert!(detector.detect(view).unwrap().is_empty());
}

fn gate_fixture() -> (FlagMap, ScoreMap<f64>, ScoreMap<f64>) {
    // Weights 1, 1, 1, 1, 2, 2, 2, 5, 40: mean 55 / 9, median 2.
    let weight = ScoreMap::from_vec(
        vec![1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 5.0, 40.0],
        3,
        3,
    )
    .unwrap();
    let roundness = ScoreMap::from_vec(vec![1.0; 9], 3, 3).unwrap();
    let primary = FlagMap::from_vec(vec![true; 9], 3, 3).unwrap();
    (primary, roundness, weight)
}

fn gate_config(mean_factor: f64, median_factor: f64) -> ForstnerConfig {
    ForstnerConfig {
        q_threshold: 0.5,
        mean_factor,
        median_factor,
        ..ForstnerConfig::default()
    }
}

#[test]
fn median_gate_rejects_weight_that_passes_mean_gate() {
    let (primary, roundness, weight) = gate_fixture();

    // Mean gate 0.5 * 55 / 9 ~ 3.06 keeps w = 5; median gate 5 * 2 = 10 drops it.
    let (candidates, mean, median) =
        forstner_candidates(&primary, &roundness, &weight, &gate_config(0.5, 5.0)).unwrap();
    assert!((mean - 55.0 / 9.0).abs() < 1e-12);
    assert_eq!(median, 2.0);
    assert_eq!(feature_points(&candidates), vec![FeaturePoint::new(2, 2)]);

    // Without the median gate w = 5 survives.
    let (candidates, _, _) =
        forstner_candidates(&primary, &roundness, &weight, &gate_config(0.5, 0.0)).unwrap();
    assert_eq!(
        feature_points(&candidates),
        vec![FeaturePoint::new(2, 1), FeaturePoint::new(2, 2)]
    );
}

#[test]
fn mean_gate_rejects_weight_that_passes_median_gate() {
    let (primary, roundness, weight) = gate_fixture();

    // Median gate 2.5 * 2 = 5 keeps w = 5; mean gate 55 / 9 ~ 6.11 drops it.
    let (candidates, _, _) =
        forstner_candidates(&primary, &roundness, &weight, &gate_config(1.0, 2.5)).unwrap();
    assert_eq!(feature_points(&candidates), vec![FeaturePoint::new(2, 2)]);

    let (candidates, _, _) =
        forstner_candidates(&primary, &roundness, &weight, &gate_config(0.0, 2.5)).unwrap();
    assert_eq!(
        feature_points(&candidates),
        vec![FeaturePoint::new(2, 1), FeaturePoint::new(2, 2)]
    );
}

#[test]
fn roundness_and_primary_gates_reject_alone() {
    let (mut primary, mut roundness, weight) = gate_fixture();
    let cfg = gate_config(0.5, 5.0);

    roundness.set(2, 2, 0.499);
    let (candidates, _, _) = forstner_candidates(&primary, &roundness, &weight, &cfg).unwrap();
    assert_eq!(candidates.count_marked(), 0);

    roundness.set(2, 2, 0.5);
    let (candidates, _, _) = forstner_candidates(&primary, &roundness, &weight, &cfg).unwrap();
    assert_eq!(feature_points(&candidates), vec![FeaturePoint::new(2, 2)]);

    primary.set(2, 2, false);
    let (candidates, _, _) = forstner_candidates(&primary, &roundness, &weight, &cfg).unwrap();
    assert_eq!(candidates.count_marked(), 0);
}

#[test]
fn weight_statistics_include_border_zeros() {
    // 5x5 map: interior 3x3 holds 1..=9, the border ring is zero.
    let mut weight = ScoreMap::<f64>::new(5, 5).unwrap();
    for row in 1..4 {
        for col in 1..4 {
            weight.set(row, col, ((row - 1) * 3 + col) as f64);
        }
    }
    let roundness = ScoreMap::from_vec(vec![1.0; 25], 5, 5).unwrap();
    let primary = FlagMap::from_vec(vec![true; 25], 5, 5).unwrap();
    let cfg = gate_config(1.0, 5.0);

    let (candidates, mean, median) =
        forstner_candidates(&primary, &roundness, &weight, &cfg).unwrap();
    // Interior-only statistics would give mean 5 and median 5.
    assert!((mean - 45.0 / 25.0).abs() < 1e-12);
    assert_eq!(median, 0.0);
    // Mean gate 1.8 keeps weights 2..=9; the median gate is zero.
    assert_eq!(candidates.count_marked(), 8);
    assert!(!candidates.at(1, 1));
    assert!(!candidates.at(0, 0));
}

#[test]
fn mismatched_gate_maps_are_rejected() {
    let (primary, roundness, _) = gate_fixture();
    let weight = ScoreMap::<f64>::new(4, 3).unwrap();
    assert!(matches!(
        forstner_candidates(&primary, &roundness, &weight, &ForstnerConfig::default()),
        Err(PointMatchError::DimensionMismatch { .. })
    ));
}
