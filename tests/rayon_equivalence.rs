#![cfg(feature = "rayon")]

use pointmatch::{
    Forstner, ForstnerConfig, ImageView, InterestDetector, MatchConfig, Moravec, MoravecConfig,
    Offset, StereoPipeline,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn blocky_texture(width: usize, height: usize, seed: u64) -> Vec<u8> {
    // 4x4 blocks give corners that survive both detectors' thresholds.
    let mut rng = StdRng::seed_from_u64(seed);
    let blocks: Vec<u8> = (0..(width / 4 + 1) * (height / 4 + 1))
        .map(|_| rng.random::<u8>())
        .collect();
    let mut data = vec![0u8; width * height];
    for row in 0..height {
        for col in 0..width {
            data[row * width + col] = blocks[(row / 4) * (width / 4 + 1) + col / 4];
        }
    }
    data
}

#[test]
fn moravec_parallel_matches_sequential() {
    let (width, height) = (96, 80);
    let data = blocky_texture(width, height, 21);
    let view = ImageView::from_slice(&data, width, height).unwrap();

    let seq = Moravec::new(MoravecConfig {
        tile_size: 11,
        ..MoravecConfig::default()
    })
    .unwrap();
    let par = Moravec::new(MoravecConfig {
        tile_size: 11,
        parallel: true,
        ..MoravecConfig::default()
    })
    .unwrap();

    let seq_maps = seq.analyze(view).unwrap();
    let par_maps = par.analyze(view).unwrap();
    assert_eq!(seq_maps.interest, par_maps.interest);
    assert_eq!(seq.detect(view).unwrap(), par.detect(view).unwrap());
}

#[test]
fn forstner_parallel_matches_sequential() {
    let (width, height) = (96, 80);
    let data = blocky_texture(width, height, 22);
    let view = ImageView::from_slice(&data, width, height).unwrap();

    let seq = Forstner::new(ForstnerConfig::default()).unwrap();
    let par = Forstner::new(ForstnerConfig {
        parallel: true,
        ..ForstnerConfig::default()
    })
    .unwrap();

    let seq_maps = seq.analyze(view).unwrap();
    let par_maps = par.analyze(view).unwrap();
    assert_eq!(seq_maps.primary, par_maps.primary);
    assert_eq!(seq_maps.weight, par_maps.weight);
    assert_eq!(seq_maps.candidates, par_maps.candidates);
    assert_eq!(seq.detect(view).unwrap(), par.detect(view).unwrap());
}

#[test]
fn matching_parallel_matches_sequential() {
    let (width, height) = (96, 80);
    let reference = blocky_texture(width, height, 23);
    let other: Vec<u8> = (0..width * height)
        .map(|i| {
            let (row, col) = (i / width, i % width);
            reference[row * width + (col + 3).min(width - 1)]
        })
        .collect();
    let ref_view = ImageView::from_slice(&reference, width, height).unwrap();
    let other_view = ImageView::from_slice(&other, width, height).unwrap();

    let detector = Moravec::new(MoravecConfig {
        tile_size: 11,
        ..MoravecConfig::default()
    })
    .unwrap();
    let seq_cfg = MatchConfig::new(Offset::new(0, 0));
    let par_cfg = MatchConfig {
        parallel: true,
        ..seq_cfg.clone()
    };
    let seq = StereoPipeline::new(detector.clone(), seq_cfg).unwrap();
    let par = StereoPipeline::new(detector, par_cfg).unwrap();

    let seq_report = seq.run(ref_view, other_view).unwrap();
    let par_report = par.run(ref_view, other_view).unwrap();
    assert!(!seq_report.features.is_empty());
    assert_eq!(seq_report, par_report);
}
