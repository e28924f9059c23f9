//! Monte Carlo interval over the four change strata

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use svmp_confidence::{
    soundwide_change, MonteCarloConfig, MonteCarloSimulator, StratumChangeData,
};
use svmp_strata::{
    AnalysisStratum, Site, SiteCharacteristics, SoundwideConstants, StratifiedSites,
    StratumConstants, StratumLookup,
};

struct Survey {
    frame: Vec<SiteCharacteristics>,
    y1: Vec<Site>,
    y2: Vec<Site>,
    sample_areas: HashMap<String, f64>,
}

/// Two years of synthetic data with a 5% decline everywhere
fn survey(seed: u64) -> Survey {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut frame = Vec::new();
    let mut y1 = Vec::new();
    let mut y2 = Vec::new();
    let mut sample_areas = HashMap::new();

    let groups = [
        ("core", "fr", "core", 4),
        ("pfl", "fl", "persistent", 2),
        ("flt", "fl", "rotational", 9),
        ("cps", "fr", "rotational", 12),
        ("swh", "frw", "rotational", 5),
    ];
    for (prefix, geo, sampling, n) in groups {
        for i in 0..n {
            let id = format!("{prefix}{i:04}");
            let area: f64 = rng.gen_range(50.0..500.0);
            frame.push(SiteCharacteristics::new(id.clone(), geo, sampling));
            y1.push(Site::new(id.clone(), area, area / 4.0));
            if sampling == "rotational" && geo == "fl" {
                sample_areas.insert(id.clone(), 2000.0);
            }
            // Site 0 of each rotational group was not revisited
            if sampling == "rotational" && i == 0 {
                continue;
            }
            y2.push(Site::new(id, area * 0.95, area / 4.0));
        }
    }
    Survey {
        frame,
        y1,
        y2,
        sample_areas,
    }
}

#[test]
fn test_interval_over_change_strata() {
    let survey = survey(2024);
    let lookup = StratumLookup::area_change();
    let constants = SoundwideConstants::new()
        .with(AnalysisStratum::Flats, StratumConstants::area(40, 100_000.0))
        .with(AnalysisStratum::Fringe, StratumConstants::linear(60, 80_000.0))
        .with(AnalysisStratum::WideFringe, StratumConstants::linear(20, 25_000.0));

    let y2_frame: Vec<SiteCharacteristics> = survey
        .frame
        .iter()
        .filter(|c| survey.y2.iter().any(|s| s.id == c.site_id))
        .cloned()
        .collect();
    let year1 = StratifiedSites::group(&lookup, &survey.frame, &survey.y1, &survey.sample_areas)
        .unwrap()
        .samples(&constants)
        .unwrap();
    let year2 = StratifiedSites::group(&lookup, &y2_frame, &survey.y2, &survey.sample_areas)
        .unwrap()
        .samples(&constants)
        .unwrap();
    assert_eq!(year1.len(), 4);
    // Persistent flats counted with core in change mode
    assert_eq!(year1[0].ni(), 6);

    let strata: Vec<StratumChangeData> = year1
        .into_iter()
        .zip(&year2)
        .map(|(y1, y2)| StratumChangeData::from_years(y1, y2).unwrap())
        .collect();
    assert_eq!(strata[2].y1.ni(), 12);
    assert_eq!(strata[2].y1m.ni(), 11);

    let observed = soundwide_change(&strata).unwrap();
    assert!((observed.change_prop + 0.05).abs() < 1e-9);

    let config = MonteCarloConfig::builder()
        .with_iterations(400)
        .with_seed(7)
        .build()
        .unwrap();
    let result = MonteCarloSimulator::new(config).run(&strata).unwrap();
    assert_eq!(result.iterations(), 400);
    assert!(result.half_width > 0.0);
    assert!(result.interval.contains(observed.change_prop));
    assert!((result.mean - observed.change_prop).abs() < 0.02);
}

#[test]
fn test_fixed_seed_is_reproducible() {
    let survey = survey(1);
    let constants = SoundwideConstants::new()
        .with(AnalysisStratum::Flats, StratumConstants::area(40, 100_000.0))
        .with(AnalysisStratum::Fringe, StratumConstants::linear(60, 80_000.0))
        .with(AnalysisStratum::WideFringe, StratumConstants::linear(20, 25_000.0));
    let lookup = StratumLookup::area_change();
    let y1 = StratifiedSites::group(&lookup, &survey.frame, &survey.y1, &survey.sample_areas)
        .unwrap()
        .samples(&constants)
        .unwrap();
    let strata: Vec<StratumChangeData> = y1
        .iter()
        .map(|s| StratumChangeData::from_years(s.clone(), s).unwrap())
        .collect();

    let run = || {
        let config = MonteCarloConfig::builder()
            .with_iterations(50)
            .with_seed(99)
            .build()
            .unwrap();
        MonteCarloSimulator::new(config).run(&strata).unwrap()
    };
    assert_eq!(run().proportion_changes, run().proportion_changes);
}
