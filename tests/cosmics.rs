mod common;

use common::synthetic_event::{EventBuilder, PHI_CLUSTER};
use common::{assert_close, init_logger};
use pattern_combiner::angle::{phi_of, unit_direction};
use pattern_combiner::geometry::signed_offset_xy;
use pattern_combiner::io::EventFile;
use pattern_combiner::types::{HitId, HitKind, Vec3};
use pattern_combiner::{CombineParams, PatternCombiner};
use std::collections::HashSet;
use std::f64::consts::FRAC_PI_2;

/// Vertical cosmic at x = 800, z = 100 crossing the whole detector.
fn vertical_cosmic() -> (EventFile, Vec<HitId>) {
    let mut b = EventBuilder::new();
    let origin = Vec3::new(800.0, 0.0, 100.0);
    let (phi, theta) = (-FRAC_PI_2, FRAC_PI_2);
    // Along (0, -1, 0): negative distances lie at positive y.
    let eta_hits = b.ray(
        origin,
        phi,
        theta,
        &[-9000.0, -7000.0, -5000.0, 5000.0, 7000.0, 9500.0],
        HitKind::Mdt,
        0,
    );
    let phi_hits = b.ray(
        origin,
        phi,
        theta,
        &[-8000.0, -6000.0, 6000.0, 8000.0],
        PHI_CLUSTER,
        0,
    );
    b.eta(origin, phi, theta, &eta_hits)
        .phi(origin, phi, theta, &phi_hits);
    let all = eta_hits.iter().chain(&phi_hits).copied().collect();
    (b.build(), all)
}

fn ids(hits: &[&pattern_combiner::types::Hit]) -> HashSet<HitId> {
    hits.iter().map(|h| h.id).collect()
}

#[test]
fn cosmic_road_through_centre_is_split_into_partitioning_legs() {
    init_logger();
    let (event, all) = vertical_cosmic();
    let inputs = event.resolve().expect("event resolves");

    let (roads, report) = PatternCombiner::new(CombineParams::cosmics())
        .combine_with_report(&inputs.eta, &inputs.phi, &inputs.association)
        .expect("combine");

    assert_eq!(report.matching.refits_applied, 1);
    assert_eq!(report.matching.splits, 1);
    assert_eq!(roads.len(), 2, "one road per leg");
    assert!(roads.iter().all(|r| r.has_phi));

    let first = ids(&roads[0].hits);
    let second = ids(&roads[1].hits);
    assert_eq!(first.len(), 5);
    assert_eq!(second.len(), 5);
    assert!(first.is_disjoint(&second), "legs must not share hits");
    let union: HashSet<HitId> = first.union(&second).copied().collect();
    assert_eq!(union, all.into_iter().collect::<HashSet<_>>());
    assert!(
        roads[0].direction.dot(&roads[1].direction) > 0.0,
        "legs keep the road direction without flipping"
    );
    assert_close(roads[0].position.x, 800.0, 1e-6, "refitted road x");
}

#[test]
fn flipped_second_leg_points_back() {
    init_logger();
    let (event, _) = vertical_cosmic();
    let inputs = event.resolve().expect("event resolves");
    let params = CombineParams {
        flip_direction_for_cosmics: true,
        ..CombineParams::cosmics()
    };

    let roads = PatternCombiner::new(params)
        .combine(&inputs.eta, &inputs.phi, &inputs.association)
        .expect("combine");

    assert_eq!(roads.len(), 2);
    assert!(roads[0].direction.dot(&roads[1].direction) < 0.0);
    assert_eq!(roads[1].len(), 5, "flipped leg keeps its hits after cleaning");
}

#[test]
fn crossing_road_stays_whole_without_splitting() {
    init_logger();
    let (event, _) = vertical_cosmic();
    let inputs = event.resolve().expect("event resolves");
    let params = CombineParams {
        split_patterns: false,
        ..CombineParams::cosmics()
    };

    let (roads, report) = PatternCombiner::new(params)
        .combine_with_report(&inputs.eta, &inputs.phi, &inputs.association)
        .expect("combine");

    assert_eq!(report.matching.splits, 0);
    assert_eq!(roads.len(), 1);
    assert_eq!(roads[0].len(), 10);
}

#[test]
fn short_lever_arm_keeps_phi_parameters() {
    init_logger();
    let mut b = EventBuilder::new();
    let anchor = Vec3::new(3000.0, 1000.0, 500.0);
    let (phi, theta) = (0.4, 1.3);
    // Hits span 1200 mm along the road, below the 2000 mm lever arm.
    let eta_hits = b.ray(anchor, phi, theta, &[0.0, 400.0, 800.0, 1200.0], HitKind::Mdt, 0);
    let phi_hits = b.ray(anchor, phi, theta, &[200.0, 600.0, 1000.0], PHI_CLUSTER, 0);
    b.eta(anchor, phi, theta, &eta_hits)
        .phi(anchor, phi, theta, &phi_hits);
    let event = b.build();
    let inputs = event.resolve().expect("event resolves");

    let (roads, report) = PatternCombiner::new(CombineParams::cosmics())
        .combine_with_report(&inputs.eta, &inputs.phi, &inputs.association)
        .expect("combine");

    assert_eq!(report.matching.refits_rejected, 1);
    assert_eq!(report.matching.accepted_pairs, 1);
    // Every hit is ahead of the origin: the trailing leg has no eta hits.
    assert_eq!(report.matching.splits, 1);
    assert_eq!(report.matching.dropped_legs, 1);
    assert_eq!(roads.len(), 1);

    let road = &roads[0];
    let road_phi = phi_of(&road.direction);
    assert_close(road_phi, phi, 1e-9, "phi of the phi pattern");
    assert_close(
        signed_offset_xy(&road.position, road_phi),
        signed_offset_xy(&anchor, phi),
        1e-6,
        "r0 of the phi pattern",
    );
    assert_close(
        road.direction.normalize().dot(&unit_direction(phi, theta)),
        1.0,
        1e-9,
        "road direction",
    );
    assert_eq!(road.len(), 7);
}
