use blob_dynamics::dynamics::solver::{apply_border_collision, apply_neighbor_distance, smooth_ring};
use blob_dynamics::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn scattered_points(rng: &mut StdRng, count: usize) -> (Vec<Vec2>, Vec<Vec2>) {
    let positions = (0..count)
        .map(|_| Vec2::new(rng.gen_range(-200.0..1000.0), rng.gen_range(-200.0..800.0)))
        .collect();
    let velocities = (0..count)
        .map(|_| Vec2::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)))
        .collect();
    (positions, velocities)
}

fn solver(seed: u64) -> ConstraintSolver {
    let mut rng = StdRng::seed_from_u64(seed);
    let physics = PhysicsParameters::default();
    ConstraintSolver::new(
        physics,
        Bounds::new(800.0, 600.0),
        16.0,
        Stabilizer::new(24, physics.stabilization_rate, &mut rng),
        Validator::new(StdRng::seed_from_u64(seed + 1)),
    )
}

#[test]
fn border_keeps_every_point_inside_padding() {
    let mut rng = StdRng::seed_from_u64(42);
    let bounds = Bounds::new(800.0, 600.0);
    let padding = 16.0;

    for _ in 0..20 {
        let (mut positions, mut velocities) = scattered_points(&mut rng, 32);
        let mut center = Vec2::new(rng.gen_range(-50.0..900.0), rng.gen_range(-50.0..700.0));
        apply_border_collision(&mut positions, &mut velocities, &mut center, bounds, padding, 0.2);

        for p in positions.iter().chain(std::iter::once(&center)) {
            assert!(p.x >= padding && p.x <= bounds.width - padding, "x = {}", p.x);
            assert!(p.y >= padding && p.y <= bounds.height - padding, "y = {}", p.y);
        }
    }
}

#[test]
fn neighbor_distances_converge_into_band() {
    let center = Vec2::new(400.0, 300.0);
    let mut shape = ShapeState::circle(center, 250.0, 24);
    shape.positions[5] += Vec2::new(200.0, 150.0);
    shape.positions[17] = shape.positions[18] + Vec2::new(1.0, 0.0);

    let physics = PhysicsParameters::default();
    let min = physics.min_neighbor_distance(250.0);
    let max = physics.max_neighbor_distance(250.0);

    let worst = |positions: &[Vec2]| {
        (0..positions.len())
            .map(|i| {
                let d = positions[i].distance(positions[(i + 1) % positions.len()]);
                (min - d).max(d - max).max(0.0)
            })
            .fold(0.0_f32, f32::max)
    };

    let initial = worst(&shape.positions);
    assert!(initial > 0.0);
    for _ in 0..60 {
        apply_neighbor_distance(&mut shape.positions, &mut shape.velocities, min, max);
    }
    assert!(worst(&shape.positions) < 0.1, "violation {}", worst(&shape.positions));
}

#[test]
fn too_close_pairs_are_pushed_apart() {
    let mut positions = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.5, 40.0)];
    let mut velocities = vec![Vec2::ZERO; 3];
    apply_neighbor_distance(&mut positions, &mut velocities, 10.0, 100.0);

    assert!(positions[0].distance(positions[1]) > 1.0);
    assert!(velocities[0].x < 0.0);
}

#[test]
fn smoothing_shrinks_spikes() {
    let mut shape = ShapeState::circle(Vec2::ZERO, 100.0, 16);
    shape.positions[3] *= 1.5;
    let mut scratch = Vec::new();
    let before = shape.positions[3].length();
    smooth_ring(&mut shape.positions, &mut scratch);
    assert!(shape.positions[3].length() < before);
}

#[test]
fn validator_is_idempotent_on_valid_state() {
    let mut validator = Validator::new(StdRng::seed_from_u64(5));
    let mut shape = ShapeState::circle(Vec2::new(400.0, 300.0), 250.0, 24);
    shape.velocities[7] = Vec2::new(3.0, -1.0);
    let before = shape.clone();

    for _ in 0..3 {
        assert_eq!(validator.validate(&mut shape, Vec2::ZERO), ValidationOutcome::Valid);
    }
    assert_eq!(shape, before);
}

#[test]
fn repaired_state_validates_cleanly() {
    let mut validator = Validator::new(StdRng::seed_from_u64(5));
    let mut shape = ShapeState::circle(Vec2::new(400.0, 300.0), 250.0, 24);
    shape.positions[0].x = f32::INFINITY;

    assert!(validator.validate(&mut shape, Vec2::ZERO).is_repaired());
    let repaired = shape.clone();
    assert_eq!(validator.validate(&mut shape, Vec2::ZERO), ValidationOutcome::Valid);
    assert_eq!(shape, repaired);

    for p in &shape.positions {
        let d = p.distance(shape.center);
        assert!((225.0 - 1e-3..=275.0 + 1e-3).contains(&d), "distance {d}");
    }
}

#[test]
fn stabilizer_runs_only_when_motionless() {
    let mut solver = solver(3);
    let mut profiler = TickProfiler::default();

    let mut shape = ShapeState::circle(Vec2::new(400.0, 300.0), 250.0, 24);
    let moving = solver.solve(&mut shape, true, &mut profiler);
    assert!(!moving.stabilized);

    let resting = solver.solve(&mut shape, false, &mut profiler);
    assert!(resting.stabilized);
    assert_eq!(resting.validation, ValidationOutcome::Valid);
}

#[test]
fn shrunken_ring_is_restored_by_the_pipeline() {
    let mut solver = solver(4);
    let mut profiler = TickProfiler::default();
    let mut shape = ShapeState::circle(Vec2::new(400.0, 300.0), 200.0, 24);
    shape.radius = 250.0;

    let metrics = solver.solve(&mut shape, false, &mut profiler);
    assert!(metrics.rescaled);
    let ratio = shape.mean_radius() / shape.radius;
    assert!((0.9..=1.1).contains(&ratio), "ratio {ratio}");
}

#[test]
fn validate_recenters_a_lost_ring_on_the_widget() {
    let mut solver = solver(9);
    let mut shape = ShapeState::circle(Vec2::new(120.0, 90.0), 100.0, 24);
    assert_eq!(solver.validate(&mut shape), ValidationOutcome::Valid);

    shape.center = Vec2::new(f32::NAN, 90.0);
    assert_eq!(
        solver.validate(&mut shape),
        ValidationOutcome::Repaired {
            invalid_points: 0,
            center_reset: true
        }
    );
    assert_eq!(shape.center, Vec2::new(400.0, 300.0));
    assert!(shape.positions.iter().all(|p| p.is_finite()));
    assert!(shape.velocities.iter().all(|v| *v == Vec2::ZERO));
}
