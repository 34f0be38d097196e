use portal_scene::particles::{DEFAULT_FIREFLY_COUNT, FireflyField};
use rand::{SeedableRng, rngs::StdRng};

#[test]
fn default_field_stays_in_bounds() {
    let field = FireflyField::random(DEFAULT_FIREFLY_COUNT);
    assert_eq!(field.len(), 40);
    assert_eq!(field.positions().len(), 40 * 3);
    assert_eq!(field.scales().len(), 40);

    for i in 0..field.len() {
        let [x, y, z] = field.position(i).unwrap();
        assert!((-2.0..2.0).contains(&x), "x = {}", x);
        assert!((0.0..2.0).contains(&y), "y = {}", y);
        assert!((-2.0..2.0).contains(&z), "z = {}", z);
    }
    for scale in field.scales() {
        assert!((0.0..1.0).contains(scale), "scale = {}", scale);
    }
}

#[test]
fn scales_are_independent_of_positions() {
    let mut rng = StdRng::seed_from_u64(7);
    let field = FireflyField::generate(&mut rng, DEFAULT_FIREFLY_COUNT);

    assert_ne!(field.scales(), &field.positions()[..DEFAULT_FIREFLY_COUNT]);
    for raw in field.to_raw() {
        assert!((0.0..1.0).contains(&raw.scale));
    }
}

#[test]
fn same_seed_gives_same_field() {
    let a = FireflyField::generate(&mut StdRng::seed_from_u64(42), 40);
    let b = FireflyField::generate(&mut StdRng::seed_from_u64(42), 40);
    assert_eq!(a, b);
}
