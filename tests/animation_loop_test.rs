use portal_scene::animation::{Clock, TimeUniform, tick};

use crate::common::test_utils::FrameCounter;

mod common;

#[test]
fn every_tick_renders_once_and_requests_one_frame() {
    let clock = Clock::start();
    let mut frame = FrameCounter::default();

    for n in 1..=10 {
        tick(&clock, &mut frame).unwrap();
        assert_eq!(frame.renders(), n);
        assert_eq!(frame.requests(), n);
        assert_eq!(frame.control_updates(), n);
    }
}

#[test]
fn effects_see_the_same_monotonic_time() {
    let clock = Clock::start();
    let mut frame = FrameCounter::default();
    let mut previous = 0.0;

    for _ in 0..10 {
        std::thread::sleep(std::time::Duration::from_millis(1));
        let elapsed = tick(&clock, &mut frame).unwrap();
        assert_eq!(frame.portal.time(), frame.fireflies.time());
        assert_eq!(frame.portal.time(), elapsed);
        assert!(elapsed >= previous);
        previous = elapsed;
    }
    assert!(previous > 0.0);
}
