//! Property tests for classification, debouncing and mode exclusion

use morse_core::{Channel, Debouncer, Duration, Instant, ModeSelector, Symbol, TimingProfile, TransmitMode};
use proptest::prelude::*;

use crate::{decode, UNIT_MS};

proptest! {
    #[test]
    fn classification_splits_at_one_and_a_half_units(unit in 20u64..=500, press in 0u64..3000) {
        let timing = TimingProfile::from_unit_millis(unit);
        let expected = if press * 2 <= unit * 3 { Symbol::Dot } else { Symbol::Dash };
        prop_assert_eq!(timing.classify(Duration::from_millis(press)), expected);
    }

    #[test]
    fn debounced_level_follows_steady_input(
        bounces in prop::collection::vec(1u64..50, 0..20),
        final_level in any::<bool>(),
    ) {
        let mut debouncer = Debouncer::new(Duration::from_millis(50));
        let mut now = 0;
        let mut level = !final_level;
        // Chatter faster than the window never commits
        for hold in bounces {
            debouncer.update(level, Instant::from_millis(now));
            prop_assert!(!debouncer.is_active());
            now += hold;
            level = !level;
        }

        let settle_start = now;
        let mut edges = 0;
        while now <= settle_start + 60 {
            if debouncer.update(final_level, Instant::from_millis(now)).is_some() {
                edges += 1;
            }
            now += 10;
        }
        prop_assert_eq!(debouncer.is_active(), final_level);
        prop_assert!(edges <= 1);
    }

    #[test]
    fn at_most_one_mode_and_it_matches_a_closed_switch(
        samples in prop::collection::vec((any::<bool>(), any::<bool>(), 1u64..120), 1..40),
    ) {
        let mut selector = ModeSelector::new(Duration::from_millis(50));
        let mut now = 0;
        for (one, two, hold) in samples {
            let end = now + hold;
            while now < end {
                selector.update(one, two, Instant::from_millis(now));
                let consistent = match selector.mode() {
                    TransmitMode::None => {
                        !selector.switch_active(Channel::One) && !selector.switch_active(Channel::Two)
                    }
                    TransmitMode::Transmit1 => selector.switch_active(Channel::One),
                    TransmitMode::Transmit2 => selector.switch_active(Channel::Two),
                };
                prop_assert!(consistent);
                now += 10;
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn keyed_words_decode_verbatim(word in "[A-Z0-9]{1,5}") {
        prop_assert_eq!(decode(&word).unwrap(), word);
    }

    #[test]
    fn keying_speed_within_tolerance_decodes(scale in 80u64..=120) {
        // Operator runs up to 20% off the nominal unit
        let unit = UNIT_MS * scale / 100;
        let mut sim = crate::simulation();
        sim.play(&morse_core::test_utils::KeyScript::new(unit).text("PARIS")).unwrap();
        prop_assert_eq!(sim.transcript, "PARIS");
    }
}
