//! Stage, parser and log behavior without any model calls.

use odyssey_core::StoryEvent;
use odyssey_narrative::{
    HERO_JOURNEY_STAGES, ParseOutcome, ParserConfig, ResponseParser, StageTracker, StoryLog,
};

#[test]
fn three_stages_with_34_per_step() {
    let mut tracker = StageTracker::new(["A", "B", "C"]).unwrap();

    assert!(tracker.apply_change(34.0));
    assert_eq!(*tracker.current_stage_index(), 1);
    assert!(tracker.apply_change(34.0));
    assert_eq!(*tracker.current_stage_index(), 2);
    assert!(!tracker.apply_change(34.0));

    assert!(tracker.is_complete());
    assert_eq!(*tracker.progress(), 100.0);
}

#[test]
fn progress_stays_in_range_and_index_never_drops() {
    let deltas = [
        5.0, -20.0, 40.0, 0.0, 250.0, -1.0, 3.5, f64::NAN, 17.0, -300.0, 60.0, 1.0,
    ];
    let mut tracker = StageTracker::hero_journey();
    let mut last_index = 0;

    for delta in deltas {
        tracker.apply_change(delta);
        assert!((0.0..=100.0).contains(tracker.progress()));
        assert!(*tracker.current_stage_index() >= last_index);
        assert!(*tracker.current_stage_index() <= last_index + 1);
        assert_eq!(
            tracker.is_complete(),
            *tracker.current_stage_index() == tracker.stage_count() - 1
        );
        last_index = *tracker.current_stage_index();
    }
}

#[test]
fn default_change_walks_the_hero_journey_one_stage_per_choice() {
    let mut tracker = StageTracker::hero_journey();
    let step = tracker.default_change_per_choice();
    assert_eq!(step, 9.0);

    for expected in 1..HERO_JOURNEY_STAGES.len() {
        assert!(tracker.apply_change(step));
        assert_eq!(*tracker.current_stage_index(), expected);
    }
    assert!(tracker.is_complete());
    assert_eq!(tracker.current_stage(), "Return with the Elixir");
}

#[test]
fn two_choices_are_padded_to_three() {
    let parser = ResponseParser::new(ParserConfig::default().with_strip_markers(true)).unwrap();
    let ParseOutcome::Parsed(scenario) = parser.parse("A storm gathers.\n\n1. Hide\n2. Run") else {
        panic!("expected a scenario");
    };

    assert_eq!(scenario.choices(), &["Hide", "Run", "Option 3"]);
    assert!(!scenario.narrative().contains("Option"));
}

#[test]
fn extra_choices_are_truncated() {
    let parser = ResponseParser::new(ParserConfig::default().with_choice_count(2)).unwrap();
    let scenario = parser
        .parse("Story.\n\n1. A\n2. B\n3. C\n4. D")
        .into_scenario()
        .unwrap();
    assert_eq!(scenario.choices(), &["1. A", "2. B"]);
}

#[test]
fn no_delimiter_means_no_choices_until_fallback() {
    let parser = ResponseParser::new(ParserConfig::default()).unwrap();
    let scenario = parser
        .parse("Just one paragraph with no list.")
        .into_scenario()
        .unwrap();

    assert!(scenario.choices().is_empty());
    let scenario = scenario.with_fallback();
    assert_eq!(scenario.choices().len(), 3);
    assert!(scenario.uses_fallback());
}

#[test]
fn log_keeps_a_thousand_events_in_order() {
    let mut log = StoryLog::new();
    for i in 0..1_000 {
        log.append(StoryEvent::scenario(i / 100, format!("event {i}")));
    }

    assert_eq!(log.len(), 1_000);
    for (i, event) in log.iter().enumerate() {
        assert_eq!(event.kind().text(), Some(format!("event {i}").as_str()));
    }
    assert_eq!(log.tail(2)[1].kind().text(), Some("event 999"));
}
