//! End-to-end session lifecycle tests against the manual frame host.
//!
//! Run with: cargo test -p scramble-runtime --test session_lifecycle

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use scramble_core::{Cell, ScrambleConfig, SeededRandom};
use scramble_runtime::{
    FrameHost, FrameOutcome, Hooks, ManualFrames, SchedulerState, Session, StringSink,
};

/// One refresh; comfortably above the 60 Hz baseline.
const FRAME: Duration = Duration::from_millis(17);
const FRAME_CAP: usize = 20_000;

/// Counts of hook invocations, shared with the hooks themselves.
#[derive(Debug, Default)]
struct Calls {
    starts: usize,
    frames: Vec<String>,
    completes: usize,
}

fn observed(calls: &Rc<RefCell<Calls>>) -> Hooks {
    let start = Rc::clone(calls);
    let frame = Rc::clone(calls);
    let complete = Rc::clone(calls);
    Hooks::new()
        .on_start(move || start.borrow_mut().starts += 1)
        .on_frame(move |text| frame.borrow_mut().frames.push(text.to_owned()))
        .on_complete(move || complete.borrow_mut().completes += 1)
}

fn session(text: &str, config: ScrambleConfig, seed: u64) -> Session<ManualFrames> {
    Session::new(text, config, ManualFrames::new())
        .with_random(SeededRandom::seeded(seed))
        .with_sink(StringSink::recording())
}

fn step(session: &mut Session<ManualFrames>) -> Option<FrameOutcome> {
    session.host_mut().advance(FRAME);
    session.pump()
}

fn run_to_completion(session: &mut Session<ManualFrames>) -> usize {
    for refresh in 1..=FRAME_CAP {
        if step(session) == Some(FrameOutcome::Completed) {
            return refresh;
        }
    }
    panic!("no completion; last output {:?}", session.output());
}

#[test]
fn cat_converges_and_completes_once() {
    let calls = Rc::new(RefCell::new(Calls::default()));
    let cfg = ScrambleConfig::default().scramble(2).seed(0).ignore([]);
    let mut s = session("CAT", cfg, 5).with_hooks(observed(&calls));
    s.mount();
    run_to_completion(&mut s);

    assert_eq!(s.output(), "CAT");
    assert_eq!(s.state(), SchedulerState::Completed);
    assert_eq!(s.host().pending_count(), 0);

    // Further refreshes do nothing.
    for _ in 0..10 {
        assert_eq!(step(&mut s), None);
    }

    let calls = calls.borrow();
    assert_eq!(calls.starts, 1);
    assert_eq!(calls.completes, 1);
    assert_eq!(calls.frames.last().map(String::as_str), Some("CAT"));
    assert_eq!(calls.frames.len() as u64, s.frames_accepted());
}

#[test]
fn stale_delivery_after_completion_is_ignored() {
    let calls = Rc::new(RefCell::new(Calls::default()));
    let mut s = session("ok", ScrambleConfig::default(), 6).with_hooks(observed(&calls));
    s.mount();
    // Capture a token the session will have moved past.
    let stale = s.host_mut().request_frame();
    s.host_mut().cancel_frame(stale);
    run_to_completion(&mut s);

    let before = s.output().to_owned();
    assert_eq!(s.on_frame(stale, FRAME * 1000), FrameOutcome::Stale);
    assert_eq!(s.output(), before);
    assert_eq!(calls.borrow().completes, 1);
}

#[test]
fn reconfiguring_never_stacks_requests() {
    let mut s = session("steady pace", ScrambleConfig::default(), 7);
    s.mount();
    for speed in [1.0, 0.5, 0.75, 1.0, 0.2] {
        step(&mut s);
        s.configure("steady pace", ScrambleConfig::default().speed(speed));
        assert!(s.host().pending_count() <= 1);
    }
    s.replay();
    s.replay();
    assert_eq!(s.host().pending_count(), 1);
}

#[test]
fn speed_change_applies_on_next_frame() {
    let text = "a fairly long line of text to reveal";
    let mut s = session(text, ScrambleConfig::default().speed(0.25), 8);
    s.mount();
    let mut accepted_slow = 0;
    for _ in 0..40 {
        if step(&mut s) == Some(FrameOutcome::Rendered) {
            accepted_slow += 1;
        }
    }
    // 66.7ms spacing against 17ms refreshes: one frame in four.
    assert_eq!(accepted_slow, 10);

    s.configure(text, ScrambleConfig::default().speed(1.0));
    while !s.is_complete() {
        let outcome = step(&mut s);
        assert!(
            matches!(
                outcome,
                Some(FrameOutcome::Rendered | FrameOutcome::Completed)
            ),
            "full speed throttled: {outcome:?}"
        );
    }
    assert_eq!(s.output(), text);
}

#[test]
fn zero_speed_parks_until_resumed() {
    let mut s = session("wait", ScrambleConfig::default().speed(0.0), 9);
    s.mount();
    assert_eq!(s.state(), SchedulerState::Running);
    assert_eq!(s.host().pending_count(), 0);
    for _ in 0..5 {
        assert_eq!(step(&mut s), None);
    }
    assert_eq!(s.frames_accepted(), 0);

    s.configure("wait", ScrambleConfig::default().speed(1.0));
    assert_eq!(s.host().pending_count(), 1);
    run_to_completion(&mut s);
    assert_eq!(s.output(), "wait");
}

#[test]
fn parked_mid_animation_keeps_state() {
    let mut s = session("hold still", ScrambleConfig::default(), 10);
    s.mount();
    step(&mut s);
    step(&mut s);
    s.configure("hold still", ScrambleConfig::default().speed(0.0));
    let frozen: Vec<Cell> = s.cells().to_vec();
    for _ in 0..5 {
        step(&mut s);
    }
    assert_eq!(s.cells(), frozen.as_slice());
}

#[test]
fn detached_sink_pauses_progress() {
    let mut s = session("sink test", ScrambleConfig::default(), 11);
    s.mount();
    step(&mut s);
    let sink = s.detach_sink();
    let frontier = s.frontier();
    for _ in 0..5 {
        assert_eq!(step(&mut s), Some(FrameOutcome::Skipped));
    }
    assert_eq!(s.frontier(), frontier);

    if let Some(sink) = sink {
        s.attach_sink(sink);
    }
    run_to_completion(&mut s);
    assert_eq!(s.sink().map(StringSink::current), Some("sink test"));
}

#[test]
fn play_on_mount_off_reveals_without_scheduling() {
    let calls = Rc::new(RefCell::new(Calls::default()));
    let cfg = ScrambleConfig::default().play_on_mount(false);
    let mut s = session("instant", cfg, 12).with_hooks(observed(&calls));
    s.mount();

    assert_eq!(s.output(), "instant");
    assert_eq!(s.host().pending_count(), 0);
    assert_eq!(step(&mut s), None);
    let calls = calls.borrow();
    assert_eq!(calls.starts, 0);
    assert_eq!(calls.frames, vec!["instant".to_owned()]);
    assert_eq!(calls.completes, 1);
}

#[test]
fn overflow_text_change_restarts_from_nothing() {
    let mut s = session("HELLO", ScrambleConfig::default().overflow(true), 13);
    s.mount();
    step(&mut s);
    step(&mut s);
    step(&mut s);

    s.set_text("HI");
    assert!(s.cells().is_empty());
    assert_eq!(s.frontier(), 0);
    assert_eq!(step(&mut s), Some(FrameOutcome::Rendered));
    assert_eq!(s.cells().len(), 1);
    run_to_completion(&mut s);
    assert_eq!(s.output(), "HI");
}

#[test]
fn preserve_text_change_keeps_matching_prefix() {
    let cfg = ScrambleConfig::default().overflow(false).scramble(4);
    let mut s = session("HELLO", cfg, 14);
    s.mount();
    run_to_completion(&mut s);

    s.set_text("HI");
    assert_eq!(s.cells().len(), 5, "buffer resizes gradually, not at once");
    let mut lengths = vec![s.cells().len()];
    loop {
        let outcome = step(&mut s);
        assert!(s.output().starts_with('H'), "prefix lost in {:?}", s.output());
        lengths.push(s.cells().len());
        if outcome == Some(FrameOutcome::Completed) {
            break;
        }
    }
    assert_eq!(s.output(), "HI");
    assert!(lengths.windows(2).all(|w| w[0].abs_diff(w[1]) <= 1));
}

#[test]
fn each_play_fires_start_once() {
    let calls = Rc::new(RefCell::new(Calls::default()));
    let mut s = session("again", ScrambleConfig::default(), 15).with_hooks(observed(&calls));
    s.mount();
    run_to_completion(&mut s);
    s.replay();
    run_to_completion(&mut s);

    let calls = calls.borrow();
    assert_eq!(calls.starts, 2);
    assert_eq!(calls.completes, 2);
}

#[test]
fn stop_is_idempotent_and_final() {
    let mut s = session("halt", ScrambleConfig::default(), 16);
    s.mount();
    step(&mut s);
    s.stop();
    s.stop();
    assert_eq!(s.state(), SchedulerState::Cancelled);
    assert_eq!(s.host().pending_count(), 0);
    assert_eq!(step(&mut s), None);

    // A text change after teardown does not resurrect the loop.
    s.set_text("other");
    assert_eq!(s.host().pending_count(), 0);
}

#[test]
fn dropping_session_cancels_request() {
    let mut host = ManualFrames::new();
    {
        let mut s = Session::new("bye", ScrambleConfig::default(), &mut host)
            .with_sink(StringSink::new());
        s.mount();
    }
    assert_eq!(host.pending_count(), 0);
}

#[test]
fn same_seed_same_frames() {
    let frames = |seed| {
        let cfg = ScrambleConfig::default().scramble(3).seed(2).overdrive(true);
        let mut s = session("deterministic", cfg, seed);
        s.mount();
        run_to_completion(&mut s);
        s.sink()
            .map(|sink| sink.history().to_vec())
            .unwrap_or_default()
    };
    assert_eq!(frames(42), frames(42));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_play_completes_exactly_once(
        text in "[A-Za-z .]{0,24}",
        step_by in 1u32..4,
        tick in 1u32..3,
        scramble in 0u32..5,
        speed in prop_oneof![Just(1.0), Just(0.5), 0.1f64..=1.0],
        seed in any::<u64>(),
    ) {
        let calls = Rc::new(RefCell::new(Calls::default()));
        let cfg = ScrambleConfig::default()
            .step(step_by)
            .tick(tick)
            .scramble(scramble)
            .speed(speed);
        let mut s = session(&text, cfg, seed).with_hooks(observed(&calls));
        s.mount();
        let mut done = false;
        for _ in 0..FRAME_CAP {
            if step(&mut s) == Some(FrameOutcome::Completed) {
                done = true;
                break;
            }
        }
        prop_assert!(done, "no completion for {:?}", text);
        for _ in 0..5 {
            step(&mut s);
        }
        prop_assert_eq!(s.output(), text.as_str());
        prop_assert_eq!(calls.borrow().completes, 1);
        prop_assert_eq!(calls.borrow().starts, 1);
    }
}
