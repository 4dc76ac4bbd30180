use std::fs::File;
use std::io::{self, BufReader, Cursor, LineWriter, Write};
use std::thread;
use std::time::{Duration, Instant};

use track_engine::{
    run_editor, run_player, Concurrency, Frame, InputError, KeyEvent, KeyFeed, KeySource,
    ScriptedKeys, SessionConfig, SessionError, SessionOutcome, TrackError, TrackHeader,
    TrackReader, TrackWriter, Variant,
};

fn fast(variant: Variant) -> SessionConfig {
    let mut config = variant.config();
    config.frame_budget = Duration::from_millis(1);
    config
}

fn reader(map: &str) -> TrackReader<Cursor<Vec<u8>>> {
    TrackReader::new(Cursor::new(map.as_bytes().to_vec())).expect("track")
}

/// Terminal whose reads always fail.
struct BrokenKeys;

impl KeySource for BrokenKeys {
    fn poll_key(&mut self, _timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
        Err(InputError::Read(io::Error::new(io::ErrorKind::Other, "tty gone")))
    }

    fn read_key(&mut self) -> Result<KeyEvent, InputError> {
        Err(InputError::Read(io::Error::new(io::ErrorKind::Other, "tty gone")))
    }
}

fn write_map(dir: &tempfile::TempDir, name: &str, text: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).expect("create map");
    file.write_all(text.as_bytes()).expect("write map");
    path
}

#[test]
fn player_that_never_moves_reaches_the_goal() {
    let mut track = reader("(40)(20)\n19 21\n");
    let mut out = Vec::new();

    let report = run_player(
        &fast(Variant::Racer),
        ScriptedKeys::default(),
        &mut track,
        &mut out,
    )
    .expect("session");

    assert_eq!(report.outcome, SessionOutcome::Goal);
    assert_eq!(report.track_frames, 1);
}

#[test]
fn steering_onto_the_right_margin_crashes_on_that_frame() {
    let mut track = reader("(40)(20)\n19 21\n");
    let mut out = Vec::new();

    let report = run_player(
        &fast(Variant::Racer),
        ScriptedKeys::from_chars("k"),
        &mut track,
        &mut out,
    )
    .expect("session");

    assert_eq!(report.outcome, SessionOutcome::Crash { frame: 1, xpos: 21 });
    let text = String::from_utf8(out).expect("utf8");
    let last = text.lines().last().expect("crash line");
    assert_eq!(last.as_bytes()[21], b'X');
    assert_eq!(last.as_bytes()[19], b'#');
}

#[test]
fn goal_after_exactly_n_play_cycles() {
    let frames = 25;
    let mut map = String::from("(30)(15)\n");
    for _ in 0..frames {
        map.push_str("5 25\n");
    }
    let mut track = reader(&map);
    let mut out = Vec::new();

    let report = run_player(
        &fast(Variant::Racer),
        ScriptedKeys::from_chars("jjkkjk"),
        &mut track,
        &mut out,
    )
    .expect("session");

    assert_eq!(report.outcome, SessionOutcome::Goal);
    assert_eq!(report.stats.frames, frames);
    assert_eq!(String::from_utf8(out).expect("utf8").lines().count(), frames as usize);
}

#[test]
fn malformed_frame_line_is_fatal_with_its_line_number() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_map(&dir, "broken.map", "(40)(20)\n19 21\nabc def\n19 21\n");
    let file = File::open(&path).expect("open map");
    let mut track = TrackReader::new(BufReader::new(file)).expect("header");
    let mut out = Vec::new();

    let result = run_player(
        &fast(Variant::Racer),
        ScriptedKeys::default(),
        &mut track,
        &mut out,
    );

    match result {
        Err(SessionError::Track(TrackError::FrameFormat { frame, line, .. })) => {
            assert_eq!(frame, 2);
            assert_eq!(line, 3);
        }
        other => panic!("expected a frame format error, got {other:?}"),
    }
    // Only the good frame was drawn.
    assert_eq!(String::from_utf8(out).expect("utf8").lines().count(), 1);
}

#[test]
fn out_of_range_frame_is_fatal() {
    let mut track = reader("(40)(20)\n19 21\n0 21\n");
    let mut out = Vec::new();

    let result = run_player(
        &fast(Variant::Racer),
        ScriptedKeys::default(),
        &mut track,
        &mut out,
    );

    assert!(matches!(
        result,
        Err(SessionError::Track(TrackError::FrameRange { frame: 2, line: 3, .. }))
    ));
}

#[test]
fn editor_recording_reads_back_identically() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("recorded.map");
    let keys = "jjkscvdfgzjjjjjjjjjjjjjjjjjjjkkkk";

    let expected = {
        let header = TrackHeader::centered(24);
        let mut state = track_engine::EditorState::from_header(header).expect("state");
        let mut frames = Vec::new();
        for ch in keys.chars() {
            if let Some(command) = track_engine::EditorCommand::decode(KeyEvent::Char(ch)) {
                state.apply(command);
            }
            frames.push(state.frame());
        }
        frames
    };

    {
        let file = LineWriter::new(File::create(&path).expect("create map"));
        let mut track = TrackWriter::create(file, TrackHeader::centered(24)).expect("writer");
        let mut out = Vec::new();
        // Explicit quit so nothing trails the last recorded frame.
        let script = ScriptedKeys::from_chars(&format!("{keys}Q"));
        let report =
            run_editor(&fast(Variant::Editor), script, &mut track, &mut out).expect("session");
        assert_eq!(report.outcome, SessionOutcome::Quit);
        assert_eq!(report.track_frames, keys.len());
    }

    let file = File::open(&path).expect("open map");
    let mut track = TrackReader::new(BufReader::new(file)).expect("header");
    let mut read_back = Vec::new();
    while let Some(frame) = track.next_frame().expect("frame") {
        read_back.push(frame);
    }
    assert_eq!(read_back, expected);
}

#[test]
fn threaded_editor_sees_quit_pressed_during_its_sleep() {
    let mut config = Variant::ThreadEditor.config();
    config.frame_budget = Duration::from_secs(2);
    let (feeder, feed) = KeyFeed::channel();
    let mut track = TrackWriter::create(Vec::new(), TrackHeader::centered(20)).expect("writer");
    let mut out = Vec::new();

    let started = Instant::now();
    let report = thread::scope(|scope| {
        let session = scope.spawn(|| run_editor(&config, feed, &mut track, &mut out));
        thread::sleep(Duration::from_millis(100));
        assert!(feeder.press_char('Q'));
        session.join().expect("session thread")
    })
    .expect("session");

    assert_eq!(report.outcome, SessionOutcome::Quit);
    assert_eq!(report.track_frames, 1);
    assert!(started.elapsed() < Duration::from_millis(1500));
    let written = String::from_utf8(track.into_inner()).expect("utf8");
    assert_eq!(written, "(20)(10)\n4 16\n");
}

#[test]
fn threaded_editor_applies_keys_before_the_next_frame() {
    let mut config = Variant::ThreadEditor.config();
    config.frame_budget = Duration::from_millis(300);
    let (feeder, feed) = KeyFeed::channel();
    let mut track = TrackWriter::create(Vec::new(), TrackHeader::centered(20)).expect("writer");
    let mut out = Vec::new();

    let report = thread::scope(|scope| {
        let session = scope.spawn(|| run_editor(&config, feed, &mut track, &mut out));
        thread::sleep(Duration::from_millis(100));
        feeder.press_char('j');
        feeder.press_char('j');
        feeder.press_char('g');
        // Quit halfway through the second frame's sleep.
        thread::sleep(Duration::from_millis(350));
        feeder.press_char('Q');
        session.join().expect("session thread")
    })
    .expect("session");

    assert_eq!(report.outcome, SessionOutcome::Quit);
    let written = String::from_utf8(track.into_inner()).expect("utf8");
    assert_eq!(written, "(20)(10)\n4 16\n2 15\n");
}

#[test]
fn latched_racer_moves_once_per_track_frame() {
    let mut config = Variant::LatchedRacer.config();
    config.frame_budget = Duration::from_millis(300);
    let (feeder, feed) = KeyFeed::channel();
    let mut track = reader("(40)(20)\n10 30\n");
    let mut out = Vec::new();

    let report = thread::scope(|scope| {
        let session = scope.spawn(|| run_player(&config, feed, &mut track, &mut out));
        thread::sleep(Duration::from_millis(50));
        for _ in 0..3 {
            feeder.press_char('k');
        }
        session.join().expect("session thread")
    })
    .expect("session");

    assert_eq!(report.outcome, SessionOutcome::Goal);
    assert_eq!(report.stats.keys_applied, 1);
    assert_eq!(report.stats.keys_ignored, 2);
    let text = String::from_utf8(out).expect("utf8");
    assert_eq!(text.lines().next().map(|line| line.as_bytes()[21]), Some(b'V'));
}

#[test]
fn threaded_racer_applies_every_key() {
    let mut config = Variant::ThreadRacer.config();
    config.frame_budget = Duration::from_millis(300);
    assert_eq!(config.concurrency, Concurrency::Threaded);
    let (feeder, feed) = KeyFeed::channel();
    let mut track = reader("(40)(20)\n10 30\n");
    let mut out = Vec::new();

    let report = thread::scope(|scope| {
        let session = scope.spawn(|| run_player(&config, feed, &mut track, &mut out));
        thread::sleep(Duration::from_millis(50));
        for _ in 0..3 {
            feeder.press_char('j');
        }
        session.join().expect("session thread")
    })
    .expect("session");

    assert_eq!(report.outcome, SessionOutcome::Goal);
    assert_eq!(report.stats.keys_applied, 3);
    let text = String::from_utf8(out).expect("utf8");
    assert_eq!(text.lines().next().map(|line| line.as_bytes()[17]), Some(b'V'));
}

#[test]
fn threaded_player_stops_reading_after_quit() {
    let mut config = Variant::ThreadRacer.config();
    config.frame_budget = Duration::from_millis(200);
    let (feeder, feed) = KeyFeed::channel();
    let mut track = reader("(40)(20)\n10 30\n10 30\n10 30\n10 30\n");
    let mut out = Vec::new();

    let report = thread::scope(|scope| {
        let session = scope.spawn(|| run_player(&config, feed, &mut track, &mut out));
        thread::sleep(Duration::from_millis(300));
        feeder.press(KeyEvent::Interrupt);
        session.join().expect("session thread")
    })
    .expect("session");

    assert_eq!(report.outcome, SessionOutcome::Quit);
    assert_eq!(report.track_frames, 2);
    assert_eq!(report.stats.frames, 1);
}

#[test]
fn editor_frames_always_stay_inside_the_track() {
    let width = 20;
    let keys = "ssssssssssssssssssssggggggggggggggggggggggggccccccccccccccccvvvvvvvvvvdddddddddddddffffffffffffffjjjjjjjjjjjjjjjjjjjjjkkkkkkkkkkkkkkkkkkkkkkkk";
    let mut track = TrackWriter::create(Vec::new(), TrackHeader::centered(width)).expect("writer");
    let mut out = Vec::new();

    run_editor(
        &fast(Variant::Editor),
        ScriptedKeys::from_chars(&format!("{keys}Q")),
        &mut track,
        &mut out,
    )
    .expect("session");

    let written = String::from_utf8(track.into_inner()).expect("utf8");
    let mut reread = reader(&written);
    let mut count = 0;
    while let Some(Frame { left, right }) = reread.next_frame().expect("frame") {
        assert!(1 <= left && left < right && right <= width - 1);
        count += 1;
    }
    assert_eq!(count, keys.len());
}

#[test]
fn threaded_racer_crash_draws_the_crash_line() {
    let mut config = Variant::ThreadRacer.config();
    config.frame_budget = Duration::from_millis(300);
    let (feeder, feed) = KeyFeed::channel();
    let mut track = reader("(40)(20)\n19 21\n19 21\n19 21\n");
    let mut out = Vec::new();

    let report = thread::scope(|scope| {
        let session = scope.spawn(|| run_player(&config, feed, &mut track, &mut out));
        thread::sleep(Duration::from_millis(50));
        feeder.press_char('k');
        session.join().expect("session thread")
    })
    .expect("session");

    assert_eq!(report.outcome, SessionOutcome::Crash { frame: 1, xpos: 21 });
    assert_eq!(report.track_frames, 1);
    let text = String::from_utf8(out).expect("utf8");
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2);
    assert_eq!(&lines[0][19..22], "# V");
    assert_eq!(&lines[1][19..22], "# X");
}

#[test]
fn input_read_failure_ends_every_session_kind() {
    let mut long_map = String::from("(40)(20)\n");
    for _ in 0..100 {
        long_map.push_str("10 30\n");
    }

    for variant in [Variant::Racer, Variant::LatchedRacer, Variant::ThreadRacer] {
        let mut config = variant.config();
        config.frame_budget = Duration::from_millis(20);
        let mut track = reader(&long_map);
        let mut out = Vec::new();

        let result = run_player(&config, BrokenKeys, &mut track, &mut out);

        assert!(
            matches!(result, Err(SessionError::Input(InputError::Read(_)))),
            "{variant} gave {result:?}"
        );
    }

    for variant in [Variant::Editor, Variant::ThreadEditor] {
        let mut config = variant.config();
        config.frame_budget = Duration::from_millis(20);
        let mut track = TrackWriter::create(Vec::new(), TrackHeader::centered(20)).expect("writer");
        let mut out = Vec::new();

        let result = run_editor(&config, BrokenKeys, &mut track, &mut out);

        assert!(
            matches!(result, Err(SessionError::Input(InputError::Read(_)))),
            "{variant} gave {result:?}"
        );
    }
}

#[test]
fn threaded_editor_ends_when_input_closes() {
    let mut config = Variant::ThreadEditor.config();
    config.frame_budget = Duration::from_millis(300);
    let (feeder, feed) = KeyFeed::channel();
    let mut track = TrackWriter::create(Vec::new(), TrackHeader::centered(20)).expect("writer");
    let mut out = Vec::new();

    let report = thread::scope(|scope| {
        let session = scope.spawn(|| run_editor(&config, feed, &mut track, &mut out));
        thread::sleep(Duration::from_millis(100));
        drop(feeder);
        session.join().expect("session thread")
    })
    .expect("session");

    assert_eq!(report.outcome, SessionOutcome::Quit);
    assert_eq!(report.track_frames, 1);
    let written = String::from_utf8(track.into_inner()).expect("utf8");
    assert_eq!(written, "(20)(10)\n4 16\n");
}

#[test]
fn editor_refuses_a_header_whose_start_frame_leaves_the_track() {
    for header in [
        TrackHeader { width: 3, start_pos: 1 },
        TrackHeader { width: 40, start_pos: 39 },
        TrackHeader { width: 40, start_pos: 0 },
    ] {
        let mut track = TrackWriter::create(Vec::new(), header).expect("writer");
        let mut out = Vec::new();

        let result = run_editor(
            &fast(Variant::Editor),
            ScriptedKeys::from_chars("xQ"),
            &mut track,
            &mut out,
        );

        assert!(
            matches!(result, Err(SessionError::Track(TrackError::FrameRange { frame: 1, .. }))),
            "{header} gave {result:?}"
        );
        assert!(out.is_empty());
        assert_eq!(String::from_utf8(track.into_inner()).expect("utf8"), format!("{header}\n"));
    }
}
