use stimrig_core::{
    Experiment, ListKind, ListOfValues, ListValue, MediaKind, Method, ObjectSpec, ResponseConfig,
    ResponseKind, SceneDuration, Target, UnitSpec, Variable, WindowField,
};
use stimrig_engine::{
    MediaSink, PointerPhase, PointerSample, Session, TrialStatus,
};
use stimrig_core::AssetTable;

#[derive(Default)]
struct RecordingSink {
    events: Vec<(String, usize)>,
    tone_stops: usize,
}

impl MediaSink for RecordingSink {
    fn start_audio(&mut self, object: usize) {
        self.events.push(("start_audio".into(), object));
    }
    fn end_audio(&mut self, object: usize) {
        self.events.push(("end_audio".into(), object));
    }
    fn start_tone(&mut self, object: usize) {
        self.events.push(("start_tone".into(), object));
    }
    fn end_tone(&mut self, object: usize) {
        self.events.push(("end_tone".into(), object));
    }
    fn stop_tone(&mut self) {
        self.tone_stops += 1;
    }
}

fn staircase_experiment() -> Experiment {
    let audio_list = ListOfValues {
        id: "sounds".into(),
        name: "sounds".into(),
        kind: ListKind::Audios,
        dimensions: 1,
        values: vec![ListValue::asset("beep")],
    };
    Experiment {
        name: "staircase".into(),
        frame_rate: 60.0,
        trials: 3,
        duration: SceneDuration::StimuliEnd,
        screen: (300.0, 300.0),
        objects: vec![ObjectSpec {
            name: "target".into(),
            duration_secs: 2.0,
            ..ObjectSpec::default()
        }],
        variables: vec![
            Variable::new(
                "level",
                "level",
                Target::Duration { object: 0 },
            )
            .with_list("levels")
            .with_method(Method::One, 1)
            .with_unit(UnitSpec::SECONDS),
            Variable::new(
                "audio-on",
                "audio on",
                Target::MediaWindow {
                    object: 0,
                    kind: MediaKind::Audio,
                    field: WindowField::Activated,
                },
            )
            .with_list("on"),
            Variable::new(
                "audio-len",
                "audio duration",
                Target::MediaWindow {
                    object: 0,
                    kind: MediaKind::Audio,
                    field: WindowField::Duration,
                },
            )
            .with_list("half-second")
            .with_unit(UnitSpec::SECONDS),
            Variable::new(
                "audio-src",
                "audio source",
                Target::MediaReference {
                    object: 0,
                    kind: MediaKind::Audio,
                },
            )
            .with_list("first"),
        ],
        lists: vec![
            ListOfValues::numbers("levels", "levels", &[0.5, 1.0, 2.0, 4.0]),
            ListOfValues::numbers("on", "on", &[1.0]),
            ListOfValues::numbers("half-second", "half second", &[0.5]),
            ListOfValues::numbers("first", "first", &[1.0]),
            audio_list,
        ],
        response: ResponseConfig::of_kind(ResponseKind::LeftRight),
        randomness_scopes: vec!["levels".into()],
    }
}

#[test]
fn staircase_session_fires_checkpoints_in_order() {
    let assets = AssetTable {
        audios: vec!["beep".into()],
        ..AssetTable::default()
    };
    let mut session = Session::new(staircase_experiment(), assets).unwrap();
    let mut sink = RecordingSink::default();

    session.begin_trial(0, None);

    // initial index 1 -> duration 1.0 s -> 60 frames
    assert_eq!(session.table.duration_frames[0][0], 60);
    assert_eq!(session.table.audio[0][0].asset, Some(0));
    assert!(session.table.audio[0][0].activated);
    assert_eq!(session.table.audio[0][0].end, 30);

    let mut finished_at = None;
    for frame in 0..=120 {
        if session.tick(frame, &mut sink) == TrialStatus::Finished {
            finished_at = Some(frame);
            break;
        }
    }
    // the stimulus object runs to frame 60 and bounds the trial
    assert_eq!(finished_at, Some(60));
    assert_eq!(
        sink.events,
        vec![("start_audio".into(), 0), ("end_audio".into(), 0)]
    );
}

#[test]
fn staircase_steps_up_after_an_up_outcome() {
    let mut session = Session::new(staircase_experiment(), AssetTable::default()).unwrap();
    let mut sink = RecordingSink::default();

    session.begin_trial(0, None);
    session.tick(0, &mut sink);
    let record0 = session.finish_trial();
    let index0 = record0.indices[0];

    session.begin_trial(1, Some(0));
    let record1_index = session.records()[0].indices[0];
    assert_eq!(record1_index, index0);

    session.finish_trial();
    assert_eq!(session.records()[1].indices[0], index0 + 1);
    // duration followed the staircase: 2.0 s at index 2
    assert_eq!(session.table.duration_frames[1][0], 120);
}

#[test]
fn accepted_response_ends_the_trial_and_stops_tone() {
    let mut session = Session::new(staircase_experiment(), AssetTable::default()).unwrap();
    let mut sink = RecordingSink::default();

    session.begin_trial(0, None);
    assert_eq!(session.tick(0, &mut sink), TrialStatus::Running);

    // a touch on the left third of the 300-wide screen
    let accepted = session.handle_pointer(
        PointerSample {
            phase: PointerPhase::Down,
            x: 50.0,
            y: 150.0,
            clock: 0.25,
        },
        1,
        &mut sink,
    );
    assert!(accepted);
    assert_eq!(sink.tone_stops, 1);
    assert_eq!(session.tick(1, &mut sink), TrialStatus::Finished);

    let record = session.finish_trial();
    assert_eq!(record.response.integer, Some(0));
    assert_eq!(record.reaction_clock, Some(0.25));
}

#[test]
fn middle_third_touch_keeps_the_trial_running() {
    let mut session = Session::new(staircase_experiment(), AssetTable::default()).unwrap();
    let mut sink = RecordingSink::default();

    session.begin_trial(0, None);
    let accepted = session.handle_pointer(
        PointerSample {
            phase: PointerPhase::Down,
            x: 150.0,
            y: 150.0,
            clock: 0.25,
        },
        1,
        &mut sink,
    );
    assert!(!accepted);
    assert_eq!(session.tick(1, &mut sink), TrialStatus::Running);
}

#[test]
fn seeds_are_drawn_per_scope_and_reported() {
    let mut session = Session::new(staircase_experiment(), AssetTable::default()).unwrap();
    let mut rng = rand::rng();
    session.generate_seeds(&mut rng);
    assert_eq!(session.seeds.len(), 1);
    assert_eq!(session.seeds[0].id, "levels");
    assert!(session.seeds[0].value <= 1_000_000);
}

#[test]
fn records_serialize_for_the_result_writer() {
    let mut session = Session::new(staircase_experiment(), AssetTable::default()).unwrap();
    let mut sink = RecordingSink::default();
    session.begin_trial(0, None);
    session.tick(0, &mut sink);
    session.finish_trial();

    let json = session.records_json().unwrap();
    assert!(json.contains("\"trial\":0"));
    assert!(json.contains("\"indices\""));
}

#[test]
fn long_frames_land_in_the_report() {
    let mut session = Session::new(staircase_experiment(), AssetTable::default()).unwrap();
    let mut sink = RecordingSink::default();
    session.begin_trial(0, None);
    session.tick(0, &mut sink);

    session.note_frame(0, std::time::Duration::from_millis(16));
    session.note_frame(1, std::time::Duration::from_millis(40));

    assert_eq!(session.clock.total_frames(), 2);
    assert_eq!(session.clock.long_frames().len(), 1);
    assert_eq!(session.clock.long_frames()[0].frame, 1);
}

#[test]
fn config_error_stops_the_run() {
    let mut exp = staircase_experiment();
    exp.variables[0].list_id = None;
    let err = Session::new(exp, AssetTable::default()).unwrap_err();
    assert!(err.to_string().contains("no list of values"));
}
