use rosu::{
    beatmap::{BeatmapError, LoadedBeatmap},
    config::Config,
    hit_objects::{ArmedState, ObjectId, ObjectKind},
    mods::ModifierSet,
    processor::GameplayProcessor,
};

const BEATMAP: &str = "osu file format v14

[General]
Mode: 0

[Difficulty]
HPDrainRate:5
CircleSize:4
OverallDifficulty:8
ApproachRate:9
SliderMultiplier:1.4
SliderTickRate:1

[TimingPoints]
0,500,4,2,0,100,1,0

[HitObjects]
256,192,1000,1,0,0:0:0:0:
100,100,1500,2,0,B|200:100,1,100
256,192,2000,12,0,2500,0:0:0:0:
300,300,3000,1,0,0:0:0:0:
";

const SPINNER_ONLY: &str = "osu file format v14

[Difficulty]
OverallDifficulty:5

[HitObjects]
256,192,2000,12,0,2500,0:0:0:0:
";

#[test]
fn test_load_objects() {
    let beatmap = LoadedBeatmap::from_bytes(BEATMAP.as_bytes()).unwrap();
    let objects = &beatmap.objects;

    assert_eq!(objects.len(), 3);
    assert_eq!(objects[0].kind, ObjectKind::Circle);
    assert_eq!(objects[1].kind, ObjectKind::SliderHead);
    assert_eq!(objects[2].id, ObjectId(2));

    assert_eq!(objects[1].start_time, 1500.0);
    assert_eq!((objects[1].pos.x, objects[1].pos.y), (100.0, 100.0));

    // Spinner breaks the combo
    assert_eq!((objects[0].combo_index, objects[0].index_in_combo), (0, 0));
    assert_eq!((objects[1].combo_index, objects[1].index_in_combo), (0, 1));
    assert_eq!((objects[2].combo_index, objects[2].index_in_combo), (1, 0));

    assert_eq!(objects[0].preempt, 600.0);
    assert_eq!(objects[0].fade_in, 400.0);
    assert_eq!(objects[0].late_bound(), 1120.0);
}

#[test]
fn test_spinners_only() {
    assert!(matches!(
        LoadedBeatmap::from_bytes(SPINNER_ONLY.as_bytes()),
        Err(BeatmapError::Empty)
    ));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        LoadedBeatmap::from_path("does/not/exist.osu"),
        Err(BeatmapError::Io(_))
    ));
}

#[test]
fn test_play_loaded_beatmap() {
    let beatmap = LoadedBeatmap::from_bytes(BEATMAP.as_bytes()).unwrap();
    let mods = ModifierSet::parse("AT").unwrap();
    let mut processor = GameplayProcessor::from_beatmap(beatmap, &mods, &Config::default());

    let mut time = 0.0;
    while time < 4000.0 {
        time += 10.0;
        processor.update(time);
    }

    assert!(processor.objects().iter().all(|x| x.state() == ArmedState::Hit));
}
