use cgmath::Vector2;
use rosu::{
    config::Config,
    hit_objects::{hit_window::HitWindow, ArmedState, HitObject, ObjectId, ObjectKind},
    mods::{Mod, ModifierSet},
    processor::GameplayProcessor,
    timeline::transform::{Property, Target},
    timer::{GameClock, ManualClock},
};
use test_case::case;

const START_TIME: f64 = 1500.0;
const RADIUS: f64 = 32.0;

fn single_object(kind: ObjectKind) -> HitObject {
    HitObject::new(
        ObjectId(0),
        kind,
        START_TIME,
        Vector2::new(250.0, 250.0),
        HitWindow::from_od(5.0),
    )
}

/// Ticks until the object gets judged, returns the judgement tick
fn run_until_judged(processor: &mut GameplayProcessor, clock: &mut ManualClock) -> f64 {
    let tick = Config::default().gameplay.tick_ms;

    while !processor.objects()[0].is_judged() {
        assert!(clock.current_time() < START_TIME + 1000.0, "object never got judged");
        processor.update(clock.advance(tick));
    }

    clock.current_time()
}

fn opacity_at_miss(kind: ObjectKind, mods: ModifierSet) -> f32 {
    missed_opacity_of(single_object(kind), mods)
}

fn missed_opacity_of(object: HitObject, mods: ModifierSet) -> f32 {
    let mut processor = GameplayProcessor::new(vec![object], &mods, &Config::default(), RADIUS);
    let mut clock = ManualClock::new(0.0);

    let judged_at = run_until_judged(&mut processor, &mut clock);
    let object = &processor.objects()[0];

    assert_eq!(object.state(), ArmedState::Miss);
    assert!(judged_at >= object.late_bound());

    processor.driver().opacity(object.id, judged_at)
}

#[case(ObjectKind::Circle, vec![Mod::CLASSIC], 0.0; "transparent when missed")]
#[case(ObjectKind::Circle, vec![Mod::HIDDEN, Mod::CLASSIC], 0.0; "transparent when missed with hidden")]
#[case(
    ObjectKind::Circle,
    vec![Mod::Hidden { only_fade_approach_circles: true }, Mod::CLASSIC],
    0.0;
    "transparent when missed with approach only hidden"
)]
#[case(ObjectKind::Circle, vec![], 1.0; "opaque when missed")]
#[case(ObjectKind::SliderHead, vec![Mod::CLASSIC], 0.0; "slider head transparent when missed")]
#[case(ObjectKind::SliderHead, vec![], 1.0; "slider head opaque when missed")]
fn test_late_fade(kind: ObjectKind, mods: Vec<Mod>, expected: f32) {
    let mods = ModifierSet::new(mods).unwrap();
    assert_eq!(opacity_at_miss(kind, mods), expected);
}

#[test]
fn test_classic_without_early_fade_is_opaque() {
    let mods = ModifierSet::new([Mod::Classic { fade_hit_circle_early: false, note_lock: true }]).unwrap();
    assert_eq!(opacity_at_miss(ObjectKind::Circle, mods), 1.0);
}

#[case(vec![Mod::HIDDEN, Mod::CLASSIC]; "hidden first")]
#[case(vec![Mod::CLASSIC, Mod::HIDDEN]; "classic first")]
fn test_classic_cuts_hidden_fade_short(mods: Vec<Mod>) {
    // Long fade in pushes the hidden fade out past the miss
    let object = || single_object(ObjectKind::Circle).with_timing(1200.0, 1100.0);

    let hidden = missed_opacity_of(object(), ModifierSet::new([Mod::HIDDEN]).unwrap());
    assert!(hidden > 0.0, "hidden alone is still fading, got {hidden}");

    let mods = ModifierSet::new(mods).unwrap();
    assert_eq!(missed_opacity_of(object(), mods), 0.0);
}

#[test]
fn test_classic_hides_root_at_miss_under_hidden() {
    let mods = ModifierSet::new([Mod::HIDDEN, Mod::CLASSIC]).unwrap();
    let mut processor = GameplayProcessor::new(
        vec![single_object(ObjectKind::Circle)], &mods, &Config::default(), RADIUS
    );
    let mut clock = ManualClock::new(0.0);

    let judged_at = run_until_judged(&mut processor, &mut clock);
    let state = processor.driver().timeline(ObjectId(0)).unwrap().state();

    let root: Vec<_> = state
        .iter()
        .filter(|x| x.target == Target::Root && x.property == Property::Alpha)
        .collect();

    assert_eq!(root.len(), 1);
    assert_eq!((root[0].start_time, root[0].duration, root[0].to), (judged_at, 0.0, 0.0));
}

#[test]
fn test_default_miss_fades_out_afterwards() {
    let mut processor = GameplayProcessor::new(
        vec![single_object(ObjectKind::Circle)], &ModifierSet::none(), &Config::default(), RADIUS
    );
    let mut clock = ManualClock::new(0.0);

    let judged_at = run_until_judged(&mut processor, &mut clock);
    let driver = processor.driver();

    let fade = Config::default().timeline.state_fade_duration;

    assert!(driver.opacity(ObjectId(0), judged_at + 50.0) < 1.0);
    assert!(driver.opacity(ObjectId(0), judged_at + fade / 2.0) > 0.0);
    assert_eq!(driver.opacity(ObjectId(0), judged_at + fade), 0.0);
}

#[test]
fn test_approach_only_hidden_leaves_primary_element() {
    let mods = ModifierSet::new([Mod::Hidden { only_fade_approach_circles: true }]).unwrap();
    let mut processor = GameplayProcessor::new(
        vec![single_object(ObjectKind::Circle)], &mods, &Config::default(), RADIUS
    );
    let mut clock = ManualClock::new(0.0);

    let judged_at = run_until_judged(&mut processor, &mut clock);
    let driver = processor.driver();

    assert_eq!(driver.opacity(ObjectId(0), judged_at), 1.0);
    assert_eq!(driver.effective_opacity(ObjectId(0), Target::ApproachCircle, judged_at), 0.0);
}

#[case(vec![Mod::Autoplay]; "autoplay")]
#[case(vec![Mod::Autoplay, Mod::CLASSIC]; "autoplay with classic")]
#[case(vec![Mod::CLASSIC, Mod::Autoplay, Mod::Hidden { only_fade_approach_circles: true }]; "autoplay with classic and hidden")]
fn test_hit_has_no_late_fade(mods: Vec<Mod>) {
    let mods = ModifierSet::new(mods).unwrap();
    let mut processor = GameplayProcessor::new(
        vec![single_object(ObjectKind::Circle)], &mods, &Config::default(), RADIUS
    );
    let mut clock = ManualClock::new(0.0);

    let judged_at = run_until_judged(&mut processor, &mut clock);
    let object = &processor.objects()[0];

    assert_eq!(object.state(), ArmedState::Hit);
    assert!(judged_at >= START_TIME);

    let driver = processor.driver();
    let fade = Config::default().timeline.state_fade_duration;

    // Regular hit fade, nothing hidden instantly
    assert_eq!(driver.opacity(object.id, judged_at), 1.0);
    assert!(driver.opacity(object.id, judged_at + fade / 2.0) > 0.0);
    assert_eq!(driver.sample(object.id, Target::Root, Property::Scale, judged_at + fade), Some(1.4));

    let state = driver.timeline(object.id).unwrap().state();
    assert!(state.iter().all(|x| x.start_time >= judged_at));
    assert!(!state.iter().any(|x| x.target == Target::Root && x.duration == 0.0));
}
