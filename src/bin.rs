use std::{cell::RefCell, path::PathBuf, process::ExitCode, rc::Rc};

use rosu::{
    beatmap::{BeatmapError, LoadedBeatmap},
    broadcast::{shared, JudgementCounter},
    circle_piece::PrefixCache,
    config::Config,
    hit_objects::HitObject,
    judgement::JudgementResult,
    mods::{ModParseError, ModifierSet},
    osu_input::KeyboardState,
    processor::GameplayProcessor,
    skin_manager::{SkinManager, SkinSource, StaticSkin},
    timeline::transform::Target,
    timer::{GameClock, ManualClock},
};
use thiserror::Error;

#[derive(Error, Debug)]
enum CliError {
    #[error("usage: rosu-judge <beatmap.osu> [mods] [skin dir] [--tap <offset ms>] [-v]")]
    Usage,
    #[error("invalid tap offset `{0}`")]
    TapOffset(String),
    #[error(transparent)]
    Beatmap(#[from] BeatmapError),
    #[error(transparent)]
    Mods(#[from] ModParseError),
}

struct Args {
    beatmap: PathBuf,
    mods: ModifierSet,
    skin: Option<PathBuf>,
    /// Presses every object at `start_time + offset`
    tap: Option<f64>,
    verbose: bool,
}

impl Args {
    fn parse(args: impl Iterator<Item = String>) -> Result<Self, CliError> {
        let mut positional = Vec::new();
        let mut tap = None;
        let mut verbose = false;

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-v" | "--verbose" => verbose = true,
                "--tap" => {
                    let value = args.next().ok_or(CliError::Usage)?;
                    tap = Some(value.parse().map_err(|_| CliError::TapOffset(value))?);
                },
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        let beatmap = positional.next().map(PathBuf::from).ok_or(CliError::Usage)?;

        let mods = match positional.next() {
            Some(mods) => ModifierSet::parse(&mods)?,
            None => ModifierSet::none(),
        };

        Ok(Self {
            beatmap,
            mods,
            skin: positional.next().map(PathBuf::from),
            tap,
            verbose,
        })
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = Config::default();
    let beatmap = LoadedBeatmap::from_path(&args.beatmap)?;

    let taps: Vec<_> = match args.tap {
        Some(offset) => beatmap.objects
            .iter()
            .map(|x| (x.start_time + offset, x.pos))
            .collect(),
        None => Vec::new(),
    };

    let end_time = beatmap.objects
        .last()
        .map(|x| x.late_bound())
        .unwrap_or_default() + config.timeline.state_fade_duration;

    let mut processor = GameplayProcessor::from_beatmap(beatmap, &args.mods, &config);

    let skin: Box<dyn SkinSource> = match &args.skin {
        Some(path) => Box::new(SkinManager::from_path(path, None)),
        None => Box::new(StaticSkin::builtin()),
    };

    let mut cache = PrefixCache::new();
    processor.attach_circle_pieces(skin.as_ref(), &mut cache);

    for (ts, pos) in taps {
        processor.store_cursor_moved(ts, pos);
        processor.store_keyboard_pressed(ts, KeyboardState::k1());
        processor.store_keyboard_released(ts + 50.0, KeyboardState::k1());
    }

    let counter = Rc::new(RefCell::new(JudgementCounter::default()));
    processor.broadcast_mut().subscribe(shared(&counter));

    let results: Rc<RefCell<Vec<JudgementResult>>> = Rc::default();
    let log = results.clone();
    processor.broadcast_mut().subscribe(move |_: &HitObject, result: &JudgementResult| {
        log.borrow_mut().push(*result);
    });

    let mut clock = ManualClock::new(0.0);

    while clock.current_time() <= end_time {
        let time = clock.advance(config.gameplay.tick_ms);
        processor.update(time);

        for result in results.borrow_mut().drain(..) {
            let id = result.object_id;
            let driver = processor.driver();

            tracing::info!(
                "[{time:.0}] {id:?} {:?} {:+.0}ms opacity {:.2} approach {:.2}",
                result.hit,
                result.time_offset,
                driver.opacity(id, time),
                driver.effective_opacity(id, Target::ApproachCircle, time),
            );
        }
    }

    let counter = counter.borrow();
    println!(
        "{} | 300: {} 100: {} 50: {} miss: {} ({} total)",
        args.mods, counter.x300, counter.x100, counter.x50, counter.xmiss, counter.total()
    );

    Ok(())
}

fn main() -> ExitCode {
    let _client = tracy_client::Client::start();

    let args = match Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        },
    };

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO })
        .with_target(false)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        },
    }
}
