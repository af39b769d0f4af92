use std::time::Instant;

/// Source of gameplay time in milliseconds.
///
/// Time only ever moves through [`GameClock::seek`] or by itself,
/// consumers must compare against the current value instead
/// of accumulating deltas between frames.
pub trait GameClock {
    fn current_time(&self) -> f64;

    /// Jumps to `time`, can go backwards (editor, replays)
    fn seek(&mut self, time: f64);
}

/// Real time clock
pub struct Timer {
    now: Instant,
    last_time: f64, // Milliseconds
    paused: bool,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            now: Instant::now(),
            last_time: 0.0,
            paused: true,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.update();
        self.paused = true;
    }

    pub fn unpause(&mut self) {
        self.paused = false;

        self.now = Instant::now();
    }

    /// Updates and returns current time
    pub fn update(&mut self) -> f64 {
        if self.paused {
            return self.last_time
        };

        let now = Instant::now();

        let diff = now.duration_since(self.now);

        self.last_time += diff.as_secs_f64() * 1000.0;

        self.now = now;

        self.last_time
    }
}

impl GameClock for Timer {
    fn current_time(&self) -> f64 {
        self.last_time
    }

    fn seek(&mut self, time: f64) {
        self.last_time = time.max(0.0);
        self.now = Instant::now();
    }
}

/// Clock that only moves when told to
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    time: f64,
}

impl ManualClock {
    pub fn new(time: f64) -> Self {
        Self { time: time.max(0.0) }
    }

    pub fn advance(&mut self, ms: f64) -> f64 {
        self.time += ms;
        self.time
    }
}

impl GameClock for ManualClock {
    fn current_time(&self) -> f64 {
        self.time
    }

    fn seek(&mut self, time: f64) {
        self.time = time.max(0.0);
    }
}

#[test]
fn test_timer_logic() {
    use std::time::Duration;

    let mut clock = Timer::new();

    std::thread::sleep(Duration::from_millis(15));

    assert!(clock.update() == 0.0);

    clock.unpause();

    std::thread::sleep(Duration::from_millis(15));

    let expected = clock.update();

    assert!(expected >= 15.0);

    clock.pause();

    let paused_at = clock.current_time();
    assert!(clock.update() == paused_at);

    clock.seek(3.0);
    assert_eq!(clock.update(), 3.0);
}

#[test]
fn test_manual_clock_seek() {
    let mut clock = ManualClock::new(100.0);

    assert_eq!(clock.advance(16.0), 116.0);

    clock.seek(-50.0);
    assert_eq!(clock.current_time(), 0.0);
}
