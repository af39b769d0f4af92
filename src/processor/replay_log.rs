use std::ops::Range;

use smallvec::SmallVec;

use crate::{hit_objects::ObjectId, osu_input::OsuInput};

/// What a press ended up aimed at the first time it was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressTarget {
    Nothing,
    Object(ObjectId),
}

#[derive(Debug)]
struct Frame {
    input: OsuInput,
    /// One entry per new press, in handling order
    targets: SmallVec<[PressTarget; 2]>,
}

/// Every recorded input, sorted by timestamp.
/// Inputs are never thrown away so seeking back can replay them.
#[derive(Debug, Default)]
pub struct InputLog {
    frames: Vec<Frame>,
    /// First input which is not consumed yet
    cursor: usize,
}

impl InputLog {
    pub fn store_input(&mut self, input: OsuInput) {
        let index = self.frames.partition_point(|x| x.input.ts <= input.ts);

        if index < self.cursor {
            tracing::warn!("Storing input at {} which is already behind the processed ones", input.ts);
            self.cursor += 1;
        }

        self.frames.insert(index, Frame {
            input,
            targets: SmallVec::new(),
        });
    }

    pub fn last_input(&self) -> Option<&OsuInput> {
        self.frames.last().map(|x| &x.input)
    }

    pub fn input(&self, frame: usize) -> &OsuInput {
        &self.frames[frame].input
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames at or before `ts` which weren't consumed yet
    pub fn drain_until(&mut self, ts: f64) -> Range<usize> {
        let start = self.cursor;
        let end = start + self.frames[start..].partition_point(|x| x.input.ts <= ts);
        self.cursor = end;

        start..end
    }

    /// Inputs after `ts` will be consumed again
    pub fn rewind_to(&mut self, ts: f64) {
        self.cursor = self.cursor.min(self.frames.partition_point(|x| x.input.ts <= ts));
    }

    /// `None` if `press` of `frame` was never handled
    pub fn press_target(&self, frame: usize, press: usize) -> Option<PressTarget> {
        self.frames[frame].targets.get(press).copied()
    }

    pub fn record_press(&mut self, frame: usize, target: PressTarget) {
        self.frames[frame].targets.push(target);
    }
}
