//! Frame-based animation player for spritesheet entities.

use std::time::Duration;

/// Named sequence of spritesheet frames played at a fixed rate.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct AnimationClip {
    name: &'static str,
    frames: &'static [u8],
    frame_duration: Duration,
    yoyo: bool,
}

/// Player walk cycle, looping forever.
pub(crate) const WALKING: AnimationClip = AnimationClip {
    name: "walking",
    frames: &[0, 1, 2],
    frame_duration: Duration::from_nanos(1_000_000_000 / 12),
    yoyo: true,
};

/// Fire flicker, looping forever.
pub(crate) const BURNING: AnimationClip = AnimationClip {
    name: "burning",
    frames: &[0, 1],
    frame_duration: Duration::from_millis(250),
    yoyo: false,
};

impl AnimationClip {
    fn cycle_len(&self) -> usize {
        if self.yoyo && self.frames.len() > 1 {
            self.frames.len() * 2 - 2
        } else {
            self.frames.len()
        }
    }

    fn frame_at(&self, step: usize) -> u8 {
        let cycle = self.cycle_len();
        if cycle == 0 {
            return 0;
        }
        let index = step % cycle;
        if index < self.frames.len() {
            self.frames[index]
        } else {
            self.frames[cycle - index]
        }
    }
}

/// Plays at most one clip and remembers the frame on display.
#[derive(Clone, Debug)]
pub(crate) struct Animator {
    current: Option<&'static AnimationClip>,
    elapsed: Duration,
    frame: u8,
}

impl Animator {
    pub(crate) fn showing(frame: u8) -> Self {
        Self {
            current: None,
            elapsed: Duration::ZERO,
            frame,
        }
    }

    /// Restarts `clip` from its first frame.
    pub(crate) fn play(&mut self, clip: &'static AnimationClip) {
        log::trace!("playing animation {}", clip.name);
        self.current = Some(clip);
        self.elapsed = Duration::ZERO;
        self.frame = clip.frame_at(0);
    }

    /// Stops `clip` if it is the one playing. The current frame stays on display.
    pub(crate) fn stop(&mut self, clip: &AnimationClip) {
        if self.is_playing(clip) {
            self.current = None;
        }
    }

    pub(crate) fn is_playing(&self, clip: &AnimationClip) -> bool {
        self.current.is_some_and(|current| current == clip)
    }

    pub(crate) fn set_frame(&mut self, frame: u8) {
        self.frame = frame;
    }

    pub(crate) fn frame(&self) -> u8 {
        self.frame
    }

    pub(crate) fn advance(&mut self, dt: Duration) {
        let Some(clip) = self.current else {
            return;
        };
        self.elapsed = self.elapsed.saturating_add(dt);
        let step = self.elapsed.as_nanos() / clip.frame_duration.as_nanos().max(1);
        self.frame = clip.frame_at(usize::try_from(step).unwrap_or(usize::MAX));
    }
}
