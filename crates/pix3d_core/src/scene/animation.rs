//! Animation clip playback for game objects
//!
//! The core does not sample keyframes; it only tracks which clip is playing and
//! where its playhead is so the editor can preview, scrub and serialize it.

/// A named clip found in a model container
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Clip name as authored
    pub name: String,
    /// Length in seconds
    pub duration: f32,
}

impl AnimationClip {
    /// Create a clip
    pub fn new(name: impl Into<String>, duration: f32) -> Self {
        Self {
            name: name.into(),
            duration,
        }
    }
}

/// What happens when the playhead reaches the end of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopMode {
    /// Wrap around to the start
    #[default]
    Repeat,
    /// Hold the last frame and report the clip as finished
    Once,
}

/// Playback state over the clips of one model
#[derive(Debug, Clone, Default)]
pub struct Animator {
    clips: Vec<AnimationClip>,
    current: Option<usize>,
    time: f32,
    playing: bool,
    loop_mode: LoopMode,
}

impl Animator {
    /// Create an animator over a clip list
    pub fn new(clips: Vec<AnimationClip>) -> Self {
        Self {
            clips,
            ..Default::default()
        }
    }

    /// All clips available to this animator
    pub fn clips(&self) -> &[AnimationClip] {
        &self.clips
    }

    /// Whether a clip with this name exists (case-insensitive)
    pub fn has_clip(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Duration of a named clip
    pub fn duration_of(&self, name: &str) -> Option<f32> {
        self.index_of(name).map(|index| self.clips[index].duration)
    }

    /// Start a clip from the beginning. Returns false if no clip matches.
    pub fn play(&mut self, name: &str, mode: LoopMode) -> bool {
        match self.index_of(name) {
            Some(index) => {
                self.current = Some(index);
                self.time = 0.0;
                self.playing = true;
                self.loop_mode = mode;
                true
            }
            None => {
                log::warn!("Animation clip '{}' not found among {:?}", name, self.clip_names());
                false
            }
        }
    }

    /// Freeze the playhead on the current clip
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Continue a paused clip
    pub fn resume(&mut self) {
        if self.current.is_some() {
            self.playing = true;
        }
    }

    /// Drop the current clip entirely
    pub fn stop(&mut self) {
        self.current = None;
        self.time = 0.0;
        self.playing = false;
    }

    /// Move the playhead, clamped to the current clip
    pub fn set_time(&mut self, time: f32) {
        if let Some(clip) = self.current_clip() {
            self.time = time.clamp(0.0, clip.duration);
        }
    }

    /// Playhead position in seconds
    pub fn current_time(&self) -> f32 {
        self.time
    }

    /// The clip selected for playback, if any
    pub fn current_clip(&self) -> Option<&AnimationClip> {
        self.current.map(|index| &self.clips[index])
    }

    /// Whether the playhead is advancing
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Loop mode of the current clip
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Advance the playhead. Returns the clip name when a `Once` clip finishes this step.
    pub fn update(&mut self, dt: f32) -> Option<String> {
        if !self.playing {
            return None;
        }
        let clip = self.current_clip()?;
        let duration = clip.duration;
        let name = clip.name.clone();

        self.time += dt;
        if self.time < duration {
            return None;
        }
        match self.loop_mode {
            LoopMode::Repeat => {
                self.time = if duration > 0.0 { self.time % duration } else { 0.0 };
                None
            }
            LoopMode::Once => {
                self.time = duration;
                self.playing = false;
                Some(name)
            }
        }
    }

    fn clip_names(&self) -> Vec<&str> {
        self.clips.iter().map(|clip| clip.name.as_str()).collect()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.clips
            .iter()
            .position(|clip| clip.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn animator() -> Animator {
        Animator::new(vec![
            AnimationClip::new("Idle", 2.0),
            AnimationClip::new("Death", 1.0),
        ])
    }

    #[test]
    fn test_play_is_case_insensitive() {
        let mut animator = animator();
        assert!(animator.play("idle", LoopMode::Repeat));
        assert_eq!(animator.current_clip().unwrap().name, "Idle");
        assert!(!animator.play("Run", LoopMode::Repeat));
        assert_eq!(animator.current_clip().unwrap().name, "Idle");
    }

    #[test]
    fn test_repeat_wraps() {
        let mut animator = animator();
        animator.play("Idle", LoopMode::Repeat);
        assert!(animator.update(2.5).is_none());
        assert_relative_eq!(animator.current_time(), 0.5, epsilon = 1e-6);
        assert!(animator.is_playing());
    }

    #[test]
    fn test_once_reports_finish_a_single_time() {
        let mut animator = animator();
        animator.play("Death", LoopMode::Once);
        assert!(animator.update(0.6).is_none());
        assert_eq!(animator.update(0.6).as_deref(), Some("Death"));
        assert!(animator.update(0.6).is_none());
        assert_relative_eq!(animator.current_time(), 1.0);
    }

    #[test]
    fn test_pause_and_scrub() {
        let mut animator = animator();
        animator.play("Idle", LoopMode::Repeat);
        animator.pause();
        animator.update(1.0);
        assert_relative_eq!(animator.current_time(), 0.0);

        animator.set_time(5.0);
        assert_relative_eq!(animator.current_time(), 2.0);
        animator.resume();
        assert!(animator.is_playing());
    }
}
