//! Audio system using the Web Audio API
//!
//! Procedurally generated cues and loops - no external files needed.
//! Playback failures (gesture policy, missing context) are logged and
//! swallowed; nothing here ever surfaces an error to gameplay.

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

use crate::consts::*;

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Player hit an obstacle
    Collision,
    /// Jump started
    Jump,
}

/// A running looped track (oscillators play until stopped)
struct LoopHandle {
    oscillators: Vec<OscillatorNode>,
    gain: GainNode,
    /// Base volume before master scaling
    base_volume: f32,
}

impl LoopHandle {
    fn stop(self) {
        for osc in &self.oscillators {
            let _ = osc.stop();
        }
        let _ = self.gain.disconnect();
    }
}

/// Audio manager for the game
pub struct AudioManager {
    ctx: Option<AudioContext>,
    master_volume: f32,
    music_volume: f32,
    sfx_volume: f32,
    muted: bool,
    ambience: Option<LoopHandle>,
    running: Option<LoopHandle>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    pub fn new() -> Self {
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Failed to create AudioContext - audio disabled");
        }
        Self {
            ctx,
            master_volume: 1.0,
            music_volume: 1.0,
            sfx_volume: 1.0,
            muted: false,
            ambience: None,
            running: None,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
        self.apply_loop_volumes();
    }

    /// Set looping-track volume (0.0 - 1.0)
    pub fn set_music_volume(&mut self, vol: f32) {
        self.music_volume = vol.clamp(0.0, 1.0);
        self.apply_loop_volumes();
    }

    /// Set one-shot cue volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        self.apply_loop_volumes();
    }

    fn loop_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.music_volume
        }
    }

    fn cue_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    fn apply_loop_volumes(&self) {
        let scale = self.loop_volume();
        for handle in [&self.ambience, &self.running].into_iter().flatten() {
            handle.gain.gain().set_value(handle.base_volume * scale);
        }
    }

    /// First-gesture unlock: start both looping tracks.
    ///
    /// Returns true if any track that was not already playing got started,
    /// mirroring the one-shot unlock contract (the caller stops invoking
    /// this once it returns true).
    pub fn unlock(&mut self) -> bool {
        let Some(ctx) = self.ctx.clone() else {
            return false;
        };
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        let mut started = false;
        if self.ambience.is_none() {
            self.ambience = self.start_loop(
                &ctx,
                &[(110.0, OscillatorType::Sine), (110.7, OscillatorType::Sine)],
                AMBIENCE_VOLUME,
            );
            started |= self.ambience.is_some();
        }
        if self.running.is_none() {
            self.running = self.start_loop(
                &ctx,
                &[(55.0, OscillatorType::Sawtooth), (41.2, OscillatorType::Triangle)],
                RUNNING_VOLUME,
            );
            started |= self.running.is_some();
        }

        if started {
            log::info!("Audio unlocked");
        }
        started
    }

    /// Stop the running-loop track (game over); ambience keeps playing
    pub fn stop_running_loop(&mut self) {
        if let Some(handle) = self.running.take() {
            handle.stop();
        }
    }

    /// Play a one-shot cue
    pub fn play(&self, cue: SoundCue) {
        let vol = self.cue_volume();
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require a user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        match cue {
            SoundCue::Collision => self.play_collision(ctx, vol * COLLISION_VOLUME),
            SoundCue::Jump => self.play_jump(ctx, vol * JUMP_VOLUME),
        }
    }

    // === Sound generators ===

    /// Create an oscillator with gain envelope
    fn create_osc(
        &self,
        ctx: &AudioContext,
        freq: f32,
        osc_type: OscillatorType,
    ) -> Option<(OscillatorNode, GainNode)> {
        let osc = ctx.create_oscillator().ok()?;
        let gain = ctx.create_gain().ok()?;

        osc.set_type(osc_type);
        osc.frequency().set_value(freq);
        osc.connect_with_audio_node(&gain).ok()?;
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        Some((osc, gain))
    }

    /// Start a looping drone made of constantly running oscillators
    fn start_loop(
        &self,
        ctx: &AudioContext,
        voices: &[(f32, OscillatorType)],
        base_volume: f32,
    ) -> Option<LoopHandle> {
        let gain = ctx.create_gain().ok()?;
        gain.gain().set_value(base_volume * self.loop_volume());
        gain.connect_with_audio_node(&ctx.destination()).ok()?;

        let mut oscillators = Vec::with_capacity(voices.len());
        for &(freq, osc_type) in voices {
            let osc = ctx.create_oscillator().ok()?;
            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            if osc.start().is_err() {
                log::warn!("Loop oscillator start blocked");
                return None;
            }
            oscillators.push(osc);
        }

        Some(LoopHandle {
            oscillators,
            gain,
            base_volume,
        })
    }

    /// Collision - low crunching thump
    fn play_collision(&self, ctx: &AudioContext, vol: f32) {
        let t = ctx.current_time();

        if let Some((osc, gain)) = self.create_osc(ctx, 160.0, OscillatorType::Sawtooth) {
            gain.gain().set_value_at_time(vol * 0.5, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.25)
                .ok();
            osc.frequency().set_value_at_time(160.0, t).ok();
            osc.frequency()
                .exponential_ramp_to_value_at_time(40.0, t + 0.25)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.3).ok();
        }

        // Bass body under the crunch
        if let Some((osc, gain)) = self.create_osc(ctx, 60.0, OscillatorType::Sine) {
            gain.gain().set_value_at_time(vol * 0.4, t).ok();
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, t + 0.15)
                .ok();
            osc.start().ok();
            osc.stop_with_when(t + 0.2).ok();
        }
    }

    /// Jump - quick rising whoosh
    fn play_jump(&self, ctx: &AudioContext, vol: f32) {
        let Some((osc, gain)) = self.create_osc(ctx, 220.0, OscillatorType::Triangle) else {
            return;
        };
        let t = ctx.current_time();

        gain.gain().set_value_at_time(vol * 0.3, t).ok();
        gain.gain()
            .exponential_ramp_to_value_at_time(0.01, t + 0.18)
            .ok();
        osc.frequency().set_value_at_time(220.0, t).ok();
        osc.frequency()
            .exponential_ramp_to_value_at_time(660.0, t + 0.15)
            .ok();

        osc.start().ok();
        osc.stop_with_when(t + 0.2).ok();
    }
}
