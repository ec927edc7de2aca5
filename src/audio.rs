//! Cheer cue using Web Audio API
//!
//! Procedurally generated - no external files needed!

use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

/// Near-silent gain; exponential ramps cannot start from or reach zero
const SILENT: f32 = 0.0001;

/// Plays the celebration chirp
pub struct CheerPlayer {
    ctx: Option<AudioContext>,
    volume: f32,
}

impl CheerPlayer {
    pub fn new(volume: f32) -> Self {
        // Try to create audio context (may fail if not in secure context)
        let ctx = AudioContext::new().ok();
        if ctx.is_none() {
            log::warn!("Audio unavailable - cheer disabled");
        }
        Self {
            ctx,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    /// Rising sine chirp, 880 Hz to 1320 Hz
    pub fn play_cheer(&self) {
        let vol = self.volume;
        if vol <= 0.0 {
            return;
        }

        let Some(ctx) = &self.ctx else { return };

        // Resume context if suspended (browsers require user gesture)
        if ctx.state() == web_sys::AudioContextState::Suspended {
            let _ = ctx.resume();
        }

        if self.chirp(ctx, vol).is_none() {
            log::warn!("Cheer could not be scheduled");
        }
    }

    fn chirp(&self, ctx: &AudioContext, vol: f32) -> Option<()> {
        let (osc, gain) = self.create_osc(ctx, 880.0, OscillatorType::Sine)?;
        let t = ctx.current_time();

        gain.gain().set_value_at_time(SILENT, t).ok()?;
        gain.gain()
            .exponential_ramp_to_value_at_time((0.06 * vol).max(SILENT), t + 0.02)
            .ok()?;
        osc.frequency()
            .exponential_ramp_to_value_at_time(1320.0, t + 0.15)
            .ok()?;
        gain.gain()
            .exponential_ramp_to_value_at_time(SILENT, t + 0.7)
            .ok()?;

        osc.start().ok()?;
        osc.stop_with_when(t + 0.8).ok()
    }

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
}
