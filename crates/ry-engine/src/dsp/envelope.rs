//! ADSR envelope generator.

use ry_ir::Adsr;

/// Level below which a releasing envelope snaps to silence.
const SILENCE: f32 = 1e-4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Linear attack, exponential decay and release.
#[derive(Clone, Debug)]
pub struct Envelope {
    adsr: Adsr,
    sample_rate: f32,
    stage: Stage,
    value: f32,
    /// Samples spent in the current stage.
    elapsed: u32,
    attack_start: f32,
    decay_coeff: f32,
    release_coeff: f32,
}

impl Envelope {
    pub fn new(adsr: Adsr, sample_rate: f32) -> Self {
        let mut env = Self {
            adsr,
            sample_rate,
            stage: Stage::Idle,
            value: 0.0,
            elapsed: 0,
            attack_start: 0.0,
            decay_coeff: 0.0,
            release_coeff: 0.0,
        };
        env.set_adsr(adsr);
        env
    }

    pub fn set_adsr(&mut self, adsr: Adsr) {
        self.adsr = adsr.clamped();
        // Decay and release fall 60 dB over their stage time.
        self.decay_coeff = stage_coeff(self.adsr.decay, self.sample_rate);
        self.release_coeff = stage_coeff(self.adsr.release, self.sample_rate);
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_idle(&self) -> bool {
        self.stage == Stage::Idle
    }

    /// Start the attack from the current level.
    pub fn gate_on(&mut self) {
        self.stage = Stage::Attack;
        self.elapsed = 0;
        self.attack_start = self.value;
    }

    pub fn gate_off(&mut self) {
        if self.stage != Stage::Idle {
            self.stage = Stage::Release;
            self.elapsed = 0;
        }
    }

    /// Drop to silence immediately.
    pub fn reset(&mut self) {
        self.stage = Stage::Idle;
        self.value = 0.0;
        self.elapsed = 0;
    }

    /// Advance one sample and return the new level.
    pub fn next_value(&mut self) -> f32 {
        match self.stage {
            Stage::Idle => {}
            Stage::Attack => {
                let samples = (self.adsr.attack * self.sample_rate).max(1.0);
                self.elapsed += 1;
                let t = (self.elapsed as f32 / samples).min(1.0);
                self.value = self.attack_start + (1.0 - self.attack_start) * t;
                if t >= 1.0 {
                    self.stage = Stage::Decay;
                    self.elapsed = 0;
                }
            }
            Stage::Decay => {
                let sustain = self.adsr.sustain;
                self.value = sustain + (self.value - sustain) * self.decay_coeff;
                self.elapsed += 1;
                if self.elapsed as f32 >= self.adsr.decay * self.sample_rate {
                    self.value = sustain;
                    self.stage = Stage::Sustain;
                }
            }
            Stage::Sustain => self.value = self.adsr.sustain,
            Stage::Release => {
                self.value *= self.release_coeff;
                if self.value < SILENCE {
                    self.reset();
                }
            }
        }
        self.value
    }
}

fn stage_coeff(seconds: f32, sample_rate: f32) -> f32 {
    let samples = seconds * sample_rate;
    if samples < 1.0 {
        0.0
    } else {
        (0.001f32.ln() / samples).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 1000.0;

    fn run(env: &mut Envelope, samples: usize) -> f32 {
        let mut v = 0.0;
        for _ in 0..samples {
            v = env.next_value();
        }
        v
    }

    #[test]
    fn attack_reaches_peak() {
        let mut env = Envelope::new(Adsr::new(0.01, 0.1, 0.5, 0.1), SR);
        env.gate_on();
        assert_eq!(run(&mut env, 10), 1.0);
        assert_eq!(env.stage(), Stage::Decay);
    }

    #[test]
    fn decay_settles_on_sustain() {
        let mut env = Envelope::new(Adsr::new(0.001, 0.05, 0.5, 0.1), SR);
        env.gate_on();
        assert_eq!(run(&mut env, 100), 0.5);
        assert_eq!(env.stage(), Stage::Sustain);
    }

    #[test]
    fn release_ends_idle_at_zero() {
        let mut env = Envelope::new(Adsr::new(0.001, 0.01, 0.8, 0.05), SR);
        env.gate_on();
        run(&mut env, 50);
        env.gate_off();
        run(&mut env, 100);
        assert!(env.is_idle());
        assert_eq!(env.value(), 0.0);
    }

    #[test]
    fn retrigger_starts_from_current_level() {
        let mut env = Envelope::new(Adsr::new(0.1, 0.01, 0.5, 0.5), SR);
        env.gate_on();
        run(&mut env, 200);
        env.gate_off();
        let level = run(&mut env, 10);
        env.gate_on();
        let next = env.next_value();
        assert!(next >= level);
    }

    #[test]
    fn gate_off_while_idle_stays_idle() {
        let mut env = Envelope::new(Adsr::default(), SR);
        env.gate_off();
        assert!(env.is_idle());
        assert_eq!(env.next_value(), 0.0);
    }
}
