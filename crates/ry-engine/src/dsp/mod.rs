//! Signal processing building blocks.

pub mod dynamics;
pub mod effects;
pub mod envelope;
pub mod filter;
pub mod meter;
pub mod oscillator;

/// Lowest level reported in dB before falling to silence.
pub const MIN_DB: f32 = -120.0;

/// Fader gain: levels at or below the fader floor are silent.
pub fn fader_gain(db: f32) -> f32 {
    if db.is_nan() || db <= ry_ir::MIN_VOLUME_DB {
        0.0
    } else {
        db_to_gain(db)
    }
}

/// Convert decibels to linear gain. `-inf` maps to 0.
pub fn db_to_gain(db: f32) -> f32 {
    if db == f32::NEG_INFINITY {
        0.0
    } else {
        10f32.powf(db / 20.0)
    }
}

/// Convert linear gain to decibels. Zero maps to `-inf`.
pub fn gain_to_db(gain: f32) -> f32 {
    if gain <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * gain.log10()
    }
}

/// One-pole smoothing coefficient reaching ~63% in `seconds`.
pub fn time_coeff(seconds: f32, sample_rate: f32) -> f32 {
    if seconds <= 0.0 {
        0.0
    } else {
        (-1.0 / (seconds * sample_rate)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_conversions() {
        assert!((db_to_gain(-6.0206) - 0.5).abs() < 1e-4);
        assert_eq!(db_to_gain(f32::NEG_INFINITY), 0.0);
        assert_eq!(gain_to_db(0.0), f32::NEG_INFINITY);
        assert!((gain_to_db(1.0)).abs() < 1e-6);
    }

    #[test]
    fn fader_floor_is_silent() {
        assert_eq!(fader_gain(ry_ir::MIN_VOLUME_DB), 0.0);
        assert_eq!(fader_gain(f32::NEG_INFINITY), 0.0);
        assert!((fader_gain(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_time_is_instant() {
        assert_eq!(time_coeff(0.0, 44100.0), 0.0);
        assert!(time_coeff(0.01, 44100.0) > 0.99);
    }
}
