//! Master bus settings.

use serde::{Deserialize, Serialize};

use crate::pattern::clamp_volume_db;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompressorSettings {
    pub threshold_db: f32,
    pub ratio: f32,
    /// Attack time in seconds.
    pub attack: f32,
    /// Release time in seconds.
    pub release: f32,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self { threshold_db: -24.0, ratio: 12.0, attack: 0.003, release: 0.25 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LimiterSettings {
    pub threshold_db: f32,
}

impl Default for LimiterSettings {
    fn default() -> Self {
        Self { threshold_db: -1.0 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterSettings {
    #[serde(default)]
    pub volume_db: f32,
    #[serde(default)]
    pub compressor: CompressorSettings,
    #[serde(default)]
    pub limiter: LimiterSettings,
}

/// One settable master bus field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MasterParam {
    VolumeDb(f32),
    CompressorThreshold(f32),
    CompressorRatio(f32),
    CompressorAttack(f32),
    CompressorRelease(f32),
    LimiterThreshold(f32),
}

impl MasterSettings {
    pub fn apply(&mut self, param: MasterParam) {
        match param {
            MasterParam::VolumeDb(db) => self.volume_db = clamp_volume_db(db),
            MasterParam::CompressorThreshold(db) => self.compressor.threshold_db = db.clamp(-100.0, 0.0),
            MasterParam::CompressorRatio(r) => self.compressor.ratio = r.clamp(1.0, 20.0),
            MasterParam::CompressorAttack(s) => self.compressor.attack = s.clamp(0.0, 1.0),
            MasterParam::CompressorRelease(s) => self.compressor.release = s.clamp(0.0, 1.0),
            MasterParam::LimiterThreshold(db) => self.limiter.threshold_db = db.clamp(-100.0, 0.0),
        }
    }
}
