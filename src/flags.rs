//! Bit-packed flag bytes of the system section.
//!
//! Callers only get named accessors; every setter is a masked update, so bits
//! it does not own (including reserved ones) survive untouched.
use bitfield::bitfield;
use serde::{Deserialize, Serialize};

use crate::types::Orientation;

bitfield! {
    /// `config_flags`: orientation code and radio/service enables.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ConfigFlags(u8);
    impl Debug;
    u8;
    orientation_code, set_orientation_code: 1, 0;
    pub wifi, set_wifi: 2;
    pub ntp, set_ntp: 3;
    pub gps, set_gps: 4;
    pub nbiot, set_nbiot: 5;
    pub lorawan, set_lorawan: 6;
}

impl ConfigFlags {
    pub const fn from_bits(bits: u8) -> Self {
        ConfigFlags(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub fn orientation(&self) -> Orientation {
        Orientation::from_code(self.orientation_code())
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        self.set_orientation_code(orientation.code());
    }

    pub fn is_enabled(&self, feature: Feature) -> bool {
        match feature {
            Feature::Wifi => self.wifi(),
            Feature::Ntp => self.ntp(),
            Feature::Gps => self.gps(),
            Feature::NbIot => self.nbiot(),
            Feature::LoRaWan => self.lorawan(),
        }
    }

    pub fn set(&mut self, feature: Feature, enabled: bool) {
        match feature {
            Feature::Wifi => self.set_wifi(enabled),
            Feature::Ntp => self.set_ntp(enabled),
            Feature::Gps => self.set_gps(enabled),
            Feature::NbIot => self.set_nbiot(enabled),
            Feature::LoRaWan => self.set_lorawan(enabled),
        }
    }

    pub fn enable(&mut self, feature: Feature) {
        self.set(feature, true);
    }

    pub fn disable(&mut self, feature: Feature) {
        self.set(feature, false);
    }

    pub fn enabled_features(&self) -> Vec<Feature> {
        Feature::ALL
            .into_iter()
            .filter(|f| self.is_enabled(*f))
            .collect()
    }
}

/// Optional services gated by `config_flags`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Feature {
    Wifi,
    Ntp,
    Gps,
    #[value(name = "nbiot")]
    NbIot,
    #[value(name = "lorawan")]
    LoRaWan,
}

impl Feature {
    pub const ALL: [Feature; 5] = [
        Feature::Wifi,
        Feature::Ntp,
        Feature::Gps,
        Feature::NbIot,
        Feature::LoRaWan,
    ];
}

bitfield! {
    /// `init_flags`: board support package bring-up state.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct InitFlags(u8);
    impl Debug;
    pub bsp_initialized, set_bsp_initialized: 0;
    pub bsp_activated, set_bsp_activated: 1;
}

impl InitFlags {
    pub const fn from_bits(bits: u8) -> Self {
        InitFlags(bits)
    }

    pub const fn bits(&self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wifi_bit_isolation() {
        for start in 0..=u8::MAX {
            let mut flags = ConfigFlags::from_bits(start);
            flags.set_wifi(true);
            assert_eq!(flags.bits(), start | 0b0000_0100, "set from {start:#010b}");
            flags.set_wifi(false);
            assert_eq!(flags.bits(), start & !0b0000_0100, "clear from {start:#010b}");
        }
    }

    #[test]
    fn feature_bits() {
        let expected = [
            (Feature::Wifi, 1 << 2),
            (Feature::Ntp, 1 << 3),
            (Feature::Gps, 1 << 4),
            (Feature::NbIot, 1 << 5),
            (Feature::LoRaWan, 1 << 6),
        ];
        for (feature, bit) in expected {
            let mut flags = ConfigFlags::default();
            flags.enable(feature);
            assert_eq!(flags.bits(), bit, "{feature}");
            assert!(flags.is_enabled(feature));
            flags.disable(feature);
            assert_eq!(flags.bits(), 0);
        }
    }

    #[test]
    fn orientation_keeps_other_bits() {
        for start in 0..=u8::MAX {
            let mut flags = ConfigFlags::from_bits(start);
            flags.set_orientation(Orientation::Flat);
            assert_eq!(flags.bits() & !0b11, start & !0b11);
            assert_eq!(flags.orientation(), Orientation::Flat);
        }
    }

    #[test]
    fn reserved_orientation_is_unspecified() {
        let flags = ConfigFlags::from_bits(0b0000_0111);
        assert_eq!(flags.orientation(), Orientation::Unspecified);
        assert!(flags.wifi());
    }

    #[test]
    fn init_flags_preserve_reserved_bits() {
        let mut flags = InitFlags::from_bits(0b1010_0000);
        flags.set_bsp_initialized(true);
        flags.set_bsp_activated(true);
        assert_eq!(flags.bits(), 0b1010_0011);
        flags.set_bsp_activated(false);
        assert_eq!(flags.bits(), 0b1010_0001);
        assert!(flags.bsp_initialized());
        assert!(!flags.bsp_activated());
    }
}
