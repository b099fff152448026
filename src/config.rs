//! YAML provisioning files, as produced at manufacturing time.
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::constants::image;
use crate::descriptor::HardwareDescriptor;
use crate::flags::Feature;
use crate::image::{ProvisioningImage, SoftwareDescription};
use crate::layout::Version;
use crate::section::SystemSection;
use crate::types::{InitDate, Orientation};

pub const SYNTAX_NAME: &str = "auralys-hwconfig";
pub const SYNTAX_VERSION_MIN: Version = Version::new(0, 3);

/// File format header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syntax {
    pub name: String,
    pub version: Version,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProvisionConfig {
    pub syntax: Syntax,
    /// Hex encoded, exactly 8 bytes.
    #[serde(deserialize_with = "parse_watermark")]
    pub watermark: [u8; image::WATERMARK_SIZE],
    pub hardware: HardwareDescriptor,
    /// Hex encoded software-description payload.
    #[serde(default, deserialize_with = "parse_hex")]
    pub software: Vec<u8>,
    #[serde(default)]
    pub system: Option<SystemConfig>,
}

/// Initial system section contents. Mirrored fields come from `hardware`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemConfig {
    pub init_date: InitDate,
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Overrides the orientation taken from the descriptor.
    #[serde(default)]
    pub orientation: Option<Orientation>,
    #[serde(default)]
    pub bsp_initialized: bool,
    #[serde(default)]
    pub bsp_activated: bool,
}

impl ProvisionConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let p = path.as_ref();
        let raw = std::fs::read_to_string(p)
            .with_context(|| format!("cannot read provisioning file {}", p.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid provisioning file {}", p.display()))
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: ProvisionConfig = serde_yaml::from_str(raw)?;
        config.check_syntax()?;
        Ok(config)
    }

    fn check_syntax(&self) -> Result<()> {
        anyhow::ensure!(
            self.syntax.name == SYNTAX_NAME,
            "invalid syntax name: expected {:?}, got {:?}",
            SYNTAX_NAME,
            self.syntax.name
        );
        anyhow::ensure!(
            self.syntax.version >= SYNTAX_VERSION_MIN,
            "syntax version {} is older than the minimum supported {}",
            self.syntax.version,
            SYNTAX_VERSION_MIN
        );
        Ok(())
    }

    pub fn image(&self) -> ProvisioningImage {
        ProvisioningImage {
            watermark: self.watermark,
            hardware: self.hardware.clone(),
            software: SoftwareDescription::new(self.software.clone()),
        }
    }

    pub fn system_section(&self) -> Option<SystemSection> {
        let system = self.system.as_ref()?;
        let mut section = SystemSection::from_descriptor(&self.hardware, system.init_date);
        if let Some(orientation) = system.orientation {
            section.config.set_orientation(orientation);
        }
        for feature in &system.features {
            section.config.enable(*feature);
        }
        section.init.set_bsp_initialized(system.bsp_initialized);
        section.init.set_bsp_activated(system.bsp_activated);
        Some(section)
    }
}

fn parse_hex<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    let s = s.trim();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    hex::decode(s).map_err(serde::de::Error::custom)
}

fn parse_watermark<'de, D>(deserializer: D) -> std::result::Result<[u8; image::WATERMARK_SIZE], D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = parse_hex(deserializer)?;
    raw.as_slice().try_into().map_err(|_| {
        serde::de::Error::custom(format!(
            "watermark must be {} bytes, got {}",
            image::WATERMARK_SIZE,
            raw.len()
        ))
    })
}
