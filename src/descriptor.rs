//! Hardware descriptor record, written once per unit at manufacturing time.
use scroll::{LE, Pread, Pwrite};
use serde::{Deserialize, Serialize};

use crate::buffer::{check_budget, ensure_len, read_fixed_str, validate_fixed_str, write_fixed_str};
use crate::constants::image;
use crate::error::{Error, LayoutWarning, Result};
use crate::layout::{DESCRIPTOR_SIZE, DescriptorField, LAYOUT_VERSION, Version};
use crate::types::{SlaveTuning, UnitOrientation, UnitType};

/// Board identity and motor-driver tuning.
///
/// The leading section size byte is not stored here: it is always the encoded
/// length, see [`HardwareDescriptor::section_size`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareDescriptor {
    #[serde(default = "current_version")]
    pub version: Version,
    pub codename: String,
    pub cpu_arch: String,
    pub cpu_type: String,
    pub pcb_version: Version,
    pub pcb_uuid4: String,
    pub unit_type: UnitType,
    pub unit_orientation: UnitOrientation,
    pub mks: SlaveTuning,
}

fn current_version() -> Version {
    LAYOUT_VERSION
}

impl HardwareDescriptor {
    /// Bytes occupied by the encoded record.
    pub const fn section_size(&self) -> usize {
        DESCRIPTOR_SIZE
    }

    fn text_fields(&self) -> [(DescriptorField, &str); 4] {
        [
            (DescriptorField::Codename, self.codename.as_str()),
            (DescriptorField::CpuArch, self.cpu_arch.as_str()),
            (DescriptorField::CpuType, self.cpu_type.as_str()),
            (DescriptorField::PcbUuid4, self.pcb_uuid4.as_str()),
        ]
    }

    /// Every check `encode` performs, without touching any buffer.
    pub fn validate(&self) -> Result<()> {
        if !self.version.is_supported() {
            return Err(Error::UnsupportedVersion {
                major: self.version.major,
                minor: self.version.minor,
            });
        }
        for (field, value) in self.text_fields() {
            validate_fixed_str(field.name(), value, field.size())?;
        }
        check_budget(image::WATERMARK_SIZE + self.section_size() + image::SW_SECTION_BUDGET)
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.section_size()];
        self.encode_into(&mut buf)?;
        Ok(buf)
    }

    /// Encodes into the front of `buf` and returns the section size.
    ///
    /// `buf` is left untouched when validation fails.
    pub fn encode_into(&self, buf: &mut [u8]) -> Result<usize> {
        self.validate()?;
        let size = self.section_size();
        ensure_len(buf, size)?;

        let buf = &mut buf[..size];
        buf.fill(0);
        buf.pwrite_with(size as u8, DescriptorField::SectionSize.offset(), LE)?;
        buf.pwrite_with(self.version.major, DescriptorField::VersionMajor.offset(), LE)?;
        buf.pwrite_with(self.version.minor, DescriptorField::VersionMinor.offset(), LE)?;
        for (field, value) in self.text_fields() {
            write_fixed_str(buf, field.offset(), field.name(), value, field.size())?;
        }
        buf.pwrite_with(self.pcb_version.major, DescriptorField::PcbMajor.offset(), LE)?;
        buf.pwrite_with(self.pcb_version.minor, DescriptorField::PcbMinor.offset(), LE)?;
        buf.pwrite_with(self.unit_type as u8, DescriptorField::UnitType.offset(), LE)?;
        buf.pwrite_with(
            self.unit_orientation as u8,
            DescriptorField::UnitOrientation.offset(),
            LE,
        )?;
        buf.pwrite_with(self.mks.slave_addr, DescriptorField::MksSlaveAddr.offset(), LE)?;
        buf.pwrite_with(self.mks.speed, DescriptorField::MksSpeed.offset(), LE)?;
        buf.pwrite_with(self.mks.accel, DescriptorField::MksAccel.offset(), LE)?;
        Ok(size)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with_warnings(bytes).map(|(descriptor, _)| descriptor)
    }

    /// Decodes a stored record. Budget overruns are logged and returned as
    /// warnings instead of failing.
    pub fn decode_with_warnings(bytes: &[u8]) -> Result<(Self, Vec<LayoutWarning>)> {
        let (descriptor, section_size) = Self::decode_record(bytes)?;
        let mut warnings = Vec::new();
        let total = image::WATERMARK_SIZE + section_size + image::SW_SECTION_BUDGET;
        if total > image::MAX_SIZE {
            let warning = LayoutWarning {
                total,
                limit: image::MAX_SIZE,
            };
            log::warn!("hardware descriptor: {}", warning);
            warnings.push(warning);
        }
        Ok((descriptor, warnings))
    }

    /// Decodes the record and returns it with its stored section size.
    pub(crate) fn decode_record(bytes: &[u8]) -> Result<(Self, usize)> {
        ensure_len(bytes, DESCRIPTOR_SIZE)?;

        let version = Version::new(
            bytes.pread_with::<u8>(DescriptorField::VersionMajor.offset(), LE)?,
            bytes.pread_with::<u8>(DescriptorField::VersionMinor.offset(), LE)?,
        );
        if !version.is_supported() {
            return Err(Error::UnsupportedVersion {
                major: version.major,
                minor: version.minor,
            });
        }

        let section_size = stored_section_size(bytes)?;
        if section_size > DESCRIPTOR_SIZE {
            log::debug!(
                "descriptor v{} carries {} bytes beyond the v{} layout, ignored",
                version,
                section_size - DESCRIPTOR_SIZE,
                LAYOUT_VERSION
            );
        }

        let text = |field: DescriptorField| read_fixed_str(bytes, field.offset(), field.name(), field.size());
        let byte = |field: DescriptorField| bytes.pread_with::<u8>(field.offset(), LE);

        let descriptor = HardwareDescriptor {
            version,
            codename: text(DescriptorField::Codename)?,
            cpu_arch: text(DescriptorField::CpuArch)?,
            cpu_type: text(DescriptorField::CpuType)?,
            pcb_version: Version::new(byte(DescriptorField::PcbMajor)?, byte(DescriptorField::PcbMinor)?),
            pcb_uuid4: text(DescriptorField::PcbUuid4)?,
            unit_type: UnitType::try_from(byte(DescriptorField::UnitType)?)?,
            unit_orientation: UnitOrientation::try_from(byte(DescriptorField::UnitOrientation)?)?,
            mks: SlaveTuning {
                slave_addr: byte(DescriptorField::MksSlaveAddr)?,
                speed: byte(DescriptorField::MksSpeed)?,
                accel: byte(DescriptorField::MksAccel)?,
            },
        };
        log::debug!("decoded descriptor: {:?}", descriptor);
        Ok((descriptor, section_size))
    }
}

/// Reads and sanity checks the leading size byte of a stored record.
fn stored_section_size(bytes: &[u8]) -> Result<usize> {
    let size = bytes.pread_with::<u8>(DescriptorField::SectionSize.offset(), LE)? as usize;
    if size < DESCRIPTOR_SIZE {
        return Err(Error::InvalidSectionSize {
            size,
            min: DESCRIPTOR_SIZE,
        });
    }
    Ok(size)
}
