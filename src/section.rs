//! The system section: first 32 bytes of the EEPROM.
use scroll::{LE, Pread};

use crate::buffer::ensure_len;
use crate::constants::{SIGNATURE, SYSTEM_SECTION_SIZE};
use crate::descriptor::HardwareDescriptor;
use crate::error::{Error, Result};
use crate::flags::{ConfigFlags, InitFlags};
use crate::layout::{LAYOUT_VERSION, SystemField, Version};
use crate::types::{InitDate, SlaveTuning, UnitType};

/// Decoded system section. The signature is implied: it is checked on read
/// and always written as [`SIGNATURE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemSection {
    pub descriptor_version: Version,
    pub config: ConfigFlags,
    pub init: InitFlags,
    pub init_date: InitDate,
    /// Raw mirror of the descriptor unit type, see [`SystemSection::unit_type`].
    pub hw_unit_type: u8,
    pub mks: SlaveTuning,
}

impl Default for SystemSection {
    fn default() -> Self {
        SystemSection {
            descriptor_version: LAYOUT_VERSION,
            config: ConfigFlags::default(),
            init: InitFlags::default(),
            init_date: InitDate::default(),
            hw_unit_type: UnitType::None as u8,
            mks: SlaveTuning::default(),
        }
    }
}

impl SystemSection {
    /// Builds the mirrored fields from the provisioned descriptor.
    pub fn from_descriptor(descriptor: &HardwareDescriptor, init_date: InitDate) -> Self {
        let mut config = ConfigFlags::default();
        config.set_orientation(descriptor.unit_orientation.into());
        SystemSection {
            descriptor_version: descriptor.version,
            config,
            init: InitFlags::default(),
            init_date,
            hw_unit_type: descriptor.unit_type as u8,
            mks: descriptor.mks,
        }
    }

    pub fn unit_type(&self) -> Result<UnitType> {
        UnitType::try_from(self.hw_unit_type)
    }
}

/// Interprets the first [`SYSTEM_SECTION_SIZE`] bytes of `buf`.
pub fn read_section(buf: &[u8]) -> Result<SystemSection> {
    ensure_len(buf, SYSTEM_SECTION_SIZE)?;

    let mut found = [0u8; 3];
    found.copy_from_slice(&buf[SystemField::Signature.range()]);
    if &found != SIGNATURE {
        return Err(Error::SignatureMismatch { found });
    }

    let byte = |field: SystemField| buf.pread_with::<u8>(field.offset(), LE);
    let section = SystemSection {
        descriptor_version: Version::new(
            byte(SystemField::DescriptorMajor)?,
            byte(SystemField::DescriptorMinor)?,
        ),
        config: ConfigFlags::from_bits(byte(SystemField::ConfigFlags)?),
        init: InitFlags::from_bits(byte(SystemField::InitFlags)?),
        init_date: InitDate::from_raw(
            byte(SystemField::InitYear)?,
            byte(SystemField::InitMonth)?,
            byte(SystemField::InitDay)?,
        ),
        hw_unit_type: byte(SystemField::HwUnitType)?,
        mks: SlaveTuning {
            slave_addr: byte(SystemField::MksSlaveAddr)?,
            speed: byte(SystemField::MksSpeed)?,
            accel: byte(SystemField::MksAccel)?,
        },
    };
    if !section.descriptor_version.is_supported() {
        log::warn!(
            "system section refers to unsupported descriptor v{}",
            section.descriptor_version
        );
    }
    Ok(section)
}

/// Encodes a full section, reserved tail zero-filled.
pub fn write_section(section: &SystemSection) -> [u8; SYSTEM_SECTION_SIZE] {
    let mut buf = [0u8; SYSTEM_SECTION_SIZE];
    let [year, month, day] = section.init_date.to_raw();

    buf[SystemField::Signature.range()].copy_from_slice(SIGNATURE);
    for (field, value) in [
        (SystemField::DescriptorMajor, section.descriptor_version.major),
        (SystemField::DescriptorMinor, section.descriptor_version.minor),
        (SystemField::ConfigFlags, section.config.bits()),
        (SystemField::InitFlags, section.init.bits()),
        (SystemField::InitYear, year),
        (SystemField::InitMonth, month),
        (SystemField::InitDay, day),
        (SystemField::HwUnitType, section.hw_unit_type),
        (SystemField::MksSlaveAddr, section.mks.slave_addr),
        (SystemField::MksSpeed, section.mks.speed),
        (SystemField::MksAccel, section.mks.accel),
    ] {
        buf[field.offset()] = value;
    }
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::SYSTEM_LAYOUT_END;
    use crate::types::Orientation;

    fn sample() -> SystemSection {
        let mut section = SystemSection {
            init_date: InitDate::from_ymd(2023, 11, 30).unwrap(),
            hw_unit_type: UnitType::Left as u8,
            mks: SlaveTuning {
                slave_addr: 1,
                speed: 200,
                accel: 7,
            },
            ..Default::default()
        };
        section.config.set_gps(true);
        section.init.set_bsp_activated(true);
        section
    }

    #[test]
    fn roundtrip_zero_fills_tail() {
        let raw = write_section(&sample());
        assert_eq!(&raw[..3], b"brw");
        assert!(raw[SYSTEM_LAYOUT_END..].iter().all(|&b| b == 0));
        assert_eq!(read_section(&raw).unwrap(), sample());
    }

    #[test]
    fn reads_from_larger_buffer() {
        let mut eeprom = vec![0xffu8; 256];
        eeprom[..SYSTEM_SECTION_SIZE].copy_from_slice(&write_section(&sample()));
        assert_eq!(read_section(&eeprom).unwrap(), sample());
    }

    #[test]
    fn signature_mismatch() {
        let mut raw = write_section(&sample());
        raw[1] = b'x';
        assert!(matches!(
            read_section(&raw),
            Err(Error::SignatureMismatch { found }) if &found == b"bxw"
        ));
    }

    #[test]
    fn erased_store_has_no_signature() {
        assert!(matches!(
            read_section(&[0xffu8; SYSTEM_SECTION_SIZE]),
            Err(Error::SignatureMismatch { .. })
        ));
    }

    #[test]
    fn short_buffer() {
        let raw = write_section(&sample());
        assert!(matches!(
            read_section(&raw[..SYSTEM_SECTION_SIZE - 1]),
            Err(Error::BufferTooShort { needed: 32, actual: 31 })
        ));
    }

    #[test]
    fn unknown_unit_type_is_kept_raw() {
        let mut raw = write_section(&sample());
        raw[SystemField::HwUnitType.offset()] = 0x42;
        let section = read_section(&raw).unwrap();
        assert_eq!(section.hw_unit_type, 0x42);
        assert!(section.unit_type().is_err());
    }

    #[test]
    fn reserved_orientation_decodes() {
        let mut raw = write_section(&sample());
        raw[SystemField::ConfigFlags.offset()] |= 0b11;
        let section = read_section(&raw).unwrap();
        assert_eq!(section.config.orientation(), Orientation::Unspecified);
        assert!(section.config.gps());
    }
}
