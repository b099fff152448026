//! Versioned field tables for the system section and the hardware descriptor.
//!
//! Each table only declares field sizes, in storage order. Offsets are prefix
//! sums over the table, evaluated at compile time, so growing a field
//! re-aligns everything after it.
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::constants::{SIGNATURE, SYSTEM_SECTION_SIZE, image, text};

/// Layout version, `major.minor`. Only the major gates decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8) -> Self {
        Version { major, minor }
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_MAJORS.contains(&self.major)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Version written by this crate.
pub const LAYOUT_VERSION: Version = Version::new(0, 3);

/// Descriptor majors this crate can decode.
pub const SUPPORTED_MAJORS: &[u8] = &[0];

/// Fields of the system section, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[repr(usize)]
pub enum SystemField {
    Signature,
    DescriptorMajor,
    DescriptorMinor,
    ConfigFlags,
    InitFlags,
    InitYear,
    InitMonth,
    InitDay,
    HwUnitType,
    MksSlaveAddr,
    MksSpeed,
    MksAccel,
}

impl SystemField {
    pub const ALL: [SystemField; 12] = [
        SystemField::Signature,
        SystemField::DescriptorMajor,
        SystemField::DescriptorMinor,
        SystemField::ConfigFlags,
        SystemField::InitFlags,
        SystemField::InitYear,
        SystemField::InitMonth,
        SystemField::InitDay,
        SystemField::HwUnitType,
        SystemField::MksSlaveAddr,
        SystemField::MksSpeed,
        SystemField::MksAccel,
    ];

    pub const fn size(self) -> usize {
        match self {
            SystemField::Signature => SIGNATURE.len(),
            _ => 1,
        }
    }

    /// Offset relative to the start of the section.
    pub const fn offset(self) -> usize {
        let mut offset = 0;
        let mut i = 0;
        while i < self as usize {
            offset += Self::ALL[i].size();
            i += 1;
        }
        offset
    }

    pub const fn end(self) -> usize {
        self.offset() + self.size()
    }

    pub const fn range(self) -> Range<usize> {
        self.offset()..self.end()
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// First byte after the last defined system field.
pub const SYSTEM_LAYOUT_END: usize = SystemField::ALL[SystemField::ALL.len() - 1].end();

/// Fields of the hardware descriptor record, in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
#[repr(usize)]
pub enum DescriptorField {
    SectionSize,
    VersionMajor,
    VersionMinor,
    Codename,
    CpuArch,
    CpuType,
    PcbMajor,
    PcbMinor,
    PcbUuid4,
    UnitType,
    UnitOrientation,
    MksSlaveAddr,
    MksSpeed,
    MksAccel,
}

impl DescriptorField {
    pub const ALL: [DescriptorField; 14] = [
        DescriptorField::SectionSize,
        DescriptorField::VersionMajor,
        DescriptorField::VersionMinor,
        DescriptorField::Codename,
        DescriptorField::CpuArch,
        DescriptorField::CpuType,
        DescriptorField::PcbMajor,
        DescriptorField::PcbMinor,
        DescriptorField::PcbUuid4,
        DescriptorField::UnitType,
        DescriptorField::UnitOrientation,
        DescriptorField::MksSlaveAddr,
        DescriptorField::MksSpeed,
        DescriptorField::MksAccel,
    ];

    /// Storage size; text fields include their NUL terminator.
    pub const fn size(self) -> usize {
        match self {
            DescriptorField::Codename => text::CODENAME_MAX + 1,
            DescriptorField::CpuArch => text::CPU_ARCH_MAX + 1,
            DescriptorField::CpuType => text::CPU_TYPE_MAX + 1,
            DescriptorField::PcbUuid4 => text::PCB_UUID4_MAX + 1,
            _ => 1,
        }
    }

    pub const fn offset(self) -> usize {
        let mut offset = 0;
        let mut i = 0;
        while i < self as usize {
            offset += Self::ALL[i].size();
            i += 1;
        }
        offset
    }

    pub const fn end(self) -> usize {
        self.offset() + self.size()
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

/// Encoded length of a descriptor at [`LAYOUT_VERSION`].
pub const DESCRIPTOR_SIZE: usize = DescriptorField::ALL[DescriptorField::ALL.len() - 1].end();

const fn tables_in_order() -> bool {
    let mut i = 0;
    while i < SystemField::ALL.len() {
        if SystemField::ALL[i] as usize != i {
            return false;
        }
        i += 1;
    }
    let mut i = 0;
    while i < DescriptorField::ALL.len() {
        if DescriptorField::ALL[i] as usize != i {
            return false;
        }
        i += 1;
    }
    true
}

const _: () = assert!(tables_in_order(), "field tables must follow declaration order");
const _: () = assert!(
    SYSTEM_LAYOUT_END < SYSTEM_SECTION_SIZE,
    "system fields overflow the system section"
);
const _: () = assert!(
    DESCRIPTOR_SIZE <= image::HW_SECTION_BUDGET,
    "hardware descriptor exceeds its section budget"
);
const _: () = assert!(
    image::WATERMARK_SIZE + image::HW_SECTION_BUDGET + image::SW_SECTION_BUDGET
        <= image::MAX_SIZE,
    "provisioning image budget exceeds the store"
);
