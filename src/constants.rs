//! Sizes, addresses and literals shared by every section codec.

/// Total addressable size of the EEPROM.
pub const EEPROM_SIZE: usize = 256;

/// Literal tag at the start of a valid system section.
pub const SIGNATURE: &[u8; 3] = b"brw";

pub const SYSTEM_SECTION_ADDR: usize = 0x00;
pub const SYSTEM_SECTION_SIZE: usize = 32;

/// Provisioning image: watermark, hardware section, software-description section.
pub mod image {
    pub const WATERMARK_SIZE: usize = 8;
    pub const HW_SECTION_BUDGET: usize = 172;
    pub const SW_SECTION_BUDGET: usize = 27;
    pub const MAX_SIZE: usize = 256;
}

/// Text field widths, without the NUL terminator.
pub mod text {
    pub const CODENAME_MAX: usize = 16;
    pub const CPU_ARCH_MAX: usize = 8;
    pub const CPU_TYPE_MAX: usize = 8;
    pub const PCB_UUID4_MAX: usize = 32;
}

/// Epoch of the single-byte init year.
pub const INIT_YEAR_EPOCH: u16 = 2000;
