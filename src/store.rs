//! Runtime access to the system section through a storage driver.
//!
//! The driver owns the physical EEPROM; this layer only issues reads and
//! writes. Flag updates are read-modify-write of a single byte, so they take
//! `&mut self`: one owner, no interleaved writers.
use embedded_storage::{ReadStorage, Storage};

use crate::constants::{EEPROM_SIZE, SYSTEM_SECTION_ADDR, SYSTEM_SECTION_SIZE};
use crate::error::{Error, Result};
use crate::flags::{ConfigFlags, InitFlags};
use crate::layout::SystemField;
use crate::section::{SystemSection, read_section, write_section};

pub struct SystemStore<S: Storage> {
    storage: S,
}

impl<S> SystemStore<S>
where
    S: Storage,
    S::Error: core::fmt::Debug,
{
    pub fn new(storage: S) -> Self {
        SystemStore { storage }
    }

    pub fn into_inner(self) -> S {
        self.storage
    }

    pub fn load(&mut self) -> Result<SystemSection> {
        let mut raw = [0u8; SYSTEM_SECTION_SIZE];
        self.read(SYSTEM_SECTION_ADDR, &mut raw)?;
        read_section(&raw)
    }

    pub fn save(&mut self, section: &SystemSection) -> Result<()> {
        let raw = write_section(section);
        self.write(SYSTEM_SECTION_ADDR, &raw)?;
        log::info!("system section written");
        Ok(())
    }

    /// Rewrites only the config flag byte. The section must already be valid.
    pub fn update_config<F>(&mut self, f: F) -> Result<ConfigFlags>
    where
        F: FnOnce(&mut ConfigFlags),
    {
        let mut config = self.load()?.config;
        f(&mut config);
        self.write_field(SystemField::ConfigFlags, config.bits())?;
        Ok(config)
    }

    /// Rewrites only the init flag byte. The section must already be valid.
    pub fn update_init<F>(&mut self, f: F) -> Result<InitFlags>
    where
        F: FnOnce(&mut InitFlags),
    {
        let mut init = self.load()?.init;
        f(&mut init);
        self.write_field(SystemField::InitFlags, init.bits())?;
        Ok(init)
    }

    pub fn set_bsp_initialized(&mut self, value: bool) -> Result<()> {
        self.update_init(|init| init.set_bsp_initialized(value))?;
        Ok(())
    }

    pub fn set_bsp_activated(&mut self, value: bool) -> Result<()> {
        self.update_init(|init| init.set_bsp_activated(value))?;
        Ok(())
    }

    fn write_field(&mut self, field: SystemField, value: u8) -> Result<()> {
        log::debug!("{} <= {:#04x}", field.name(), value);
        self.write(SYSTEM_SECTION_ADDR + field.offset(), &[value])
    }

    fn read(&mut self, offset: usize, bytes: &mut [u8]) -> Result<()> {
        self.storage.read(offset as u32, bytes).map_err(|e| {
            log::error!("storage read at {} failed: {:?}", offset, e);
            Error::Storage
        })
    }

    fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        self.storage.write(offset as u32, bytes).map_err(|e| {
            log::error!("storage write at {} failed: {:?}", offset, e);
            Error::Storage
        })
    }
}

/// EEPROM contents held in memory, e.g. a dump read from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEeprom {
    data: Vec<u8>,
}

impl MemoryEeprom {
    /// Blank EEPROM, all bytes erased to `0xff`.
    pub fn new() -> Self {
        MemoryEeprom {
            data: vec![0xff; EEPROM_SIZE],
        }
    }

    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        MemoryEeprom { data: data.into() }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    fn span(&self, offset: u32, len: usize) -> Result<core::ops::Range<usize>> {
        let start = offset as usize;
        let end = start + len;
        if end > self.data.len() {
            return Err(Error::OutOfBounds { offset: start, len });
        }
        Ok(start..end)
    }
}

impl Default for MemoryEeprom {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadStorage for MemoryEeprom {
    type Error = Error;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<()> {
        let span = self.span(offset, bytes.len())?;
        bytes.copy_from_slice(&self.data[span]);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.data.len()
    }
}

impl Storage for MemoryEeprom {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<()> {
        let span = self.span(offset, bytes.len())?;
        self.data[span].copy_from_slice(bytes);
        Ok(())
    }
}
