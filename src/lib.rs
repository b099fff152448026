//! Auralys EEPROM layout: the hardware descriptor provisioning image and the
//! system section map.

pub mod buffer;
pub mod config;
pub mod constants;
pub mod descriptor;
pub mod error;
pub mod flags;
pub mod image;
pub mod layout;
pub mod section;
pub mod store;
pub mod types;

pub use self::descriptor::HardwareDescriptor;
pub use self::error::{Error, LayoutWarning, Result};
pub use self::flags::{ConfigFlags, Feature, InitFlags};
pub use self::image::{ProvisioningImage, SoftwareDescription};
pub use self::layout::{LAYOUT_VERSION, Version};
pub use self::section::{SystemSection, read_section, write_section};
pub use self::store::{MemoryEeprom, SystemStore};
pub use self::types::{InitDate, Orientation, SlaveTuning, UnitOrientation, UnitType};
