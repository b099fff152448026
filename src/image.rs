//! Provisioning image: watermark, hardware descriptor, software description.
//!
//! The whole image is capped at [`image::MAX_SIZE`] bytes. Writers check the
//! cap before touching the target buffer, so an oversized image never reaches
//! the store.
use crate::buffer::{check_budget, ensure_len};
use crate::constants::image;
use crate::descriptor::HardwareDescriptor;
use crate::error::{LayoutWarning, Result};
use crate::layout::DESCRIPTOR_SIZE;

/// Software-description trailer, carried as an opaque payload.
///
/// Stored as one section size byte (header included) followed by the payload.
/// A size byte of `0x00` or `0xff` marks an absent section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SoftwareDescription {
    pub payload: Vec<u8>,
}

impl SoftwareDescription {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        SoftwareDescription {
            payload: payload.into(),
        }
    }

    pub fn section_size(&self) -> usize {
        1 + self.payload.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningImage {
    /// Validated by the storage layer, carried through untouched.
    pub watermark: [u8; image::WATERMARK_SIZE],
    pub hardware: HardwareDescriptor,
    pub software: SoftwareDescription,
}

impl ProvisioningImage {
    pub fn encoded_len(&self) -> usize {
        image::WATERMARK_SIZE + self.hardware.section_size() + self.software.section_size()
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; self.encoded_len()];
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Writes the image to the front of `buf`, returning the byte count.
    ///
    /// Nothing is written unless every check passes.
    pub fn write_to(&self, buf: &mut [u8]) -> Result<usize> {
        let total = self.encoded_len();
        check_budget(total)?;
        self.hardware.validate()?;
        ensure_len(buf, total)?;

        buf[..image::WATERMARK_SIZE].copy_from_slice(&self.watermark);
        let hw_size = self.hardware.encode_into(&mut buf[image::WATERMARK_SIZE..])?;
        let sw_offset = image::WATERMARK_SIZE + hw_size;
        buf[sw_offset] = self.software.section_size() as u8;
        buf[sw_offset + 1..total].copy_from_slice(&self.software.payload);

        log::debug!(
            "image: {} bytes ({} wmark + {} hw + {} sw) of {}",
            total,
            image::WATERMARK_SIZE,
            hw_size,
            self.software.section_size(),
            image::MAX_SIZE
        );
        Ok(total)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        Self::decode_with_warnings(bytes).map(|(image, _)| image)
    }

    /// Decodes a stored image. A stored layout over the cap is logged and
    /// reported, since the store already holds it.
    pub fn decode_with_warnings(bytes: &[u8]) -> Result<(Self, Vec<LayoutWarning>)> {
        ensure_len(bytes, image::WATERMARK_SIZE + DESCRIPTOR_SIZE)?;

        let mut watermark = [0u8; image::WATERMARK_SIZE];
        watermark.copy_from_slice(&bytes[..image::WATERMARK_SIZE]);

        let (hardware, hw_size) = HardwareDescriptor::decode_record(&bytes[image::WATERMARK_SIZE..])?;
        let sw_offset = image::WATERMARK_SIZE + hw_size;
        ensure_len(bytes, sw_offset)?;

        let (software, sw_size) = match bytes.get(sw_offset).copied() {
            None | Some(0x00) | Some(0xff) => {
                log::debug!("image: no software description");
                (SoftwareDescription::default(), 0)
            }
            Some(size) => {
                let end = sw_offset + size as usize;
                ensure_len(bytes, end)?;
                (SoftwareDescription::new(&bytes[sw_offset + 1..end]), size as usize)
            }
        };

        let mut warnings = Vec::new();
        let total = sw_offset + sw_size;
        if total > image::MAX_SIZE {
            let warning = LayoutWarning {
                total,
                limit: image::MAX_SIZE,
            };
            log::warn!("provisioning image: {}", warning);
            warnings.push(warning);
        }

        let image = ProvisioningImage {
            watermark,
            hardware,
            software,
        };
        Ok((image, warnings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::layout::{LAYOUT_VERSION, Version};
    use crate::types::{SlaveTuning, UnitOrientation, UnitType};

    fn sample() -> ProvisioningImage {
        ProvisioningImage {
            watermark: *b"AURALYS\0",
            hardware: HardwareDescriptor {
                version: LAYOUT_VERSION,
                codename: "ilbert".into(),
                cpu_arch: "xtensa".into(),
                cpu_type: "esp32".into(),
                pcb_version: Version::new(2, 0),
                pcb_uuid4: "9b2e4c1a7f0d4e3b8a6c5d4e3f2a1b0c".into(),
                unit_type: UnitType::Front,
                unit_orientation: UnitOrientation::VerticalUp,
                mks: SlaveTuning {
                    slave_addr: 3,
                    speed: 50,
                    accel: 4,
                },
            },
            software: SoftwareDescription::new(b"fw 1.4.2".to_vec()),
        }
    }

    #[test]
    fn roundtrip() {
        let image = sample();
        let raw = image.encode().unwrap();
        assert_eq!(raw.len(), 8 + 78 + 9);
        assert_eq!(&raw[..8], b"AURALYS\0");
        assert_eq!(raw[8], 78);
        assert_eq!(raw[86], 9);
        assert_eq!(ProvisioningImage::decode(&raw).unwrap(), image);
    }

    #[test]
    fn decodes_from_padded_store() {
        let image = sample();
        let mut store = vec![0xffu8; 256];
        image.write_to(&mut store).unwrap();
        let (decoded, warnings) = ProvisioningImage::decode_with_warnings(&store).unwrap();
        assert_eq!(decoded, image);
        assert!(warnings.is_empty());
    }

    #[test]
    fn missing_software_section() {
        let mut image = sample();
        image.software = SoftwareDescription::default();
        let raw = image.encode().unwrap();
        assert_eq!(ProvisioningImage::decode(&raw).unwrap(), image);
        assert_eq!(ProvisioningImage::decode(&raw[..86]).unwrap(), image);
    }

    #[test]
    fn largest_image_fits() {
        let mut image = sample();
        image.software = SoftwareDescription::new(vec![0x11; 256 - 8 - 78 - 1]);
        assert_eq!(image.encode().unwrap().len(), 256);
    }

    #[test]
    fn overflow_blocks_write() {
        let mut image = sample();
        image.software = SoftwareDescription::new(vec![0x11; 256 - 8 - 78]);
        let mut store = vec![0xeeu8; 512];
        let err = image.write_to(&mut store).unwrap_err();
        assert!(matches!(err, Error::LayoutOverflow { total: 257, limit: 256 }));
        assert!(store.iter().all(|&b| b == 0xee));
    }

    #[test]
    fn truncated_software_section() {
        let raw = sample().encode().unwrap();
        assert!(matches!(
            ProvisioningImage::decode(&raw[..raw.len() - 1]),
            Err(Error::BufferTooShort { .. })
        ));
    }

    #[test]
    fn oversized_stored_image_warns() {
        let mut raw = sample().encode().unwrap();
        raw.truncate(86);
        raw.push(200);
        raw.extend(std::iter::repeat_n(0u8, 199));
        let (image, warnings) = ProvisioningImage::decode_with_warnings(&raw).unwrap();
        assert_eq!(image.software.payload.len(), 199);
        assert_eq!(
            warnings,
            vec![LayoutWarning {
                total: 286,
                limit: 256
            }]
        );
    }
}
