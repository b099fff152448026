use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use auralys_eeprom::config::ProvisionConfig;
use auralys_eeprom::constants::{EEPROM_SIZE, SYSTEM_SECTION_ADDR};
use auralys_eeprom::{
    Feature, MemoryEeprom, ProvisioningImage, SystemSection, SystemStore, read_section,
};

#[derive(Parser)]
#[command(
    name = "auralys-eeprom",
    about = "Build and inspect Auralys hardware descriptor images and EEPROM system sections"
)]
struct Cli {
    /// Print debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a provisioning image from a YAML provisioning file
    Provision {
        config: PathBuf,
        /// Output image file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Decode and print a provisioning image
    Info { path: PathBuf },
    /// Build an EEPROM dump holding the system section of a provisioning file
    InitSystem {
        config: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Decode and print the system section of an EEPROM dump
    System { path: PathBuf },
    /// Set or clear a flag in the system section of an EEPROM dump
    Flag {
        path: PathBuf,
        flag: FlagName,
        #[arg(action = clap::ArgAction::Set)]
        value: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FlagName {
    Wifi,
    Ntp,
    Gps,
    Nbiot,
    Lorawan,
    BspInitialized,
    BspActivated,
}

impl FlagName {
    fn feature(self) -> Option<Feature> {
        match self {
            FlagName::Wifi => Some(Feature::Wifi),
            FlagName::Ntp => Some(Feature::Ntp),
            FlagName::Gps => Some(Feature::Gps),
            FlagName::Nbiot => Some(Feature::NbIot),
            FlagName::Lorawan => Some(Feature::LoRaWan),
            FlagName::BspInitialized | FlagName::BspActivated => None,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _ = simplelog::TermLogger::init(
        if cli.verbose {
            simplelog::LevelFilter::Debug
        } else {
            simplelog::LevelFilter::Info
        },
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );

    match cli.command {
        Commands::Provision { config, output } => {
            let config = ProvisionConfig::load(&config)?;
            let raw = config.image().encode()?;
            std::fs::write(&output, &raw)
                .with_context(|| format!("cannot write {}", output.display()))?;
            log::info!("Image written to {} ({} bytes)", output.display(), raw.len());
        }
        Commands::Info { path } => {
            let raw = read_file(&path)?;
            let image = ProvisioningImage::decode(&raw)?;
            dump_image(&image);
        }
        Commands::InitSystem { config, output } => {
            let config = ProvisionConfig::load(&config)?;
            let section = config
                .system_section()
                .context("provisioning file has no system block")?;
            let mut store = SystemStore::new(MemoryEeprom::new());
            store.save(&section)?;
            std::fs::write(&output, store.into_inner().as_bytes())
                .with_context(|| format!("cannot write {}", output.display()))?;
            log::info!("EEPROM dump written to {} ({} bytes)", output.display(), EEPROM_SIZE);
        }
        Commands::System { path } => {
            let raw = read_file(&path)?;
            anyhow::ensure!(raw.len() > SYSTEM_SECTION_ADDR, "empty EEPROM dump");
            let section = read_section(&raw[SYSTEM_SECTION_ADDR..])?;
            dump_section(&section);
        }
        Commands::Flag { path, flag, value } => {
            let raw = read_file(&path)?;
            let mut store = SystemStore::new(MemoryEeprom::from_bytes(raw));
            match (flag.feature(), flag) {
                (Some(feature), _) => {
                    store.update_config(|config| config.set(feature, value))?;
                }
                (None, FlagName::BspInitialized) => store.set_bsp_initialized(value)?,
                (None, _) => store.set_bsp_activated(value)?,
            }
            dump_section(&store.load()?);
            std::fs::write(&path, store.into_inner().as_bytes())
                .with_context(|| format!("cannot write {}", path.display()))?;
        }
    }

    Ok(())
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    let raw = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    log::debug!("Read {} ({} bytes)", path.display(), raw.len());
    Ok(raw)
}

fn dump_image(image: &ProvisioningImage) {
    let hw = &image.hardware;
    log::info!("Watermark: {}", hex::encode(image.watermark));
    log::info!("Descriptor: v{} ({} bytes)", hw.version, hw.section_size());
    log::info!("Codename: {}", hw.codename);
    log::info!("CPU: {} / {}", hw.cpu_arch, hw.cpu_type);
    log::info!("PCB: v{} uuid4 {}", hw.pcb_version, hw.pcb_uuid4);
    log::info!("Unit: {} ({})", hw.unit_type, hw.unit_orientation);
    log::info!(
        "MKS slave: addr {} speed {} accel {}",
        hw.mks.slave_addr,
        hw.mks.speed,
        hw.mks.accel
    );
    log::info!("Software description: {}", hex::encode(&image.software.payload));
}

fn dump_section(section: &SystemSection) {
    log::info!("Descriptor version: v{}", section.descriptor_version);
    log::info!("Orientation: {}", section.config.orientation());
    let features: Vec<String> = section
        .config
        .enabled_features()
        .iter()
        .map(|f| f.to_string())
        .collect();
    log::info!("Features: [{}]", features.join(", "));
    log::info!(
        "BSP initialized: {}, activated: {}",
        section.init.bsp_initialized(),
        section.init.bsp_activated()
    );
    if section.init_date.is_valid() {
        log::info!("Init date: {}", section.init_date);
    } else {
        log::warn!("Init date not set: {:02x?}", section.init_date.to_raw());
    }
    match section.unit_type() {
        Ok(unit_type) => log::info!("Unit type: {}", unit_type),
        Err(e) => log::warn!("Unit type: {}", e),
    }
    log::info!(
        "MKS slave: addr {} speed {} accel {}",
        section.mks.slave_addr,
        section.mks.speed,
        section.mks.accel
    );
}
