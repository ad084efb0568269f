// CLI definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use itgio_device::Variant;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "itgio_driver")]
#[command(author, version, about = "UltraCade ITG-IO Linux Driver")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/itgio/itgio.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// Board variant, overrides the config file
    #[arg(long, global = true, value_enum)]
    pub variant: Option<VariantArg>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List connected ITG-IO interfaces
    #[command(visible_aliases = ["ls", "l"])]
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the raw and patched report descriptor of each interface
    #[command(visible_aliases = ["rdesc", "d"])]
    Descriptor {
        /// Read the descriptor from a file instead of a device
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Write the patched descriptor here
        #[arg(long, value_name = "OUT")]
        write: Option<PathBuf>,
    },

    /// Switch one light on or off
    Set {
        /// Light index (0-15)
        index: usize,

        /// New state
        #[arg(value_enum)]
        state: LightState,
    },

    /// Cycle through every light until Ctrl+C
    #[command(visible_alias = "t")]
    Test {
        /// Time each light stays on, and off
        #[arg(long, default_value = "1000")]
        delay_ms: u64,
    },

    /// Print button changes
    #[command(visible_alias = "w")]
    Watch,

    /// Run the driver daemon
    Serve,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum VariantArg {
    Basic,
    Refined,
}

impl From<VariantArg> for Variant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::Basic => Variant::Basic,
            VariantArg::Refined => Variant::Refined,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LightState {
    On,
    Off,
}

impl LightState {
    pub fn level(self) -> u8 {
        match self {
            LightState::On => 1,
            LightState::Off => 0,
        }
    }
}
