pub mod run;
pub mod tui;

use clap::Args;

use crate::config::Overrides;

/// Machine shape flags shared by every subcommand.
#[derive(Args, Debug, Default, Clone, Copy)]
pub struct MachineArgs {
    /// Number of tape cells (fallback BF_CAPACITY, then config file; default 4096)
    #[arg(short = 'c', long = "capacity", value_name = "CELLS")]
    pub capacity: Option<usize>,

    /// Cell wraparound modulus, 2..=256 (fallback BF_MODULUS, then config file; default 128)
    #[arg(short = 'm', long = "modulus", value_name = "M")]
    pub modulus: Option<u16>,
}

impl MachineArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            capacity: self.capacity,
            modulus: self.modulus,
            ..Overrides::default()
        }
    }
}
