use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "fwpipe",
    version,
    about = "Apply a chain of visitors to a firmware image",
    long_about = "Apply a chain of visitors to a firmware image.\n\n\
        Commands follow the image path with no separators; each command consumes \
        exactly as many of the following tokens as it takes arguments.\n\n\
        Example: fwpipe bios.rom strip inject payload.bin save out.rom"
)]
pub struct Cli {
    /// List available visitors and exit
    #[arg(long)]
    pub list: bool,

    /// Firmware image: a raw binary or a JSON tree written by `save`
    #[arg(required_unless_present = "list")]
    pub image: Option<PathBuf>,

    /// Visitor commands and their arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub commands: Vec<String>,
}
