use std::ffi::OsString;
use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::codec::Mode;

#[derive(Parser, Debug)]
#[command(
    name = "glzma",
    version,
    about = "Compress or decompress one file the way EDK2's LzmaCompress does",
    group(ArgGroup::new("mode").required(true).args(["decode", "encode"]))
)]
pub struct Cli {
    /// Decode INPUT_FILE
    #[arg(short = 'd')]
    pub decode: bool,

    /// Encode INPUT_FILE
    #[arg(short = 'e')]
    pub encode: bool,

    /// Use the x86 branch/call/jump filter (see `man xz`)
    #[arg(long = "f86")]
    pub x86: bool,

    /// Output file
    #[arg(short = 'o', value_name = "OUTPUT_FILE")]
    pub output: PathBuf,

    #[arg(value_name = "INPUT_FILE")]
    pub input: PathBuf,
}

impl Cli {
    pub fn mode(&self) -> Mode {
        if self.decode {
            Mode::Decode
        } else {
            Mode::Encode
        }
    }
}

/// EDK2 build scripts spell the filter flag `-f86` as well as `--f86`.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| if arg == "-f86" { OsString::from("--f86") } else { arg })
        .collect()
}
