use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use nesdis::listing::{ListingOptions, write_listing};
use nesdis::rom::{RomFormat, RomImage};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

//===========================================================================//

#[derive(Parser)]
#[clap(author, about, long_about = None, version)]
struct Cli {
    /// The ROM image to disassemble.
    rom: PathBuf,
    /// Where to write the listing (defaults to stdout).
    #[clap(short, long)]
    output: Option<PathBuf>,
    /// How to interpret the ROM file.
    #[clap(long, value_enum, default_value_t = FormatArg::Auto)]
    format: FormatArg,
    /// Load address of a raw image, in hex.
    #[clap(long, value_parser = parse_address, default_value = "0")]
    origin: u16,
    /// Address to start disassembling from, in hex (defaults to the start of
    /// the image).
    #[clap(long, value_parser = parse_address)]
    start: Option<u16>,
    /// Prefix each line with its address and raw bytes.
    #[clap(short, long)]
    listing: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Detect iNES files by their header, and treat anything else as raw.
    Auto,
    /// Require an iNES file, and disassemble its PRG ROM.
    Ines,
    /// Disassemble the whole file.
    Raw,
}

impl From<FormatArg> for RomFormat {
    fn from(arg: FormatArg) -> RomFormat {
        match arg {
            FormatArg::Auto => RomFormat::Auto,
            FormatArg::Ines => RomFormat::Ines,
            FormatArg::Raw => RomFormat::Raw,
        }
    }
}

/// Parses a 16-bit address written in hex, with an optional `$` or `0x`
/// prefix.
fn parse_address(string: &str) -> Result<u16, String> {
    let digits = string
        .strip_prefix('$')
        .or_else(|| string.strip_prefix("0x"))
        .or_else(|| string.strip_prefix("0X"))
        .unwrap_or(string);
    u16::from_str_radix(digits, 16)
        .map_err(|_| format!("invalid 16-bit hex address: {string:?}"))
}

//===========================================================================//

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    )
    .init();
    let cli = Cli::parse();

    let image = {
        let path = cli.rom.display();
        let file = File::open(&cli.rom)
            .with_context(|| format!("failed to open {path}"))?;
        let reader = io::BufReader::new(file);
        RomImage::read_from(reader, cli.format.into(), cli.origin)
            .with_context(|| format!("failed to load {path}"))?
    };
    log::info!("{}: {}", cli.rom.display(), image.description());
    if let Some(vectors) = image.vectors() {
        log::info!(
            "vectors: NMI=${:04X} RESET=${:04X} IRQ=${:04X}",
            vectors.nmi,
            vectors.reset,
            vectors.irq
        );
    }

    let offset = match cli.start {
        None => 0,
        Some(addr) => match image.offset_of(addr) {
            Some(offset) => offset,
            None => bail!("start address ${addr:04X} is outside the image"),
        },
    };
    let options =
        ListingOptions { show_address: cli.listing, show_bytes: cli.listing };

    let mut writer: Box<dyn Write> = match &cli.output {
        Some(path) => {
            let file = File::create(path).with_context(|| {
                format!("failed to create {}", path.display())
            })?;
            Box::new(io::BufWriter::new(file))
        }
        None => Box::new(io::BufWriter::new(io::stdout().lock())),
    };
    let code = image.code();
    let summary =
        write_listing(&mut writer, code, image.origin(), offset, options)
            .context("failed to write listing")?;
    writer.flush().context("failed to write listing")?;

    log::info!(
        "disassembled {} bytes: {} instructions, {} undefined opcodes, {} \
         truncated",
        summary.bytes,
        summary.instructions,
        summary.undefined,
        summary.truncated
    );
    if summary.truncated > 0 {
        log::warn!("image ends in the middle of an instruction");
    }
    Ok(())
}

//===========================================================================//


//===========================================================================//
