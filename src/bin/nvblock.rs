//! nvblock CLI
//!
//! Inspect and prepare EEPROM image files laid out by nvblock.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Args as ClapArgs, Parser, Subcommand};
use nvblock::{Block, BlockParams, Config, FileMedium, Header, Layout, Manager, Status, Version};
use tracing_subscriber::{fmt, EnvFilter};

/// nvblock image tool
#[derive(Parser, Debug)]
#[command(name = "nvblock")]
#[command(about = "Inspect and format nvblock EEPROM images")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Block layout shared by every subcommand
#[derive(ClapArgs, Debug)]
struct LayoutArgs {
    /// Application block sizes in bytes, in registration order
    #[arg(short, long, value_delimiter = ',', required = true)]
    blocks: Vec<usize>,

    /// Layout carries a header CRC and per-block CRC tags
    #[arg(long)]
    crc_field: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the offset of every block
    Layout {
        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Decode the header and block params of an image
    Inspect {
        /// Image file
        image: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Run startup against an image, migrating it if needed
    Format {
        /// Image file (created if missing)
        image: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,

        /// Schema version to stamp (major.minor.patch)
        #[arg(short = 'v', long, default_value = "0.0.1")]
        schema_version: Version,

        /// Image size in bytes (defaults to the laid-out size)
        #[arg(short, long)]
        size: Option<usize>,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,nvblock=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Layout { layout } => print_layout(&layout),
        Commands::Inspect { image, layout } => inspect(&image, &layout),
        Commands::Format {
            image,
            layout,
            schema_version,
            size,
        } => format_image(&image, &layout, schema_version, size),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        process::exit(1);
    }
}

/// Payload lengths in registration order, header first
fn lengths(args: &LayoutArgs) -> Vec<usize> {
    let layout = Layout::new(args.crc_field);
    std::iter::once(layout.header_payload_size())
        .chain(args.blocks.iter().copied())
        .collect()
}

fn print_layout(args: &LayoutArgs) -> nvblock::Result<()> {
    let layout = Layout::new(args.crc_field);
    let lengths = lengths(args);

    println!("{:>5}  {:>6}  {:>6}  {:>6}", "index", "offset", "len", "params");
    for (index, len) in lengths.iter().enumerate() {
        let offset = layout.offset_of(lengths.iter().copied(), index);
        println!("{:>5}  {:>6}  {:>6}  {:>6}", index, offset, len, offset + len);
    }
    println!("total: {} bytes", layout.offset_of(lengths.iter().copied(), lengths.len()));

    Ok(())
}

fn inspect(image: &Path, args: &LayoutArgs) -> nvblock::Result<()> {
    let layout = Layout::new(args.crc_field);
    let lengths = lengths(args);
    let bytes = std::fs::read(image)?;

    let header = Header::decode(&bytes, layout);
    println!(
        "header: version {} (trusted {}), status {:?}, crc {:08x}",
        header.version,
        header.trusted_version(),
        header.status,
        header.crc
    );

    for (index, len) in lengths.iter().enumerate() {
        let offset = layout.offset_of(lengths.iter().copied(), index);
        let params_at = offset + len;
        let params = bytes
            .get(params_at..params_at + layout.params_size())
            .and_then(|raw| BlockParams::decode(raw, layout));

        match params {
            Some(p) => println!(
                "block {:>3} @ {:>5}: status {:?}, policy {:?}, crc {:?}, cycle {} ms",
                index, offset, p.status, p.write_policy, p.crc, p.cycle_time
            ),
            None => println!("block {:>3} @ {:>5}: params unreadable", index, offset),
        }
    }

    Ok(())
}

fn format_image(image: &Path, args: &LayoutArgs, version: Version, size: Option<usize>) -> nvblock::Result<()> {
    let layout = Layout::new(args.crc_field);
    let total = layout.offset_of(lengths(args), args.blocks.len() + 1);
    let size = size.unwrap_or(total);
    if size < total {
        return Err(nvblock::NvError::Config(format!(
            "image size {} is smaller than the layout ({} bytes)",
            size, total
        )));
    }

    let config = Config::builder()
        .expected_version(version)
        .crc_field(args.crc_field)
        .blocks(
            args.blocks
                .iter()
                .enumerate()
                .map(|(i, &len)| Block::zeroed(format!("block{}", i + 1), len)),
        )
        .build();

    tracing::info!("Formatting {} ({} bytes, version {})", image.display(), size, version);

    let mut manager = Manager::new(FileMedium::new(image, size), config)?;
    match manager.begin() {
        Status::Ok => {
            let header = manager.header();
            println!("{}: ok, version {}", image.display(), header.version);
            Ok(())
        }
        status => Err(nvblock::NvError::Config(format!(
            "startup ended with status {:?}",
            status
        ))),
    }
}
