use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use matchpack::data::{loader, writer};
use matchpack::{load_data_pack, DataPack, SliceSpec};

#[derive(Parser)]
#[command(name = "matchpack", about = "Build and inspect relation-table data packs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pack a flat table (.csv / .json / .parquet) and save it.
    Pack {
        input: PathBuf,
        output_dir: PathBuf,
        /// Shuffle relation rows before saving.
        #[arg(long)]
        shuffle: bool,
        /// Seed for a reproducible shuffle.
        #[arg(long)]
        seed: Option<u64>,
        /// Add `length_left` / `length_right` columns.
        #[arg(long)]
        append_length: bool,
        /// Remove the `label` column.
        #[arg(long)]
        drop_label: bool,
    },
    /// Print a summary of a saved pack.
    Inspect {
        dir: PathBuf,
        /// Joined rows to show.
        #[arg(long, default_value_t = 5)]
        head: usize,
    },
    /// Write the full joined frame of a saved pack.
    Export { dir: PathBuf, output: PathBuf },
    /// Save a slice of a saved pack as a new pack.
    Select {
        dir: PathBuf,
        output_dir: PathBuf,
        #[arg(long, allow_hyphen_values = true)]
        start: Option<isize>,
        #[arg(long, allow_hyphen_values = true)]
        stop: Option<isize>,
        #[arg(long, allow_hyphen_values = true)]
        step: Option<isize>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Pack {
            input,
            output_dir,
            shuffle,
            seed,
            append_length,
            drop_label,
        } => {
            let frame = loader::load_file(&input)?;
            let mut pack = matchpack::pack(&frame).context("packing flat table")?;
            if shuffle {
                match seed {
                    Some(seed) => pack.shuffle_with(&mut StdRng::seed_from_u64(seed), true),
                    None => pack.shuffle(true),
                };
            }
            if append_length {
                pack.append_text_length(true)?;
            }
            if drop_label {
                pack.drop_label(true)?;
            }
            pack.save(&output_dir)?;
        }
        Command::Inspect { dir, head } => {
            let pack = open_pack(&dir)?;
            print_summary(&pack, head)?;
        }
        Command::Export { dir, output } => {
            let pack = open_pack(&dir)?;
            let frame = pack.frame().full()?;
            writer::write_file(&frame, &output)?;
        }
        Command::Select {
            dir,
            output_dir,
            start,
            stop,
            step,
        } => {
            let pack = open_pack(&dir)?;
            let subset = pack.select(SliceSpec::new(start, stop, step))?;
            info!("selected {} of {} rows", subset.len(), pack.len());
            subset.save(&output_dir)?;
        }
    }
    Ok(())
}

/// Load a saved pack and check its ids before use.
fn open_pack(dir: &Path) -> Result<DataPack> {
    let pack = load_data_pack(dir)?;
    pack.validate()
        .with_context(|| format!("validating pack in {}", dir.display()))?;
    Ok(pack)
}

fn print_summary(pack: &DataPack, head: usize) -> Result<()> {
    println!("rows:      {}", pack.len());
    println!("label:     {}", pack.has_label());
    println!(
        "left:      {} entities, columns {:?}",
        pack.left().len(),
        pack.left().frame().column_names()
    );
    println!(
        "right:     {} entities, columns {:?}",
        pack.right().len(),
        pack.right().frame().column_names()
    );
    let joined = pack.frame().slice(..head)?;
    println!("joined:    {:?}", joined.column_names());
    if !joined.is_empty() {
        println!("{}", writer::pretty_table(&joined, head)?);
    }
    Ok(())
}
