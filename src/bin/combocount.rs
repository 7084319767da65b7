extern crate combocount;

// target/release/combocount count -i reads.fq.gz -c ACGT -c GGA -c TTCA -b guides1.csv -b guides2.csv -t 8 -o counts.tsv

use anyhow::Result;
use clap::{Parser, Subcommand};
use combocount::count;
use env_logger::Env;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count barcode combinations in reads
    Count(count::CountCmd),

    /// Merge stored tallies into one count table
    Merge(count::MergeCmd),
}

/// Count combinatorial barcodes between constant regions of reads
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Combocount {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let combocount = Combocount::parse();

    match combocount.command {
        Commands::Count(count_cmd) => count::count(count_cmd),
        Commands::Merge(merge_cmd) => count::merge(merge_cmd),
    }
}
