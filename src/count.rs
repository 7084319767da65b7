use crate::count_threads::{count_reads, MatchStats};
use crate::matcher::{MatchOptions, Strand};
use crate::tally::Tally;
use crate::template::Template;
use crate::vocabulary::Vocabulary;
use anyhow::{anyhow, ensure, Context, Result};
use bincode::{deserialize_from, serialize_into};
use clap::Args;
use flate2::bufread::MultiGzDecoder;
use log::info;
use noodles_fasta as fasta;
use noodles_fastq as fastq;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct CountCmd {
    /// Reads, FASTQ or FASTA (.fa, .fasta, .fna), optionally gzipped
    #[arg(short, long, value_name = "READS", required = true)]
    input: PathBuf,

    /// Constant region, in template order. One more than barcode files.
    #[arg(short, long = "constant", value_name = "SEQ", required = true)]
    constants: Vec<String>,

    /// Barcodes for a variable region, in template order. Headerless csv:
    /// sequence and an optional name.
    #[arg(short, long = "barcodes", value_name = "CSV", required = true)]
    barcodes: Vec<PathBuf>,

    /// Orientation of the template in the reads
    #[arg(short, long, value_enum, default_value_t = Strand::Forward)]
    strand: Strand,

    /// Substitutions allowed in each constant and variable region
    #[arg(short, long, default_value = "0")]
    mismatches: usize,

    /// Take the leftmost match. If false, the match with the fewest
    /// mismatches, and reads where different matches tie are not counted
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    use_first: bool,

    /// Number of counting threads
    #[arg(short, long, default_value = "1")]
    threads: usize,

    /// Output table, stdout if not given
    #[arg(short, long, value_name = "TSV")]
    output: Option<PathBuf>,

    /// Also store the tally, for a later merge
    #[arg(long, value_name = "FILE")]
    tally: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MergeCmd {
    /// Tallies stored by count
    #[arg(value_name = "TALLY", required = true)]
    tallies: Vec<PathBuf>,

    /// Barcodes for a variable region, as given to count
    #[arg(short, long = "barcodes", value_name = "CSV", required = true)]
    barcodes: Vec<PathBuf>,

    /// Output table, stdout if not given
    #[arg(short, long, value_name = "TSV")]
    output: Option<PathBuf>,
}

fn is_gzipped(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

fn is_fasta(path: &Path) -> bool {
    let path = if is_gzipped(path) {
        Path::new(path.file_stem().unwrap_or_default())
    } else {
        path
    };
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| matches!(ext, "fa" | "fasta" | "fna"))
}

pub fn open_input(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)
        .map(BufReader::new)
        .with_context(|| format!("Error opening {:?}", path))?;
    Ok(if is_gzipped(path) {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(file)
    })
}

/// One vocabulary per file, each line a barcode and an optional name.
pub fn read_vocabulary(path: &Path) -> Result<Vocabulary> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(open_input(path)?);
    let mut entries = Vec::new();
    for result in rdr.records() {
        let rec = result?;
        let seq = rec.get(0).unwrap_or("").trim();
        if seq.is_empty() {
            continue;
        }
        let name = rec
            .get(1)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);
        entries.push((seq.to_string(), name));
    }
    Vocabulary::build_named(entries).with_context(|| format!("Error in barcodes {:?}", path))
}

fn read_vocabularies(paths: &[PathBuf]) -> Result<Vec<Vocabulary>> {
    paths.iter().map(|p| read_vocabulary(p)).collect()
}

/// Tally the reads of a FASTQ or FASTA file.
pub fn count_file(
    path: &Path,
    template: &Template,
    opts: MatchOptions,
    ct: usize,
) -> Result<(Tally, MatchStats)> {
    let input = open_input(path)?;
    if is_fasta(path) {
        let mut reader = fasta::Reader::new(input);
        let reads = reader
            .records()
            .map(|res| -> Result<Vec<u8>> { Ok(res?.sequence().as_ref().to_vec()) });
        count_reads(reads, template, opts, ct)
    } else {
        let mut reader = fastq::Reader::new(input);
        let reads = reader
            .records()
            .map(|res| -> Result<Vec<u8>> { Ok(res?.sequence().to_vec()) });
        count_reads(reads, template, opts, ct)
    }
}

/// Tab separated: count, then a 1-based index and a barcode name per variable
/// region. Rows in ascending order of indices.
pub fn write_table<W: Write>(out: W, tally: &Tally, vocabs: &[Vocabulary]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);

    let mut header = vec!["count".to_string()];
    for j in 1..=vocabs.len() {
        header.push(format!("index_{}", j));
        header.push(format!("barcode_{}", j));
    }
    wtr.write_record(&header)?;

    for (tuple, ct) in tally {
        ensure!(
            tuple.len() == vocabs.len(),
            "tally has {} barcodes per combination, but {} barcode files were given",
            tuple.len(),
            vocabs.len()
        );
        let mut row = vec![ct.to_string()];
        for (&idx, voc) in tuple.iter().zip(vocabs) {
            let name = voc
                .name(idx as usize)
                .ok_or_else(|| anyhow!("barcode index {} beyond {} barcodes", idx, voc.len()))?;
            row.push((idx + 1).to_string());
            row.push(name.to_string());
        }
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_output(output: Option<PathBuf>, tally: &Tally, vocabs: &[Vocabulary]) -> Result<()> {
    match output {
        Some(path) => {
            info!("Writing {:?}", path);
            write_table(BufWriter::new(File::create(path)?), tally, vocabs)
        }
        None => write_table(io::stdout().lock(), tally, vocabs),
    }
}

pub fn save_tally(path: &Path, tally: &Tally) -> Result<()> {
    ensure!(!path.exists(), "{path:?} already exists!");
    serialize_into(BufWriter::new(File::create(path)?), tally)?;
    Ok(())
}

pub fn load_tally(path: &Path) -> Result<Tally> {
    let file = File::open(path)
        .map(BufReader::new)
        .with_context(|| format!("Error opening tally {:?}", path))?;
    Ok(deserialize_from(file)?)
}

pub fn count(cmd: CountCmd) -> Result<()> {
    if let Some(path) = &cmd.tally {
        ensure!(!path.exists(), "{path:?} already exists!");
    }
    let vocabs = read_vocabularies(&cmd.barcodes)?;
    let template = Template::build(&cmd.constants, vocabs)?;
    info!(
        "Template of {} bases with {} variable regions",
        template.total_len(),
        template.nvariable()
    );
    let opts = MatchOptions::new(cmd.strand, cmd.mismatches, cmd.use_first);
    info!("Reading {:?} using {} threads, {:?}", cmd.input, cmd.threads, opts);

    let (tally, stats) = count_file(&cmd.input, &template, opts, cmd.threads)?;
    info!(
        "{} of {} reads matched, {} distinct combinations",
        stats.matched,
        stats.reads,
        tally.len()
    );
    if let Some(path) = &cmd.tally {
        info!("Storing tally in {:?}", path);
        save_tally(path, &tally)?;
    }
    write_output(cmd.output, &tally, template.variable_vocabs())
}

pub fn merge(cmd: MergeCmd) -> Result<()> {
    let vocabs = read_vocabularies(&cmd.barcodes)?;
    let mut tally = Tally::new();
    for path in &cmd.tallies {
        info!("Merging {:?}", path);
        tally.merge(load_tally(path)?);
    }
    info!(
        "{} matched reads, {} distinct combinations",
        tally.total(),
        tally.len()
    );
    write_output(cmd.output, &tally, &vocabs)
}
