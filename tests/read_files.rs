use combocount::count::{count_file, load_tally, read_vocabulary, save_tally, write_table};
use combocount::{MatchOptions, Strand, Template, Vocabulary};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;
use std::path::PathBuf;
use tempfile::{Builder, NamedTempFile, TempDir};

fn barcode_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn vocabs(dir: &TempDir) -> Vec<Vocabulary> {
    let first = barcode_file(dir, "first.csv", "CCC,guide_c\nGGG,guide_g\n\n");
    let second = barcode_file(dir, "second.csv", "AAA\nTTT\n");
    vec![
        read_vocabulary(&first).unwrap(),
        read_vocabulary(&second).unwrap(),
    ]
}

fn template(dir: &TempDir) -> Template {
    Template::build(&["AA", "GG", "TT"], vocabs(dir)).unwrap()
}

const READS: [&str; 4] = [
    "AACCCGGAAATT",
    "AAGGGGGTTTTT",
    "AACNCGGAAATT",
    "AACCCGGAAATT",
];

fn fastq(reads: &[&str]) -> String {
    reads
        .iter()
        .enumerate()
        .map(|(i, r)| format!("@r{}\n{}\n+\n{}\n", i, r, "I".repeat(r.len())))
        .collect()
}

#[test]
fn barcode_names() {
    let dir = TempDir::new().unwrap();
    let v = vocabs(&dir);
    assert_eq!(v[0].len(), 2);
    assert_eq!(v[0].name(1), Some("guide_g"));
    assert_eq!(v[1].name(1), Some("TTT"));
}

#[test]
fn count_fastq_with_mismatches() {
    let dir = TempDir::new().unwrap();
    let t = template(&dir);
    let mut fq = Builder::new().suffix(".fq").tempfile().unwrap();
    write!(fq, "{}", fastq(&READS)).unwrap();
    fq.flush().unwrap();

    let opts = MatchOptions::new(Strand::Forward, 1, true);
    let (tally, stats) = count_file(fq.path(), &t, opts, 2).unwrap();
    assert_eq!(stats.matched, 4);
    let exp = tally.export(2);
    assert_eq!(exp.counts, vec![3, 1]);
    assert_eq!(exp.columns, vec![vec![0, 1], vec![0, 1]]);
}

#[test]
fn bad_barcode_file() {
    let dir = TempDir::new().unwrap();
    let path = barcode_file(&dir, "dup.csv", "ACGT\nACGT\n");
    let err = read_vocabulary(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("duplicate barcode ACGT"));
}

#[test]
fn count_fastq() {
    let dir = TempDir::new().unwrap();
    let t = template(&dir);
    let mut fq = Builder::new().suffix(".fastq").tempfile().unwrap();
    write!(fq, "{}", fastq(&READS)).unwrap();
    fq.flush().unwrap();

    let (tally, stats) = count_file(fq.path(), &t, Strand::Forward.into(), 1).unwrap();
    assert_eq!(stats.reads, 4);
    assert_eq!(stats.matched, 3);
    let exp = tally.export(2);
    assert_eq!(exp.counts, vec![2, 1]);
    assert_eq!(exp.columns, vec![vec![0, 1], vec![0, 1]]);

    let mut table = Vec::new();
    write_table(&mut table, &tally, t.variable_vocabs()).unwrap();
    assert_eq!(
        String::from_utf8(table).unwrap(),
        "count\tindex_1\tbarcode_1\tindex_2\tbarcode_2\n\
         2\t1\tguide_c\t1\tAAA\n\
         1\t2\tguide_g\t2\tTTT\n"
    );
}

#[test]
fn count_gzipped_fasta_reverse() {
    let dir = TempDir::new().unwrap();
    let t = template(&dir);
    let path = dir.path().join("reads.fa.gz");
    let mut gz = GzEncoder::new(std::fs::File::create(&path).unwrap(), Compression::default());
    // reverse complements of READS
    for (i, r) in ["AATTTCCGGGTT", "AAAAACCCCCTT", "AATTTCCGNGTT"].iter().enumerate() {
        writeln!(gz, ">r{}\n{}", i, r).unwrap();
    }
    gz.finish().unwrap();

    let (tally, stats) = count_file(&path, &t, Strand::Reverse.into(), 2).unwrap();
    assert_eq!(stats.reads, 3);
    assert_eq!(stats.matched, 2);
    assert_eq!(tally.export(2).counts, vec![1, 1]);

    let (fwd, _) = count_file(&path, &t, Strand::Forward.into(), 2).unwrap();
    assert!(fwd.is_empty());
}

#[test]
fn stored_tallies_merge() {
    let dir = TempDir::new().unwrap();
    let t = template(&dir);
    let mut tallies = Vec::new();
    for part in [&READS[..2], &READS[2..]] {
        let mut fq = Builder::new().suffix(".fq").tempfile().unwrap();
        write!(fq, "{}", fastq(part)).unwrap();
        fq.flush().unwrap();
        tallies.push(count_file(fq.path(), &t, Strand::Forward.into(), 1).unwrap().0);
    }
    let stored = dir.path().join("part.tally");
    save_tally(&stored, &tallies[0]).unwrap();
    // refuses to overwrite.
    assert!(save_tally(&stored, &tallies[0]).is_err());

    let mut merged = load_tally(&stored).unwrap();
    assert_eq!(merged, tallies[0]);
    merged.merge(tallies.pop().unwrap());

    let mut all = NamedTempFile::new().unwrap();
    write!(all, "{}", fastq(&READS)).unwrap();
    all.flush().unwrap();
    let (whole, _) = count_file(all.path(), &t, Strand::Forward.into(), 3).unwrap();
    assert_eq!(merged, whole);
}

#[test]
fn missing_input() {
    let dir = TempDir::new().unwrap();
    let t = template(&dir);
    assert!(count_file(&dir.path().join("absent.fq"), &t, Strand::Both.into(), 1).is_err());
}
