use crate::new_types::index_tuple::IndexTuple;
use crate::new_types::twobit::revcmp;
use crate::scanner::HashScanner;
use crate::tally::Tally;
use crate::template::Template;
use clap::ValueEnum;
use smallvec::SmallVec;

type Scanners<'a> = SmallVec<[HashScanner<'a>; 8]>;

/// Orientation(s) of the read to search for the template.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
    /// forward first, the reverse complement only if that gave no match.
    Both,
}

/// How reads are searched. `mismatches` is the number of substitutions
/// allowed in each region, constant or variable. With `use_first` the
/// leftmost acceptable offset wins, otherwise the offset with the fewest
/// mismatches in total, and a read where two offsets tie with different
/// barcodes is not counted.
#[derive(new, Copy, Clone, Debug, PartialEq, Eq)]
pub struct MatchOptions {
    pub strand: Strand,
    pub mismatches: usize,
    pub use_first: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions::new(Strand::Forward, 0, true)
    }
}

impl From<Strand> for MatchOptions {
    fn from(strand: Strand) -> Self {
        MatchOptions {
            strand,
            ..MatchOptions::default()
        }
    }
}

fn scanners<'a>(read: &'a [u8], starts: &[usize], lengths: &[usize]) -> Scanners<'a> {
    starts
        .iter()
        .zip(lengths)
        .map(|(&start, &len)| HashScanner::new(read, start, len))
        .collect()
}

/// Leftmost offset where every constant region equals its template sequence
/// and every variable region is in its vocabulary, as barcode indices.
pub fn match_read(read: &[u8], template: &Template) -> Option<IndexTuple> {
    let total_len = template.total_len();
    if read.len() < total_len {
        return None;
    }
    let mut constant_scan = scanners(read, template.constant_starts(), template.constant_lengths());
    let mut variable_scan = scanners(read, template.variable_starts(), template.variable_lengths());

    // the current template window is read[end - total_len..end]
    let mut end = total_len;
    loop {
        let is_valid = constant_scan.iter().all(HashScanner::valid)
            && variable_scan.iter().all(HashScanner::valid);

        if is_valid
            && constant_scan
                .iter()
                .zip(template.constant_hashes())
                .all(|(scan, hash)| scan.hash() == hash)
        {
            let found: Option<IndexTuple> = variable_scan
                .iter()
                .zip(template.variable_vocabs())
                .map(|(scan, voc)| voc.lookup(scan.hash()))
                .collect();
            if let Some(tuple) = found {
                dbg_print!("match at offset {}: {:?}", end - total_len, tuple);
                return Some(tuple);
            }
        }
        if end >= read.len() {
            return None;
        }
        for scan in constant_scan.iter_mut().chain(variable_scan.iter_mut()) {
            scan.advance();
        }
        end += 1;
    }
}

/// Barcode indices of the current window and its total number of mismatches,
/// if every region is within `max` and no variable region is ambiguous.
fn score_window(
    constant_scan: &[HashScanner],
    variable_scan: &[HashScanner],
    template: &Template,
    max: usize,
) -> Option<(usize, IndexTuple)> {
    let mut score = 0;
    for (scan, hash) in constant_scan.iter().zip(template.constant_hashes()) {
        let mm = scan.hash().mismatches(hash);
        if mm > max {
            return None;
        }
        score += mm;
    }
    let tuple = variable_scan
        .iter()
        .zip(template.variable_vocabs())
        .map(|(scan, voc)| {
            let (idx, mm) = voc.lookup_within(scan.hash(), max)?;
            score += mm;
            Some(idx)
        })
        .collect::<Option<IndexTuple>>()?;
    Some((score, tuple))
}

/// As `match_read`, allowing substitutions and choosing between offsets as
/// `opts` says. The strand of `opts` is not used here.
pub fn match_read_with(read: &[u8], template: &Template, opts: MatchOptions) -> Option<IndexTuple> {
    if opts.mismatches == 0 && opts.use_first {
        return match_read(read, template);
    }
    let total_len = template.total_len();
    if read.len() < total_len {
        return None;
    }
    let mut constant_scan = scanners(read, template.constant_starts(), template.constant_lengths());
    let mut variable_scan = scanners(read, template.variable_starts(), template.variable_lengths());

    let mut best: Option<(usize, IndexTuple)> = None;
    let mut ambiguous = false;
    let mut end = total_len;
    loop {
        if let Some((score, tuple)) =
            score_window(&constant_scan, &variable_scan, template, opts.mismatches)
        {
            dbg_print!("offset {}: {:?}, {} mismatches", end - total_len, tuple, score);
            if opts.use_first {
                return Some(tuple);
            }
            if best.as_ref().map_or(true, |(b, _)| score < *b) {
                best = Some((score, tuple));
                ambiguous = false;
            } else if let Some((b, t)) = &best {
                if score == *b && tuple != *t {
                    ambiguous = true;
                }
            }
        }
        if end >= read.len() {
            break;
        }
        for scan in constant_scan.iter_mut().chain(variable_scan.iter_mut()) {
            scan.advance();
        }
        end += 1;
    }
    if ambiguous {
        None
    } else {
        best.map(|(_, tuple)| tuple)
    }
}

/// Count the leftmost match of the read, if any. Returns whether it matched.
pub fn match_and_tally(read: &[u8], template: &Template, tally: &mut Tally) -> bool {
    match match_read(read, template) {
        Some(tuple) => {
            tally.increment(tuple);
            true
        }
        None => false,
    }
}

/// As `match_read_with`, searching the orientation(s) of `opts`.
pub fn search_read(read: &[u8], template: &Template, opts: MatchOptions) -> Option<IndexTuple> {
    match opts.strand {
        Strand::Forward => match_read_with(read, template, opts),
        Strand::Reverse => match_read_with(&revcmp(read), template, opts),
        Strand::Both => match_read_with(read, template, opts)
            .or_else(|| match_read_with(&revcmp(read), template, opts)),
    }
}

/// As `match_and_tally`, searching as `opts` says. A read is counted at most
/// once.
pub fn tally_read(read: &[u8], template: &Template, opts: MatchOptions, tally: &mut Tally) -> bool {
    match search_read(read, template, opts) {
        Some(tuple) => {
            tally.increment(tuple);
            true
        }
        None => false,
    }
}
