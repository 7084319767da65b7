use crate::error::ComboError;
use crate::new_types::sequence_hash::{SequenceHash, MAX_SEQ_LEN};
use crate::new_types::twobit::is_acgt;
use ahash::AHashMap;
use log::warn;

#[derive(new, Clone, Debug, PartialEq, Eq)]
pub struct Barcode {
    pub sequence: String,
    pub name: Option<String>,
}

/// The barcodes that may occupy one variable region, all of one length.
#[derive(Clone, Debug)]
pub struct Vocabulary {
    index: AHashMap<SequenceHash, u32>,
    barcodes: Vec<Barcode>,
    seq_len: usize,
}

impl Vocabulary {
    /// Indices follow the order of `barcodes`.
    pub fn build<S: AsRef<[u8]>>(barcodes: &[S]) -> Result<Self, ComboError> {
        Vocabulary::build_named(barcodes.iter().map(|b| (b, None)))
    }

    /// As `build`, with an optional name per barcode.
    pub fn build_named<S, I>(entries: I) -> Result<Self, ComboError>
    where
        S: AsRef<[u8]>,
        I: IntoIterator<Item = (S, Option<String>)>,
    {
        let mut index = AHashMap::new();
        let mut barcodes = Vec::new();
        let mut seq_len = None;

        for (i, (seq, name)) in entries.into_iter().enumerate() {
            let seq = seq.as_ref();
            let sequence = String::from_utf8_lossy(seq).into_owned();
            let expected = *seq_len.get_or_insert(seq.len());
            if seq.len() != expected {
                return Err(ComboError::NonUniformVocabulary {
                    index: i,
                    sequence,
                    found: seq.len(),
                    expected,
                });
            }
            let hash = SequenceHash::new(seq).ok_or_else(|| ComboError::SequenceTooLong {
                region: format!("barcode {} ({})", i, sequence),
                len: seq.len(),
            })?;
            if !is_acgt(seq) {
                warn!("barcode {} ({}) contains bases other than ACGT and will never match", i, sequence);
            }
            if let Some(&first) = index.get(&hash) {
                return Err(ComboError::DuplicateVocabularyEntry {
                    sequence,
                    first: first as usize,
                    second: i,
                });
            }
            index.insert(hash, i as u32);
            barcodes.push(Barcode::new(sequence, name));
        }
        let seq_len = seq_len.ok_or(ComboError::EmptyVocabulary)?;
        dbg_print!("vocabulary of {} barcodes, length {}", barcodes.len(), seq_len);
        debug_assert!(seq_len <= MAX_SEQ_LEN);

        Ok(Vocabulary {
            index,
            barcodes,
            seq_len,
        })
    }

    #[inline]
    pub fn lookup(&self, hash: &SequenceHash) -> Option<u32> {
        self.index.get(hash).copied()
    }

    /// The closest barcode within `max` substitutions and its distance. `None`
    /// if there is none, or if two barcodes are equally close.
    pub fn lookup_within(&self, hash: &SequenceHash, max: usize) -> Option<(u32, usize)> {
        if let Some(idx) = self.lookup(hash) {
            return Some((idx, 0));
        }
        if max == 0 {
            return None;
        }
        let mut best = None;
        let mut ambiguous = false;
        for (barcode, &idx) in &self.index {
            let mm = hash.mismatches(barcode);
            if mm > max {
                continue;
            }
            match best {
                Some((_, b)) if mm == b => ambiguous = true,
                Some((_, b)) if mm > b => {}
                _ => {
                    best = Some((idx, mm));
                    ambiguous = false;
                }
            }
        }
        if ambiguous {
            None
        } else {
            best
        }
    }

    /// The length shared by all barcodes.
    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    pub fn len(&self) -> usize {
        self.barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }

    pub fn barcode(&self, idx: usize) -> Option<&Barcode> {
        self.barcodes.get(idx)
    }

    pub fn sequence(&self, idx: usize) -> Option<&str> {
        self.barcode(idx).map(|b| b.sequence.as_str())
    }

    /// The name if one was given, otherwise the sequence.
    pub fn name(&self, idx: usize) -> Option<&str> {
        self.barcode(idx)
            .map(|b| b.name.as_deref().unwrap_or(b.sequence.as_str()))
    }
}
