use crate::new_types::sequence_hash::SequenceHash;
use crate::new_types::twobit::ThreeBit;

/// Rolling hash over the window `[offset, offset + len)` of a read.
#[derive(Clone)]
pub struct HashScanner<'a> {
    seq: &'a [u8],
    offset: usize,
    hash: SequenceHash,
    n_count: usize,
}

impl<'a> HashScanner<'a> {
    /// Snapshot of the initial window. `offset + len` must not exceed the read.
    pub fn new(seq: &'a [u8], offset: usize, len: usize) -> Self {
        let hash = SequenceHash::from_bytes(&seq[offset..offset + len]);
        let n_count = hash.n_count();
        HashScanner {
            seq,
            offset,
            hash,
            n_count,
        }
    }

    /// true if the window holds only A, C, G and T.
    #[inline(always)]
    pub fn valid(&self) -> bool {
        self.n_count == 0
    }

    /// The current window. Only meaningful for matching while `valid()`.
    #[inline(always)]
    pub fn hash(&self) -> &SequenceHash {
        &self.hash
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Shift the window one base to the right, or return false, with the
    /// window unchanged, if it already ends at the end of the read.
    #[inline]
    pub fn advance(&mut self) -> bool {
        let len = self.hash.len();
        let Some(&b) = self.seq.get(self.offset + len) else {
            return false;
        };
        if len != 0 {
            let base = ThreeBit::from(b);
            if self.hash.roll(base) {
                self.n_count -= 1;
            }
            if base.is_n() {
                self.n_count += 1;
            }
        }
        self.offset += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows() {
        let read = b"ACGTNACGTA";
        let mut scan = HashScanner::new(read, 1, 3);
        let mut seen = vec![];
        loop {
            assert_eq!(
                scan.hash(),
                &SequenceHash::from_bytes(&read[scan.offset()..scan.offset() + 3])
            );
            seen.push((scan.offset(), scan.valid()));
            if !scan.advance() {
                break;
            }
        }
        assert_eq!(
            seen,
            vec![
                (1, true),
                (2, false),
                (3, false),
                (4, false),
                (5, true),
                (6, true),
                (7, true)
            ]
        );
    }
    #[test]
    fn lower_case_is_invalid() {
        let mut scan = HashScanner::new(b"aCGT", 0, 2);
        assert!(!scan.valid());
        assert!(scan.advance());
        assert!(scan.valid());
        assert_eq!(scan.hash(), &SequenceHash::from_bytes(b"CG"));
    }
    #[test]
    fn empty_window() {
        let mut scan = HashScanner::new(b"NN", 0, 0);
        assert!(scan.valid());
        assert!(scan.advance());
        assert!(scan.advance());
        assert!(!scan.advance());
        assert_eq!(scan.offset(), 2);
        assert!(scan.valid());
    }
}
