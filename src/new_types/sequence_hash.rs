use super::twobit::ThreeBit;
use arrayvec::ArrayVec;
use std::fmt;

/// Longest constant region or barcode that can be encoded.
pub const MAX_SEQ_LEN: usize = 256;

const BASES_PER_WORD: usize = 32;
const SEQ_WORDS: usize = MAX_SEQ_LEN / BASES_PER_WORD;
const MASK_WORDS: usize = MAX_SEQ_LEN / 64;
const EVEN_BITS: u64 = 0x5555_5555_5555_5555;

/// Fixed length DNA fingerprint. Base `i` occupies two bits at `2 * i` of the
/// multi-word number `b2`, bases other than A, C, G or T have their bit set in
/// `n_mask` instead. Bits beyond `len` are always zero, so equality and order
/// depend only on the encoded bases.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SequenceHash {
    b2: ArrayVec<u64, SEQ_WORDS>,
    n_mask: ArrayVec<u64, MASK_WORDS>,
    len: usize,
}

/// shift a little endian multi-word number right.
#[inline(always)]
fn shift_words(words: &mut [u64], bits: u32) {
    for i in 0..words.len() {
        let carry = words.get(i + 1).map_or(0, |w| w << (64 - bits));
        words[i] = (words[i] >> bits) | carry;
    }
}

/// bit `i` of `m` moves to bit `2 * i`.
#[inline(always)]
fn spread_even(m: u32) -> u64 {
    let mut x = u64::from(m);
    x = (x | (x << 16)) & 0x0000_FFFF_0000_FFFF;
    x = (x | (x << 8)) & 0x00FF_00FF_00FF_00FF;
    x = (x | (x << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
    x = (x | (x << 2)) & 0x3333_3333_3333_3333;
    (x | (x << 1)) & EVEN_BITS
}

impl SequenceHash {
    /// All A, for `len` bases.
    fn zeroed(len: usize) -> Self {
        SequenceHash {
            b2: (0..len.div_ceil(BASES_PER_WORD)).map(|_| 0).collect(),
            n_mask: (0..len.div_ceil(64)).map(|_| 0).collect(),
            len,
        }
    }

    /// Encodes a sequence, or `None` if it is longer than `MAX_SEQ_LEN`.
    pub fn new(seq: &[u8]) -> Option<Self> {
        if seq.len() <= MAX_SEQ_LEN {
            Some(SequenceHash::from_bytes(seq))
        } else {
            None
        }
    }

    /// Encodes all of `seq`. Any byte other than upper case A, C, G or T is
    /// stored as an N, so it can never equal a hash without an N there.
    ///
    /// # Panics
    ///
    /// If `seq` is longer than `MAX_SEQ_LEN`.
    pub fn from_bytes(seq: &[u8]) -> Self {
        assert!(seq.len() <= MAX_SEQ_LEN, "sequence of {} bases", seq.len());
        let mut hash = SequenceHash::zeroed(seq.len());
        for (i, &b) in seq.iter().enumerate() {
            hash.set(i, ThreeBit::from(b));
        }
        hash
    }

    /// Position `i` must still be zeroed.
    #[inline(always)]
    fn set(&mut self, i: usize, base: ThreeBit) {
        match base.as_twobit_if_not_n() {
            Some(b2) => {
                let shift = ((i % BASES_PER_WORD) * 2) as u32;
                self.b2[i / BASES_PER_WORD] |= b2.as_word_bits(shift);
            }
            None => self.n_mask[i / 64] |= 1_u64 << (i % 64),
        }
    }

    /// Drops the first base and appends `base` at the end. Returns whether the
    /// dropped base was an N.
    #[inline]
    pub(crate) fn roll(&mut self, base: ThreeBit) -> bool {
        if self.len == 0 {
            return false;
        }
        let leaving_n = self.n_mask[0] & 1 != 0;
        shift_words(&mut self.b2, 2);
        shift_words(&mut self.n_mask, 1);
        self.set(self.len - 1, base);
        leaving_n
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of bases that are not A, C, G or T.
    pub fn n_count(&self) -> usize {
        self.n_mask.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Substitutions between two hashes of equal length. An N on either side
    /// is always a mismatch, also against another N.
    pub fn mismatches(&self, other: &SequenceHash) -> usize {
        debug_assert_eq!(self.len, other.len);
        self.b2
            .iter()
            .zip(&other.b2)
            .enumerate()
            .map(|(i, (a, b))| {
                let x = a ^ b;
                let differ = (x | (x >> 1)) & EVEN_BITS;
                let n = (self.n_mask[i / 2] | other.n_mask[i / 2]) >> ((i % 2) * 32);
                (differ | spread_even(n as u32)).count_ones() as usize
            })
            .sum()
    }

    fn base_at(&self, i: usize) -> u8 {
        if self.n_mask[i / 64] & (1_u64 << (i % 64)) != 0 {
            b'N'
        } else {
            let code = (self.b2[i / BASES_PER_WORD] >> ((i % BASES_PER_WORD) * 2)) & 3;
            b"ACTG"[code as usize]
        }
    }
}

impl fmt::Display for SequenceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let seq: String = (0..self.len).map(|i| self.base_at(i) as char).collect();
        f.write_str(&seq)
    }
}

impl fmt::Debug for SequenceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SequenceHash({}, len {})", self, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{thread_rng, Rng};

    fn random_seq(len: usize, with_n: bool) -> Vec<u8> {
        let mut rng = thread_rng();
        let alphabet: &[u8] = if with_n { b"ACGTNacgt" } else { b"ACGT" };
        (0..len)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect()
    }

    #[test]
    fn equality() {
        assert_eq!(
            SequenceHash::from_bytes(b"GATTACA"),
            SequenceHash::from_bytes(b"GATTACA")
        );
        assert_ne!(
            SequenceHash::from_bytes(b"GATTACA"),
            SequenceHash::from_bytes(b"GATTACC")
        );
        // A and N share the two bit code, the mask tells them apart.
        assert_ne!(
            SequenceHash::from_bytes(b"GATTACA"),
            SequenceHash::from_bytes(b"GATTACN")
        );
        // trailing A's are zero bits, but length differs.
        assert_ne!(
            SequenceHash::from_bytes(b"GATTACA"),
            SequenceHash::from_bytes(b"GATTACAA")
        );
        assert_ne!(SequenceHash::from_bytes(b"acgt"), SequenceHash::from_bytes(b"ACGT"));
    }
    #[test]
    fn display() {
        let seq = random_seq(MAX_SEQ_LEN, false);
        let hash = SequenceHash::from_bytes(&seq);
        assert_eq!(hash.to_string().as_bytes(), &seq[..]);
        assert_eq!(SequenceHash::from_bytes(b"ACgTN").to_string(), "ACNTN");
        assert_eq!(SequenceHash::from_bytes(b"ACgTN").n_count(), 2);
    }
    #[test]
    fn too_long() {
        assert!(SequenceHash::new(&random_seq(MAX_SEQ_LEN, false)).is_some());
        assert!(SequenceHash::new(&random_seq(MAX_SEQ_LEN + 1, false)).is_none());
    }
    #[test]
    fn roll_matches_fresh_encoding() {
        let mut rng = thread_rng();
        for len in [0, 1, 5, 31, 32, 33, 64, 65, 100, MAX_SEQ_LEN] {
            let read = random_seq(len + rng.gen_range(1..80), true);
            let mut hash = SequenceHash::from_bytes(&read[..len]);
            let mut n = hash.n_count();
            for o in 1..=(read.len() - len) {
                if len > 0 {
                    let leaving_n = hash.roll(ThreeBit::from(read[o + len - 1]));
                    n = n + usize::from(ThreeBit::from(read[o + len - 1]).is_n())
                        - usize::from(leaving_n);
                }
                let fresh = SequenceHash::from_bytes(&read[o..o + len]);
                assert_eq!(hash, fresh, "len {} offset {}", len, o);
                assert_eq!(n, fresh.n_count());
            }
        }
    }
    #[test]
    fn hamming() {
        let mm = |a: &[u8], b: &[u8]| {
            SequenceHash::from_bytes(a).mismatches(&SequenceHash::from_bytes(b))
        };
        assert_eq!(mm(b"GATTACA", b"GATTACA"), 0);
        assert_eq!(mm(b"GATTACA", b"CATTACG"), 2);
        assert_eq!(mm(b"GATTACA", b"GATNACA"), 1);
        assert_eq!(mm(b"GANTACA", b"GANTACA"), 1);
        assert_eq!(mm(b"", b""), 0);

        let mut rng = thread_rng();
        for len in [1, 31, 32, 33, 63, 64, 65, 130, MAX_SEQ_LEN] {
            let a = random_seq(len, true);
            let mut b = a.clone();
            for _ in 0..rng.gen_range(0..len) {
                let i = rng.gen_range(0..len);
                b[i] = b"ACGTN"[rng.gen_range(0..5)];
            }
            let naive = a
                .iter()
                .zip(&b)
                .filter(|&(&x, &y)| {
                    x != y || ThreeBit::from(x).is_n() || ThreeBit::from(y).is_n()
                })
                .count();
            assert_eq!(mm(&a, &b), naive, "len {}", len);
        }
    }
    #[test]
    fn total_order() {
        let mut hashes: Vec<_> = (0..50)
            .map(|_| SequenceHash::from_bytes(&random_seq(40, true)))
            .collect();
        hashes.sort();
        for w in hashes.windows(2) {
            assert!(w[0] <= w[1]);
        }
    }
}
