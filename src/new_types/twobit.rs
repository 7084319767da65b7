use std::fmt;

lazy_static! {
    /// Code per input byte. Only upper case A, C, T and G are valid.
    static ref BASE_CODE: [ThreeBit; 256] = {
        let mut code = [ThreeBit(N_CODE); 256];
        code[b'A' as usize] = ThreeBit(0);
        code[b'C' as usize] = ThreeBit(1);
        code[b'T' as usize] = ThreeBit(2);
        code[b'G' as usize] = ThreeBit(3);
        code
    };
}

const N_CODE: u8 = 0x7;

/// Twobits may be unexpected: N: 0x7, A: 0x0, C: 0x1, T: 0x2, G: 0x3
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct ThreeBit(u8);

/// No N, 2 bits for code, same as above.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct TwoBit(u8);

impl ThreeBit {
    pub fn as_twobit_if_not_n(&self) -> Option<TwoBit> {
        if self.0 < 4 {
            Some(TwoBit(self.0))
        } else {
            None
        }
    }
    pub fn is_n(&self) -> bool {
        self.0 >= 4
    }
}

impl TwoBit {
    pub(crate) fn as_word_bits(&self, shift: u32) -> u64 {
        u64::from(self.0) << shift
    }
    /// A <-> T and C <-> G, the xor trick works because of the code order.
    pub fn complement(&self) -> TwoBit {
        TwoBit(self.0 ^ 2)
    }
    pub fn as_base(&self) -> u8 {
        b"ACTG"[usize::from(self.0 & 3)]
    }
}

impl From<u8> for ThreeBit {
    fn from(base: u8) -> ThreeBit {
        BASE_CODE[usize::from(base)]
    }
}

impl fmt::Debug for TwoBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_base() as char, self.0)
    }
}

impl fmt::Debug for ThreeBit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_twobit_if_not_n() {
            Some(b2) => fmt::Debug::fmt(&b2, f),
            None => write!(f, "N ({})", self.0),
        }
    }
}

/// Reverse complement of a read. Anything not A, C, G or T becomes an N.
pub fn revcmp(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&b| {
            ThreeBit::from(b)
                .as_twobit_if_not_n()
                .map_or(b'N', |b2| b2.complement().as_base())
        })
        .collect()
}

/// true if every byte is an upper case A, C, G or T.
pub fn is_acgt(seq: &[u8]) -> bool {
    seq.iter().all(|&b| !ThreeBit::from(b).is_n())
}
