use crate::error::ComboError;
use crate::new_types::sequence_hash::SequenceHash;
use crate::new_types::twobit::is_acgt;
use crate::vocabulary::Vocabulary;
use log::warn;

/// Read layout `C0 V0 C1 V1 .. V(n-1) Cn` of constant regions and variable
/// regions, with offsets relative to the start of the template.
#[derive(Clone, Debug)]
pub struct Template {
    constant_hashes: Vec<SequenceHash>,
    constant_lengths: Vec<usize>,
    constant_starts: Vec<usize>,
    variable_vocabs: Vec<Vocabulary>,
    variable_lengths: Vec<usize>,
    variable_starts: Vec<usize>,
    total_len: usize,
}

impl Template {
    pub fn build<S: AsRef<[u8]>>(
        constants: &[S],
        variables: Vec<Vocabulary>,
    ) -> Result<Self, ComboError> {
        let nvariable = variables.len();
        if constants.len() != nvariable + 1 {
            return Err(ComboError::ShapeMismatch {
                constants: constants.len(),
                variables: nvariable,
            });
        }
        let constant_hashes = constants
            .iter()
            .enumerate()
            .map(|(j, con)| {
                let con = con.as_ref();
                if !is_acgt(con) {
                    warn!(
                        "constant region {} ({}) contains bases other than ACGT, no read will match",
                        j,
                        String::from_utf8_lossy(con)
                    );
                }
                SequenceHash::new(con).ok_or_else(|| ComboError::SequenceTooLong {
                    region: format!("constant region {}", j),
                    len: con.len(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let constant_lengths: Vec<usize> = constant_hashes.iter().map(|h| h.len()).collect();
        let variable_lengths: Vec<usize> = variables.iter().map(|v| v.seq_len()).collect();

        let mut constant_starts = vec![0; nvariable + 1];
        let mut variable_starts = vec![0; nvariable];
        let mut total_len = constant_lengths[0];
        for j in 0..nvariable {
            variable_starts[j] = total_len;
            total_len += variable_lengths[j];
            constant_starts[j + 1] = total_len;
            total_len += constant_lengths[j + 1];
        }
        dbg_print!(
            "template: constants at {:?}, variables at {:?}, length {}",
            constant_starts,
            variable_starts,
            total_len
        );

        Ok(Template {
            constant_hashes,
            constant_lengths,
            constant_starts,
            variable_vocabs: variables,
            variable_lengths,
            variable_starts,
            total_len,
        })
    }

    pub fn nvariable(&self) -> usize {
        self.variable_vocabs.len()
    }
    pub fn nconstant(&self) -> usize {
        self.constant_hashes.len()
    }
    pub fn total_len(&self) -> usize {
        self.total_len
    }
    pub fn constant_hashes(&self) -> &[SequenceHash] {
        &self.constant_hashes
    }
    pub fn constant_lengths(&self) -> &[usize] {
        &self.constant_lengths
    }
    pub fn constant_starts(&self) -> &[usize] {
        &self.constant_starts
    }
    pub fn variable_vocabs(&self) -> &[Vocabulary] {
        &self.variable_vocabs
    }
    pub fn variable_lengths(&self) -> &[usize] {
        &self.variable_lengths
    }
    pub fn variable_starts(&self) -> &[usize] {
        &self.variable_starts
    }
}
