// Each thread counts into its own tally, merged pairwise when the reads run out.

use crate::matcher::{tally_read, MatchOptions};
use crate::tally::Tally;
use crate::template::Template;
use anyhow::{anyhow, ensure, Result};
use crossbeam_channel::{bounded, Receiver, Sender};
use itertools::Itertools;
use std::ops::AddAssign;

const BATCH_SIZE: usize = 4096;

type Batch = Vec<Vec<u8>>;

#[derive(new, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub reads: u64,
    pub matched: u64,
}

impl AddAssign for MatchStats {
    fn add_assign(&mut self, other: MatchStats) {
        self.reads += other.reads;
        self.matched += other.matched;
    }
}

struct ReadCounter<'a> {
    template: &'a Template,
    opts: MatchOptions,
    tally: Tally,
    stats: MatchStats,
}

impl<'a> ReadCounter<'a> {
    fn new(template: &'a Template, opts: MatchOptions) -> Self {
        ReadCounter {
            template,
            opts,
            tally: Tally::new(),
            stats: MatchStats::default(),
        }
    }
    fn count(&mut self, read: &[u8]) {
        self.stats.reads += 1;
        if tally_read(read, self.template, self.opts, &mut self.tally) {
            self.stats.matched += 1;
        }
    }
    fn work(mut self, rx: Receiver<Batch>) -> (Tally, MatchStats) {
        for batch in rx {
            for read in &batch {
                self.count(read);
            }
        }
        (self.tally, self.stats)
    }
}

fn merge(mut a: (Tally, MatchStats), b: (Tally, MatchStats)) -> (Tally, MatchStats) {
    a.0.merge(b.0);
    a.1 += b.1;
    a
}

fn send_batches<I>(reads: I, tx: &Sender<Batch>) -> Result<()>
where
    I: IntoIterator<Item = Result<Vec<u8>>>,
{
    let mut batch = Vec::with_capacity(BATCH_SIZE);
    for read in reads {
        batch.push(read?);
        if batch.len() == BATCH_SIZE {
            let full = std::mem::replace(&mut batch, Vec::with_capacity(BATCH_SIZE));
            tx.send(full)
                .map_err(|_| anyhow!("counting threads have hung up"))?;
        }
    }
    if !batch.is_empty() {
        tx.send(batch)
            .map_err(|_| anyhow!("counting threads have hung up"))?;
    }
    Ok(())
}

/// Tally all reads with `ct` threads. The result does not depend on `ct`.
pub fn count_reads<I>(
    reads: I,
    template: &Template,
    opts: MatchOptions,
    ct: usize,
) -> Result<(Tally, MatchStats)>
where
    I: IntoIterator<Item = Result<Vec<u8>>>,
{
    ensure!(ct > 0, "at least one counting thread is required");
    if ct == 1 {
        let mut counter = ReadCounter::new(template, opts);
        for read in reads {
            counter.count(&read?);
        }
        return Ok((counter.tally, counter.stats));
    }

    crossbeam::scope(|s| {
        let (tx, rx) = bounded::<Batch>(ct * 2);
        let threads: Vec<_> = (0..ct)
            .map(|nr| {
                let rx = rx.clone();
                s.spawn(move |_| {
                    let res = ReadCounter::new(template, opts).work(rx);
                    dbg_print!("thread {} counted {} reads", nr, res.1.reads);
                    res
                })
            })
            .collect();
        drop(rx);

        let sent = send_batches(reads, &tx);
        // close the channel so the threads finish.
        drop(tx);

        let results = threads
            .into_iter()
            .map(|t| t.join().map_err(|_| anyhow!("counting thread panicked")))
            .collect::<Result<Vec<_>>>()?;
        sent?;

        Ok(results
            .into_iter()
            .tree_fold1(merge)
            .unwrap_or_default())
    })
    .map_err(|_| anyhow!("counting thread panicked"))?
}
