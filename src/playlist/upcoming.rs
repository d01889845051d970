use crate::sequence::SequenceIterator;

/// Derivation state for the play queue.
///
/// The playlist's membership is a manual prefix (`manual_len` entries the
/// user queued explicitly, consumed front-first and never regenerated)
/// followed by a lookahead tail enumerated from the borrowed sequence
/// iterator. The tail is filled once when a seed is installed; the manual
/// prefix always wins.
#[derive(Debug)]
pub struct UpcomingList {
    manual_len: usize,
    lookahead: usize,
    seed: Option<SequenceIterator>,
    needs_fill: bool,
}

impl UpcomingList {
    pub(crate) fn new(lookahead: usize) -> Self {
        Self {
            manual_len: 0,
            lookahead,
            seed: None,
            needs_fill: false,
        }
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Number of entries at the front that were queued explicitly.
    pub fn manual_len(&self) -> usize {
        self.manual_len
    }

    pub(crate) fn set_manual_len(&mut self, len: usize) {
        self.manual_len = len;
    }

    /// The iterator borrowed from the sequence manager while this queue is
    /// the active override, if any.
    pub fn seed(&self) -> Option<&SequenceIterator> {
        self.seed.as_ref()
    }

    pub(crate) fn set_seed(&mut self, seed: SequenceIterator) {
        self.seed = Some(seed);
        self.needs_fill = true;
    }

    /// True until the lookahead tail has been filled from the current seed.
    pub(crate) fn needs_fill(&self) -> bool {
        self.needs_fill
    }

    pub(crate) fn mark_filled(&mut self) {
        self.needs_fill = false;
    }

    pub(crate) fn take_seed(&mut self) -> Option<SequenceIterator> {
        self.seed.take()
    }
}
