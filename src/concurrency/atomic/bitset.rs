//! Branded atomic bitsets.
//!
//! Backing store for the frontier, next-frontier and explored sets. The traversal
//! worker is the only writer in the serial kernels; the atomics let the optional
//! parallel push kernel claim nodes with one `fetch_or` per bit.

use core::sync::atomic::Ordering;

use super::GhostAtomicUsize;

const WORD_BITS: usize = usize::BITS as usize;

/// A branded, word-packed atomic bitset.
pub struct GhostAtomicBitset<'brand> {
    bits: usize,
    words: Vec<GhostAtomicUsize<'brand>>,
}

impl<'brand> GhostAtomicBitset<'brand> {
    /// Creates a new bitset with `bits` bits, all cleared.
    pub fn new(bits: usize) -> Self {
        let words_len = bits.div_ceil(WORD_BITS);
        let words = (0..words_len).map(|_| GhostAtomicUsize::new(0)).collect();
        Self { bits, words }
    }

    /// Number of bits.
    pub fn len_bits(&self) -> usize {
        self.bits
    }

    /// Clears all bits.
    pub fn clear_all(&self) {
        for w in &self.words {
            w.store(0, Ordering::Relaxed);
        }
    }

    /// Returns whether `bit` is set.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline]
    pub fn is_set(&self, bit: usize) -> bool {
        assert!(bit < self.bits, "bit {bit} out of bounds for {} bits", self.bits);
        let (word, mask) = bit_word_mask(bit);
        (self.words[word].load(Ordering::Relaxed) & mask) != 0
    }

    /// Sets `bit` and returns `true` iff this call observed it previously cleared.
    ///
    /// # Panics
    /// Panics if `bit >= len_bits()`.
    #[inline]
    pub fn test_and_set(&self, bit: usize, order: Ordering) -> bool {
        assert!(bit < self.bits, "bit {bit} out of bounds for {} bits", self.bits);
        let (word, mask) = bit_word_mask(bit);
        let prev = self.words[word].fetch_or(mask, order);
        (prev & mask) == 0
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.words
            .iter()
            .map(|w| w.load(Ordering::Relaxed).count_ones() as usize)
            .sum()
    }

    /// Iterates the set bits in ascending order.
    ///
    /// Words are loaded one at a time, so bits set concurrently with iteration
    /// may or may not be observed.
    pub fn iter_ones(&self) -> Ones<'_, 'brand> {
        Ones {
            words: self.words.iter(),
            base: 0,
            word: 0,
        }
    }
}

/// Iterator over the set bits of a [`GhostAtomicBitset`], in ascending order.
pub struct Ones<'a, 'brand> {
    words: core::slice::Iter<'a, GhostAtomicUsize<'brand>>,
    base: usize,
    word: usize,
}

impl Iterator for Ones<'_, '_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.word == 0 {
            self.word = self.words.next()?.load(Ordering::Relaxed);
            self.base += WORD_BITS;
        }
        let tz = self.word.trailing_zeros() as usize;
        self.word &= self.word - 1;
        Some(self.base - WORD_BITS + tz)
    }
}

impl core::fmt::Debug for GhostAtomicBitset<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GhostAtomicBitset")
            .field("bits", &self.bits)
            .field("ones", &self.count_ones())
            .finish()
    }
}

#[inline(always)]
fn bit_word_mask(bit: usize) -> (usize, usize) {
    // `usize::BITS` is a power of two, so division and modulo reduce to shifts/masks.
    (bit / WORD_BITS, 1usize << (bit % WORD_BITS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GhostToken;

    #[test]
    fn test_and_set_reports_first_visit_only() {
        GhostToken::new(|_token| {
            let bits = GhostAtomicBitset::new(130);
            assert!(bits.test_and_set(129, Ordering::Relaxed));
            assert!(!bits.test_and_set(129, Ordering::Relaxed));
            assert!(bits.is_set(129));
            assert!(!bits.is_set(128));
            assert_eq!(bits.count_ones(), 1);
        });
    }

    #[test]
    fn iter_ones_spans_word_boundaries() {
        GhostToken::new(|_token| {
            let bits = GhostAtomicBitset::new(200);
            for b in [0, 63, 64, 65, 127, 199] {
                bits.test_and_set(b, Ordering::Relaxed);
            }
            assert_eq!(bits.iter_ones().collect::<Vec<_>>(), vec![0, 63, 64, 65, 127, 199]);
            bits.clear_all();
            assert_eq!(bits.iter_ones().count(), 0);
        });
    }

    #[test]
    fn iter_ones_skips_leading_empty_words() {
        let bits = GhostAtomicBitset::new(300);
        assert_eq!(bits.iter_ones().next(), None);
        bits.test_and_set(257, Ordering::Relaxed);
        bits.test_and_set(299, Ordering::Relaxed);
        let mut ones = bits.iter_ones();
        assert_eq!(ones.next(), Some(257));
        assert_eq!(ones.next(), Some(299));
        assert_eq!(ones.next(), None);
        assert_eq!(ones.next(), None);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn is_set_checks_bounds() {
        let bits = GhostAtomicBitset::new(8);
        let _ = bits.is_set(8);
    }
}
