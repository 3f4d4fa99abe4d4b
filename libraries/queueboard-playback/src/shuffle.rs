//! Shuffle views over a queue's canonical order
//!
//! A shuffle view is a permutation of canonical indices rather than a copy of
//! the tracks, so turning shuffle off always restores the exact insertion
//! order.

use rand::seq::SliceRandom;
use rand::Rng;

/// Build a uniformly random permutation of `0..len`
///
/// When `pinned` names a valid canonical index it is placed at position 0 and
/// only the remaining indices are shuffled (Fisher-Yates via
/// `SliceRandom::shuffle`). Enabling shuffle therefore never moves playback
/// away from the current track.
pub fn pinned_permutation<R: Rng + ?Sized>(
    len: usize,
    pinned: Option<usize>,
    rng: &mut R,
) -> Vec<usize> {
    match pinned.filter(|&index| index < len) {
        Some(pin) => {
            let mut rest: Vec<usize> = (0..len).filter(|&i| i != pin).collect();
            rest.shuffle(rng);

            let mut order = Vec::with_capacity(len);
            order.push(pin);
            order.extend(rest);
            order
        }
        None => {
            let mut order: Vec<usize> = (0..len).collect();
            order.shuffle(rng);
            order
        }
    }
}

/// Insert freshly appended canonical indices into an existing shuffle view
///
/// Each new index lands at a random position strictly after `cursor`, so
/// newly added tracks are mixed into the part of the queue that has not been
/// played yet.
pub fn scatter_upcoming<R: Rng + ?Sized>(
    order: &mut Vec<usize>,
    new_indices: impl IntoIterator<Item = usize>,
    cursor: Option<usize>,
    rng: &mut R,
) {
    let first_free = cursor.map_or(0, |c| c + 1);
    for index in new_indices {
        let position = rng.gen_range(first_free.min(order.len())..=order.len());
        order.insert(position, index);
    }
}

/// Where canonical index `index` ends up after moving `from` to `to`
pub fn index_after_move(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < to && index > from && index <= to {
        index - 1
    } else if to < from && index >= to && index < from {
        index + 1
    } else {
        index
    }
}

/// Check that `order` contains every index in `0..len` exactly once
pub fn is_permutation(order: &[usize], len: usize) -> bool {
    if order.len() != len {
        return false;
    }

    let mut seen = vec![false; len];
    for &index in order {
        match seen.get_mut(index) {
            Some(slot) if !*slot => *slot = true,
            _ => return false,
        }
    }
    true
}
