/// The largest capacity [`calc_capacity()`] hands out unless asked for more.
pub const MAX_CAPACITY: usize = 2_146_435_071;

/// Capacity steps, each roughly 1.5 times the previous one, so growing collections land on a
/// small set of array lengths and therefore share array pools.
const CAPACITY_STEPS: [usize; 34] = [
    11, 19, 37, 73, 109, 163, 251, 367, 557, 823, 1237, 1861, 2777, 4177, 6247, 9371, 14057,
    21089, 31627, 47431, 71143, 106721, 160073, 240101, 360163, 540217, 810343, 1215497, 1823231,
    2734867, 4102283, 6153409, 9230113, 13845163,
];

const LARGEST_STEP: usize = 13_845_163;

/// Picks the capacity to allocate for a collection that must hold at least `size` elements.
///
/// The result is always at least `size`. Sizes up to the largest step round up to the nearest
/// step; beyond that, capacities are multiples of the largest step, capped at [`MAX_CAPACITY`]
/// unless `size` itself is larger.
///
/// # Example
///
/// ```rust
/// use reuse_pool::calc_capacity;
///
/// assert_eq!(calc_capacity(0), 11);
/// assert_eq!(calc_capacity(11), 11);
/// assert_eq!(calc_capacity(12), 19);
/// ```
#[must_use]
pub fn calc_capacity(size: usize) -> usize {
    if let Some(&step) = CAPACITY_STEPS.iter().find(|&&step| step >= size) {
        return step;
    }

    let multiple = size
        .checked_div(LARGEST_STEP)
        .and_then(|factor| factor.checked_add(1))
        .and_then(|factor| factor.checked_mul(LARGEST_STEP))
        .filter(|&capacity| capacity <= MAX_CAPACITY);

    multiple.unwrap_or_else(|| size.max(MAX_CAPACITY))
}
