/*!
 * Quicksort
 * In-place partition sort with pluggable pivot selection
 */

use rand::Rng;

/// How the pivot element is chosen for each partition step.
///
/// Every strategy yields the same sorted result; they differ only in how
/// they degrade on adversarial inputs (`First`/`Last` go quadratic on
/// presorted data, `Random` does not).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotStrategy {
    First,
    Last,
    Middle,
    Random,
}

/// Sort `data` in place.
pub fn quick_sort<T: Ord>(data: &mut [T], strategy: PivotStrategy) {
    if data.len() < 2 {
        return;
    }
    let pivot = select_pivot(data.len(), strategy);
    let split = partition(data, pivot);
    let (low, high) = data.split_at_mut(split);
    quick_sort(low, strategy);
    quick_sort(&mut high[1..], strategy);
}

fn select_pivot(len: usize, strategy: PivotStrategy) -> usize {
    match strategy {
        PivotStrategy::First => 0,
        PivotStrategy::Last => len - 1,
        PivotStrategy::Middle => len / 2,
        PivotStrategy::Random => rand::thread_rng().gen_range(0..len),
    }
}

/// Lomuto partition around the element at `pivot`; returns the pivot's
/// final index.
fn partition<T: Ord>(data: &mut [T], pivot: usize) -> usize {
    let last = data.len() - 1;
    data.swap(pivot, last);
    let mut store = 0;
    for i in 0..last {
        if data[i] <= data[last] {
            data.swap(i, store);
            store += 1;
        }
    }
    data.swap(store, last);
    store
}
