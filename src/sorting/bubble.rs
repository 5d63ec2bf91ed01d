/*!
 * Bubble Sort
 * Pairwise-comparison in-place sort
 */

/// Sort `data` in place by repeated adjacent swaps.
///
/// Each pass only needs to reach the position of the previous pass's last
/// swap; a pass with no swaps ends the sort early.
pub fn bubble_sort<T: Ord>(data: &mut [T]) {
    let mut end = data.len();
    while end > 1 {
        let mut last_swap = 0;
        for i in 1..end {
            if data[i - 1] > data[i] {
                data.swap(i - 1, i);
                last_swap = i;
            }
        }
        end = last_swap;
    }
}
