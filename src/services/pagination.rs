/// Slices `items` into the `[skip, skip + limit)` window and returns it together
/// with the total before slicing. Out of range `skip` yields an empty window and
/// a zero `limit` is treated as one.
pub fn paginate<T: Clone>(items: &[T], skip: usize, limit: usize) -> (Vec<T>, usize) {
    let total = items.len();
    let start = skip.min(total);
    let end = start.saturating_add(limit.max(1)).min(total);

    (items[start..end].to_vec(), total)
}
