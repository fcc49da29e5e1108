/// Move the selection cursor by a signed step, wrapping at both ends.
///
/// An empty list keeps the cursor at 0.
pub fn step_wrapping(selected: usize, step: i32, item_count: usize) -> usize {
    if item_count == 0 {
        return 0;
    }
    let count = item_count as i64;
    (selected as i64 + step as i64).rem_euclid(count) as usize
}

/// Smallest scroll change that keeps `selected` inside a window of
/// `visible` rows starting at `offset`, clamped to the list length.
pub fn scroll_to_show(selected: usize, offset: usize, visible: usize, item_count: usize) -> usize {
    let visible = visible.max(1);
    if item_count <= visible {
        return 0;
    }

    let offset = if selected < offset {
        selected
    } else if selected >= offset + visible {
        selected + 1 - visible
    } else {
        offset
    };

    offset.min(item_count - visible)
}
