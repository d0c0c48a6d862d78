//! Adjacent-swap and removal shared by the page order engine and file queue

use crate::types::{Direction, Outcome};

/// Swap the item at `position` with its neighbour in `direction`.
///
/// A neighbour outside the list (or a position outside it) is a no-op.
pub(crate) fn swap_adjacent<T>(items: &mut [T], position: usize, direction: Direction) -> Outcome {
    let Some(target) = position.checked_add_signed(direction.offset()) else {
        return Outcome::Boundary;
    };
    if position >= items.len() || target >= items.len() {
        return Outcome::Boundary;
    }
    items.swap(position, target);
    Outcome::Applied
}

/// Remove the item at `position`, reporting `Exhausted` when the list empties
pub(crate) fn remove_at<T>(items: &mut Vec<T>, position: usize) -> (Outcome, Option<T>) {
    if position >= items.len() {
        return (Outcome::Boundary, None);
    }
    let removed = items.remove(position);
    let outcome = if items.is_empty() {
        Outcome::Exhausted
    } else {
        Outcome::Applied
    };
    (outcome, Some(removed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_at_edges_is_noop() {
        let mut items = vec![1, 2, 3];
        assert_eq!(swap_adjacent(&mut items, 0, Direction::Backward), Outcome::Boundary);
        assert_eq!(swap_adjacent(&mut items, 2, Direction::Forward), Outcome::Boundary);
        assert_eq!(swap_adjacent(&mut items, 7, Direction::Backward), Outcome::Boundary);
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_last_item_exhausts() {
        let mut items = vec!['a'];
        assert_eq!(remove_at(&mut items, 0), (Outcome::Exhausted, Some('a')));
        assert_eq!(remove_at(&mut items, 0), (Outcome::Boundary, None));
    }
}
