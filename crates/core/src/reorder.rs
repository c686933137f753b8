//! Drag-and-drop reordering of list items (course videos, blog blocks).

use crate::error::CoreError;

/// Move the item at `from` so it ends up at index `to`, shifting the items
/// in between.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> Result<(), CoreError> {
    let len = items.len();
    if from >= len || to >= len {
        return Err(CoreError::InvalidInput(format!(
            "cannot move item {from} to {to} in a list of {len}"
        )));
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    Ok(())
}

/// Apply a drop of the `active` item onto the `over` item, both addressed by
/// id. Returns whether the list changed.
///
/// Dropping outside any item (`over == None`) or onto itself is a no-op.
pub fn move_by_id<T, K, F>(items: &mut Vec<T>, active: &K, over: Option<&K>, id: F) -> bool
where
    K: PartialEq,
    F: Fn(&T) -> &K,
{
    let Some(over) = over else {
        return false;
    };
    if active == over {
        return false;
    }
    let from = items.iter().position(|item| id(item) == active);
    let to = items.iter().position(|item| id(item) == over);
    match (from, to) {
        (Some(from), Some(to)) => move_item(items, from, to).is_ok(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_forward() {
        let mut v = vec!['a', 'b', 'c', 'd'];
        move_item(&mut v, 0, 2).unwrap();
        assert_eq!(v, vec!['b', 'c', 'a', 'd']);
    }

    #[test]
    fn move_backward() {
        let mut v = vec!['a', 'b', 'c', 'd'];
        move_item(&mut v, 3, 1).unwrap();
        assert_eq!(v, vec!['a', 'd', 'b', 'c']);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let mut v = vec![1, 2];
        assert!(move_item(&mut v, 0, 5).is_err());
        assert_eq!(v, vec![1, 2]);
    }

    #[test]
    fn drop_by_id() {
        let mut v = vec![(10, "intro"), (11, "basics"), (12, "advanced")];
        assert!(move_by_id(&mut v, &12, Some(&10), |item| &item.0));
        assert_eq!(v.iter().map(|i| i.0).collect::<Vec<_>>(), vec![12, 10, 11]);
    }

    #[test]
    fn drop_outside_or_on_self_is_noop() {
        let mut v = vec![(1, ()), (2, ())];
        assert!(!move_by_id(&mut v, &1, None, |item| &item.0));
        assert!(!move_by_id(&mut v, &1, Some(&1), |item| &item.0));
        assert!(!move_by_id(&mut v, &1, Some(&9), |item| &item.0));
        assert_eq!(v, vec![(1, ()), (2, ())]);
    }
}
