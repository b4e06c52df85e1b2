//! Hydrator: puts fetched records back into page-window order.

use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::models::Identified;

/// Reorder `records` to match `window` position for position.
///
/// Storage returns hydrated rows in arbitrary order. Every window ID must
/// have exactly one record and no record may fall outside the window;
/// anything else is a consistency error, never a silent drop.
pub fn reorder_to_window<T: Identified>(records: Vec<T>, window: &[i64]) -> Result<Vec<T>> {
    let positions: HashMap<i64, usize> = window
        .iter()
        .enumerate()
        .map(|(pos, id)| (*id, pos))
        .collect();
    let mut slots: Vec<Option<T>> = std::iter::repeat_with(|| None).take(window.len()).collect();

    for record in records {
        let id = record.id();
        let pos = *positions.get(&id).ok_or_else(|| {
            Error::Consistency(format!("hydrated record {} is not in the page window", id))
        })?;
        if slots[pos].is_some() {
            return Err(Error::Consistency(format!(
                "gallery {} was hydrated more than once",
                id
            )));
        }
        slots[pos] = Some(record);
    }

    slots
        .into_iter()
        .zip(window)
        .map(|(slot, id)| {
            slot.ok_or_else(|| {
                Error::Consistency(format!("gallery {} in the page window was not hydrated", id))
            })
        })
        .collect()
}
