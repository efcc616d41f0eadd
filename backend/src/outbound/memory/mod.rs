//! In-memory stores implementing the persistence ports.
//!
//! Each store keeps its rows in a `BTreeMap` behind a `tokio::sync::RwLock`
//! and hands out monotonically increasing integer ids starting at 1. Ids are
//! never reused after a delete.

mod comments;
mod tickets;
mod users;

pub use comments::InMemoryCommentRepository;
pub use tickets::InMemoryTicketRepository;
pub use users::InMemoryUserRepository;

use std::collections::BTreeMap;

/// Rows plus the id sequence.
#[derive(Debug)]
struct Table<T> {
    next_id: i64,
    rows: BTreeMap<i64, T>,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

impl<T> Table<T> {
    fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn replace(&mut self, id: i64, row: T) -> bool {
        match self.rows.get_mut(&id) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }
}
