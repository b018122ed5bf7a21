//! Mutation journal: snapshot-before-mutate and undo
//!
//! The journal records the prior state of every file a mutating tool call
//! is about to touch, and can roll the last N operations back:
//! - **Capture before mutate:** absence is a state, distinct from empty
//! - **Undo:** most-recent-first selection, oldest-first application
//! - **Directory scoping:** entries only ever restore against the exact
//!   working directory they were captured under

mod core;
mod entry;
mod store;

pub use entry::{FileState, HistoryItem, JournalEntry, UndoReport};
pub use store::EntryStore;

pub use self::core::{JournalError, MutationJournal};
