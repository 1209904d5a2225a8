pub mod history_store;
mod slot;

pub use slot::{FileSlot, HistorySlot, MemorySlot};
