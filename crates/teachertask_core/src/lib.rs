pub mod config;
pub mod day_store;
pub mod error;
pub mod extract;
pub mod feedback;
pub mod history_view;
pub mod model;
pub mod notify;
pub mod rank;
pub mod storage;
