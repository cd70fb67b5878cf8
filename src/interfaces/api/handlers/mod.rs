pub mod history_handler;
pub mod search_handler;
