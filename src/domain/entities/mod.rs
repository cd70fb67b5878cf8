pub mod search_configuration;
pub mod search_history;
