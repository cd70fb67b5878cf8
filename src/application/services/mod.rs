pub mod request_adapter;
pub mod search_coordinator;
pub mod search_history_service;
pub mod search_params_codec;
pub mod search_service;
