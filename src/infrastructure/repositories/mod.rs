pub mod file_kv_store;
pub mod memory_kv_store;
