pub mod http_search_client;
