pub mod local_ranking;
