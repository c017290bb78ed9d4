pub mod static_source;
