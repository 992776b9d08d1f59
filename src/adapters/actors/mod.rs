pub mod static_directory;
