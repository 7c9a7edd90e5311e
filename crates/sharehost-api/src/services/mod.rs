pub mod file_lifecycle;
