pub mod files;
pub mod login;
pub mod root;
pub mod upload;
pub mod users;
pub mod view;
