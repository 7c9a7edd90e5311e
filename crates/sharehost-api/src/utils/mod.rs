pub mod html;
pub mod upload;
