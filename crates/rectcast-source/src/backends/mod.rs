pub mod image_dir;
pub mod mock;
