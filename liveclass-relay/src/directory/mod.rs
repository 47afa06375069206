mod class_directory;

pub use class_directory::*;
