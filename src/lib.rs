pub mod archive;
pub mod builder;
pub mod config;
pub mod installer;
pub mod package_data;
pub mod platform;
pub mod project;
pub mod runner;
pub mod setup_py;
pub mod stage;
pub mod wheel;
