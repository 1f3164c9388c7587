pub mod config;
pub mod render;
pub mod run;
pub mod timer;
