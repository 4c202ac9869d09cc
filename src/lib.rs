pub mod freeze;
pub mod image_pipeline;
pub mod logger;
