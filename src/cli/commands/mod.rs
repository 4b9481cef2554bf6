mod build;
mod chunk;
mod config;
mod verify;

pub use build::BuildArgs;
pub use chunk::{ChunkArgs, SegmentArgs};
pub use config::ConfigCommand;
pub use verify::VerifyArgs;

pub use build::handle_build;
pub use chunk::handle_chunk;
pub use config::handle_config;
pub use verify::handle_verify;
