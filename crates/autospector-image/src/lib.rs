pub mod acquire;
pub mod camera;
pub mod export;
pub mod thumbnail;

mod error;

pub use error::AcquisitionError;
