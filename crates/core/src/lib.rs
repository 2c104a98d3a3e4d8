pub mod config;
pub mod product;
pub mod rules;
pub mod sample;

pub use config::Config;
pub use product::*;
pub use rules::*;
pub use sample::Sampler;
