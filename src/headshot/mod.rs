pub mod client;
pub mod colors;
pub mod files;
pub mod prompts;
pub mod studio;

#[cfg(test)]
pub(crate) mod testing;

pub use client::TransformationClient;
pub use studio::Studio;
