//! Bundled dataset loading and train/test splitting.
//!
//! Ships the classic Iris measurements as a compiled-in CSV asset, parses
//! and validates them on load, and provides a seeded shuffled train/test
//! split over the resulting [`Dataset`].

mod dataset;
mod error;
mod iris;
mod split;

pub use dataset::Dataset;
pub use error::DataError;
pub use iris::load_iris;
pub use split::TrainTestSplit;
