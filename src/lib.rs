pub mod cli;
pub mod config;
pub mod corpus;
pub mod distance;
mod error;
pub mod feature;
pub mod feedback;
pub mod histogram;
pub mod raster;
pub mod session;
pub mod texture;
pub mod utils;

pub use config::Opts;
pub use corpus::{Corpus, Extractor, extract_corpus};
pub use distance::{DistanceRanking, QueryMode, query};
pub use error::{Error, Result};
pub use feedback::{RelevanceSet, WeightVector, recompute_weights};
pub use raster::{RasterImage, RasterSource};
pub use session::Session;
