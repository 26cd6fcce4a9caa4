pub mod catalog_loader;
pub mod posters;
pub mod recommender;

pub use posters::PosterResolver;
pub use recommender::Recommender;
