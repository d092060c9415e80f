pub mod listing;
pub mod normalize;
pub mod params;
