pub mod news;
pub mod params;
