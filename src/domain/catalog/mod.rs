pub mod entity;

pub use entity::{CastMember, Credits, CrewMember, ListCategory, Movie, MovieDetails, Page, Video};
