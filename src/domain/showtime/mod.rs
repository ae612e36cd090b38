pub mod entity;

pub use entity::{Showing, ShowtimeDay, Theater};
