pub mod client;

pub use client::SerpApiClient;
