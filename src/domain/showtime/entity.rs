use serde::{Deserialize, Serialize};

/// All screenings found for one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowtimeDay {
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub theaters: Vec<Theater>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theater {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(rename = "showing", default)]
    pub showings: Vec<Showing>,
}

/// Screenings of one format ("Standard", "IMAX", ...) in a theater
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Showing {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "time", default)]
    pub times: Vec<String>,
}

impl ShowtimeDay {
    /// Number of screenings across every theater of the day
    pub fn screening_count(&self) -> usize {
        self.theaters
            .iter()
            .flat_map(|theater| &theater.showings)
            .map(|showing| showing.times.len())
            .sum()
    }
}
