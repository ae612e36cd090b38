use serde::{Deserialize, Serialize};

/// A movie as returned by the metadata provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    /// Only present on the movie-by-id endpoint
    #[serde(default)]
    pub status: Option<String>,
    /// Minutes, only present on the movie-by-id endpoint
    #[serde(default)]
    pub runtime: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub job: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

impl Credits {
    /// Crew members holding a given job, e.g. "Director"
    pub fn crew_with_job<'a>(&'a self, job: &'a str) -> impl Iterator<Item = &'a CrewMember> + 'a {
        self.crew
            .iter()
            .filter(move |member| member.job.as_deref() == Some(job))
    }
}

/// A trailer, teaser or clip hosted on a video site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    #[serde(default)]
    pub name: Option<String>,
    pub key: String,
    #[serde(default)]
    pub site: Option<String>,
}

/// Everything the movie information screen shows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub movie: Movie,
    pub credits: Credits,
    pub videos: Vec<Video>,
    pub similar: Vec<Movie>,
}

/// One page of a paginated list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub page: u32,
    pub items: Vec<T>,
    /// Declared by the provider, when it declares one
    pub total_pages: Option<u32>,
}

/// The curated lists offered by the metadata provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListCategory {
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
}

impl ListCategory {
    pub const ALL: [ListCategory; 4] = [
        ListCategory::NowPlaying,
        ListCategory::Popular,
        ListCategory::TopRated,
        ListCategory::Upcoming,
    ];

    /// Path segment of the provider endpoint
    pub fn path_segment(&self) -> &'static str {
        match self {
            ListCategory::NowPlaying => "now_playing",
            ListCategory::Popular => "popular",
            ListCategory::TopRated => "top_rated",
            ListCategory::Upcoming => "upcoming",
        }
    }
}

impl std::fmt::Display for ListCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListCategory::NowPlaying => write!(f, "Now Playing"),
            ListCategory::Popular => write!(f, "Popular"),
            ListCategory::TopRated => write!(f, "Top Rated"),
            ListCategory::Upcoming => write!(f, "Upcoming"),
        }
    }
}

impl std::str::FromStr for ListCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "now_playing" => Ok(ListCategory::NowPlaying),
            "popular" => Ok(ListCategory::Popular),
            "top_rated" => Ok(ListCategory::TopRated),
            "upcoming" => Ok(ListCategory::Upcoming),
            other => Err(format!("Unknown list category: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_decodes_with_missing_optional_fields() {
        let movie: Movie = serde_json::from_str(r#"{"id": 603, "title": "The Matrix"}"#).unwrap();
        assert_eq!(movie.id, 603);
        assert_eq!(movie.title.as_deref(), Some("The Matrix"));
        assert!(movie.runtime.is_none());
    }

    #[test]
    fn test_category_parses_cli_spellings() {
        assert_eq!("now-playing".parse::<ListCategory>(), Ok(ListCategory::NowPlaying));
        assert_eq!("Top Rated".parse::<ListCategory>(), Ok(ListCategory::TopRated));
        assert!("trending".parse::<ListCategory>().is_err());
    }

    #[test]
    fn test_crew_with_job() {
        let credits = Credits {
            cast: Vec::new(),
            crew: vec![
                CrewMember { id: 1, name: Some("Lana".to_string()), job: Some("Director".to_string()) },
                CrewMember { id: 2, name: Some("Bill".to_string()), job: Some("Editor".to_string()) },
            ],
        };
        let directors: Vec<_> = credits.crew_with_job("Director").collect();
        assert_eq!(directors.len(), 1);
        assert_eq!(directors[0].id, 1);
    }
}
