use serde::{Deserialize, Serialize};

/// One of the two per-user movie lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieList {
    Watched,
    ToWatch,
}

impl MovieList {
    pub const ALL: [MovieList; 2] = [MovieList::Watched, MovieList::ToWatch];

    /// Name of the array field in the user document
    pub fn field_name(&self) -> &'static str {
        match self {
            MovieList::Watched => "moviesWatched",
            MovieList::ToWatch => "moviesToWatch",
        }
    }

    /// Stable key used by the local snapshot tables
    pub fn storage_key(&self) -> &'static str {
        match self {
            MovieList::Watched => "watched",
            MovieList::ToWatch => "to_watch",
        }
    }
}

impl std::fmt::Display for MovieList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MovieList::Watched => write!(f, "watched"),
            MovieList::ToWatch => write!(f, "to watch"),
        }
    }
}

/// A reference to a movie inside one of the user lists.
///
/// Review fields are only ever set on watched entries. The remote store
/// compares whole values for array-remove, so `None` is kept as an explicit
/// null instead of being skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieEntry {
    pub movie_id: i64,
    #[serde(default)]
    pub review_score: Option<u8>,
    #[serde(default)]
    pub review_description: Option<String>,
}

impl MovieEntry {
    /// Entry for the watched list, carrying the user's review
    pub fn watched(movie_id: i64, review_score: Option<u8>, review_description: Option<String>) -> Self {
        Self {
            movie_id,
            review_score,
            review_description,
        }
    }

    /// Entry for the to-watch list (never reviewed)
    pub fn to_watch(movie_id: i64) -> Self {
        Self {
            movie_id,
            review_score: None,
            review_description: None,
        }
    }

    pub fn has_review(&self) -> bool {
        self.review_score.is_some() || self.review_description.is_some()
    }
}

/// A user document as stored remotely
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// Opaque identity issued by the auth primitive (the document id)
    #[serde(default)]
    pub id: String,

    pub username: String,

    #[serde(default)]
    pub is_private: bool,

    #[serde(default)]
    pub movies_watched: Vec<MovieEntry>,

    #[serde(default)]
    pub movies_to_watch: Vec<MovieEntry>,
}

impl UserRecord {
    /// Fresh record created on registration: empty lists, public
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            is_private: false,
            movies_watched: Vec::new(),
            movies_to_watch: Vec::new(),
        }
    }

    pub fn list(&self, list: MovieList) -> &[MovieEntry] {
        match list {
            MovieList::Watched => &self.movies_watched,
            MovieList::ToWatch => &self.movies_to_watch,
        }
    }

    pub fn list_mut(&mut self, list: MovieList) -> &mut Vec<MovieEntry> {
        match list {
            MovieList::Watched => &mut self.movies_watched,
            MovieList::ToWatch => &mut self.movies_to_watch,
        }
    }

    pub fn contains_movie(&self, list: MovieList, movie_id: i64) -> bool {
        self.list(list).iter().any(|entry| entry.movie_id == movie_id)
    }

    /// Keeps the first occurrence of each movie id in both lists.
    /// Returns the ids that were dropped, per list.
    pub fn collapse_duplicates(&mut self) -> Vec<(MovieList, i64)> {
        let mut dropped = Vec::new();
        for list in MovieList::ALL {
            let mut seen = std::collections::HashSet::new();
            self.list_mut(list).retain(|entry| {
                if seen.insert(entry.movie_id) {
                    true
                } else {
                    dropped.push((list, entry.movie_id));
                    false
                }
            });
        }
        dropped
    }

    /// Copy of this record as other users are allowed to see it.
    /// Private users expose no lists.
    pub fn public_view(&self) -> Option<UserRecord> {
        if self.is_private {
            None
        } else {
            Some(self.clone())
        }
    }
}
