//! Sort keys and directions accepted by the library listing.

use serde::{Deserialize, Serialize};

/// Library sort key.
///
/// `ReleasedAt`, `CreatedAt` and `Pages` are evaluated by storage. `Title`
/// (natural order) and `Random` (seeded shuffle) are evaluated in memory
/// after the matching IDs have been fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sort {
    #[default]
    ReleasedAt,
    CreatedAt,
    Title,
    Pages,
    Random,
}

impl Sort {
    /// Every accepted sort key.
    pub const ALL: [Sort; 5] = [
        Sort::ReleasedAt,
        Sort::CreatedAt,
        Sort::Title,
        Sort::Pages,
        Sort::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReleasedAt => "released_at",
            Self::CreatedAt => "created_at",
            Self::Title => "title",
            Self::Pages => "pages",
            Self::Random => "random",
        }
    }

    /// Whether storage can order by this key directly.
    pub fn is_native(&self) -> bool {
        matches!(self, Self::ReleasedAt | Self::CreatedAt | Self::Pages)
    }
}

impl std::fmt::Display for Sort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sort {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "released_at" => Ok(Self::ReleasedAt),
            "created_at" => Ok(Self::CreatedAt),
            "title" => Ok(Self::Title),
            "pages" => Ok(Self::Pages),
            "random" => Ok(Self::Random),
            _ => Err(format!("Invalid sort: {}", s)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Order {
    Asc,
    #[default]
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// SQL keyword for this direction.
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, Self::Desc)
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Order {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(format!("Invalid order: {}", s)),
        }
    }
}
