use serde::{Deserialize, Serialize};
use std::fmt;

/// 每次執行重新產生，整筆寫入資料庫
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryStats {
    pub movies: u64,
    pub tv_shows: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    Movie,
    Show,
    Artist,
    Photo,
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryKind::Movie => f.write_str("movie"),
            LibraryKind::Show => f.write_str("show"),
            LibraryKind::Artist => f.write_str("artist"),
            LibraryKind::Photo => f.write_str("photo"),
            LibraryKind::Other(tag) => f.write_str(tag),
        }
    }
}

/// `GET /library/sections` 回傳的 Directory 項目
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LibrarySection {
    pub key: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: LibraryKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryFilter {
    pub name: String,
    pub kind: LibraryKind,
}

impl LibraryFilter {
    pub fn new(name: impl Into<String>, kind: LibraryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// 名稱必須完全相同 (區分大小寫) 且類型一致
    pub fn matches(&self, section: &LibrarySection) -> bool {
        section.title == self.name && section.kind == self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, kind: LibraryKind) -> LibrarySection {
        LibrarySection {
            key: "1".to_string(),
            title: title.to_string(),
            kind,
        }
    }

    #[test]
    fn test_stats_serialize_with_remote_field_names() {
        let stats = LibraryStats {
            movies: 120,
            tv_shows: 45,
        };
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(value, serde_json::json!({"movies": 120, "tvShows": 45}));
        assert_eq!(LibraryStats::default(), LibraryStats { movies: 0, tv_shows: 0 });
    }

    #[test]
    fn test_section_kind_parsing() {
        let sections: Vec<LibrarySection> = serde_json::from_value(serde_json::json!([
            {"key": "1", "title": "Movies", "type": "movie"},
            {"key": "2", "title": "TV Shows", "type": "show"},
            {"key": "3", "title": "Audiobooks", "type": "audiobook"}
        ]))
        .unwrap();

        assert_eq!(sections[0].kind, LibraryKind::Movie);
        assert_eq!(sections[1].kind, LibraryKind::Show);
        assert_eq!(sections[2].kind, LibraryKind::Other("audiobook".to_string()));
        assert_eq!(sections[2].kind.to_string(), "audiobook");
    }

    #[test]
    fn test_filter_requires_title_and_kind() {
        let filter = LibraryFilter::new("Movies", LibraryKind::Movie);

        assert!(filter.matches(&section("Movies", LibraryKind::Movie)));
        assert!(!filter.matches(&section("Movies", LibraryKind::Show)));
        assert!(!filter.matches(&section("Kids Movies", LibraryKind::Movie)));
        assert!(!filter.matches(&section("movies", LibraryKind::Movie)));
    }
}
