//! Filter expressions as they arrive from the transport layer.
//!
//! A [`FilterNode`] is a boolean tree of typed criteria. Each entity type has
//! its own closed criterion enum, so the set of filterable fields is known at
//! compile time. The database crate compiles these trees into SQL.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Modifiers ───────────────────────────────────────────────────────────────

/// Comparison semantics for a criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionModifier {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    IsNull,
    NotNull,
    MatchesRegex,
    NotMatchesRegex,
    Includes,
    IncludesAll,
    Excludes,
}

impl CriterionModifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "EQUALS",
            Self::NotEquals => "NOT_EQUALS",
            Self::GreaterThan => "GREATER_THAN",
            Self::LessThan => "LESS_THAN",
            Self::IsNull => "IS_NULL",
            Self::NotNull => "NOT_NULL",
            Self::MatchesRegex => "MATCHES_REGEX",
            Self::NotMatchesRegex => "NOT_MATCHES_REGEX",
            Self::Includes => "INCLUDES",
            Self::IncludesAll => "INCLUDES_ALL",
            Self::Excludes => "EXCLUDES",
        }
    }
}

impl fmt::Display for CriterionModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Criterion Inputs ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StringCriterion {
    #[serde(default)]
    pub value: String,
    pub modifier: CriterionModifier,
}

impl StringCriterion {
    pub fn new(value: impl Into<String>, modifier: CriterionModifier) -> Self {
        Self {
            value: value.into(),
            modifier,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntCriterion {
    #[serde(default)]
    pub value: i64,
    pub modifier: CriterionModifier,
}

impl IntCriterion {
    pub fn new(value: i64, modifier: CriterionModifier) -> Self {
        Self { value, modifier }
    }
}

/// A criterion over a set of related entity ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiCriterion {
    #[serde(default)]
    pub value: Vec<i64>,
    pub modifier: CriterionModifier,
}

impl MultiCriterion {
    pub fn new(value: Vec<i64>, modifier: CriterionModifier) -> Self {
        Self { value, modifier }
    }
}

/// Video/image resolution buckets, compared against `MIN(width, height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Resolution {
    Low,
    Standard,
    StandardHd,
    FullHd,
    FourK,
}

impl Resolution {
    /// Nominal pixel height of the bucket.
    pub fn height(&self) -> i64 {
        match self {
            Self::Low => 240,
            Self::Standard => 480,
            Self::StandardHd => 720,
            Self::FullHd => 1080,
            Self::FourK => 2160,
        }
    }

    /// Half-open `[min, max)` range of `MIN(width, height)` covered by the bucket.
    pub fn range(&self) -> (i64, Option<i64>) {
        match self {
            Self::Low => (0, Some(Self::Standard.height())),
            Self::Standard => (Self::Standard.height(), Some(Self::StandardHd.height())),
            Self::StandardHd => (Self::StandardHd.height(), Some(Self::FullHd.height())),
            Self::FullHd => (Self::FullHd.height(), Some(Self::FourK.height())),
            Self::FourK => (Self::FourK.height(), None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionCriterion {
    pub value: Resolution,
    pub modifier: CriterionModifier,
}

// ── Filter Tree ─────────────────────────────────────────────────────────────

/// Boolean composition of criteria.
///
/// At most one of `and`, `or` and `not` may be set on a node. The criteria
/// of a node are always ANDed together; the populated sub-node is combined
/// with them using its operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "C: Deserialize<'de>"))]
pub struct FilterNode<C> {
    #[serde(default, rename = "AND", skip_serializing_if = "Option::is_none")]
    pub and: Option<Box<FilterNode<C>>>,
    #[serde(default, rename = "OR", skip_serializing_if = "Option::is_none")]
    pub or: Option<Box<FilterNode<C>>>,
    #[serde(default, rename = "NOT", skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<FilterNode<C>>>,
    #[serde(default = "Vec::new")]
    pub criteria: Vec<C>,
}

impl<C> Default for FilterNode<C> {
    fn default() -> Self {
        Self {
            and: None,
            or: None,
            not: None,
            criteria: Vec::new(),
        }
    }
}

impl<C> FilterNode<C> {
    pub fn new(criteria: Vec<C>) -> Self {
        Self {
            criteria,
            ..Self::default()
        }
    }

    pub fn with_and(mut self, node: FilterNode<C>) -> Self {
        self.and = Some(Box::new(node));
        self
    }

    pub fn with_or(mut self, node: FilterNode<C>) -> Self {
        self.or = Some(Box::new(node));
        self
    }

    pub fn with_not(mut self, node: FilterNode<C>) -> Self {
        self.not = Some(Box::new(node));
        self
    }
}

// ── Per-Entity Criteria ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneCriterion {
    Path(StringCriterion),
    Title(StringCriterion),
    Details(StringCriterion),
    Checksum(StringCriterion),
    Rating(IntCriterion),
    OCounter(IntCriterion),
    Organized(bool),
    Duration(IntCriterion),
    Resolution(ResolutionCriterion),
    HasMarkers(bool),
    IsMissing(String),
    Tags(MultiCriterion),
    TagCount(IntCriterion),
    Performers(MultiCriterion),
    PerformerCount(IntCriterion),
    Studios(MultiCriterion),
    Movies(MultiCriterion),
    Galleries(MultiCriterion),
    PerformerTags(MultiCriterion),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageCriterion {
    Path(StringCriterion),
    Title(StringCriterion),
    Checksum(StringCriterion),
    Rating(IntCriterion),
    OCounter(IntCriterion),
    Organized(bool),
    Resolution(ResolutionCriterion),
    IsMissing(String),
    Tags(MultiCriterion),
    TagCount(IntCriterion),
    Galleries(MultiCriterion),
    Performers(MultiCriterion),
    PerformerCount(IntCriterion),
    Studios(MultiCriterion),
    PerformerTags(MultiCriterion),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GalleryCriterion {
    Path(StringCriterion),
    Title(StringCriterion),
    Checksum(StringCriterion),
    Rating(IntCriterion),
    Organized(bool),
    IsMissing(String),
    Tags(MultiCriterion),
    TagCount(IntCriterion),
    Performers(MultiCriterion),
    PerformerCount(IntCriterion),
    Studios(MultiCriterion),
    ImageCount(IntCriterion),
    PerformerTags(MultiCriterion),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformerCriterion {
    Name(StringCriterion),
    Aliases(StringCriterion),
    Gender(StringCriterion),
    Url(StringCriterion),
    CareerLength(StringCriterion),
    Country(StringCriterion),
    Ethnicity(StringCriterion),
    Details(StringCriterion),
    Favorite(bool),
    Rating(IntCriterion),
    /// Age in whole years at death date, or today.
    Age(IntCriterion),
    IsMissing(String),
    Tags(MultiCriterion),
    TagCount(IntCriterion),
    SceneCount(IntCriterion),
    ImageCount(IntCriterion),
    GalleryCount(IntCriterion),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudioCriterion {
    Name(StringCriterion),
    Url(StringCriterion),
    Details(StringCriterion),
    Rating(IntCriterion),
    IsMissing(String),
    Parents(MultiCriterion),
    SceneCount(IntCriterion),
    ImageCount(IntCriterion),
    GalleryCount(IntCriterion),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovieCriterion {
    Name(StringCriterion),
    Director(StringCriterion),
    Synopsis(StringCriterion),
    Url(StringCriterion),
    Rating(IntCriterion),
    Duration(IntCriterion),
    IsMissing(String),
    Studios(MultiCriterion),
    SceneCount(IntCriterion),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagCriterion {
    Name(StringCriterion),
    IsMissing(String),
    SceneCount(IntCriterion),
    ImageCount(IntCriterion),
    GalleryCount(IntCriterion),
    PerformerCount(IntCriterion),
    MarkerCount(IntCriterion),
}

pub type SceneFilter = FilterNode<SceneCriterion>;
pub type ImageFilter = FilterNode<ImageCriterion>;
pub type GalleryFilter = FilterNode<GalleryCriterion>;
pub type PerformerFilter = FilterNode<PerformerCriterion>;
pub type StudioFilter = FilterNode<StudioCriterion>;
pub type MovieFilter = FilterNode<MovieCriterion>;
pub type TagFilter = FilterNode<TagCriterion>;

// ── Find Filter ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Free-text search, sorting and pagination for a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindFilter {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub page: Option<i64>,
    /// Page size; a negative value disables pagination.
    #[serde(default)]
    pub per_page: Option<i64>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub direction: Option<SortDirection>,
}

pub const DEFAULT_PER_PAGE: i64 = 25;

impl FindFilter {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p > 0).unwrap_or(1)
    }

    /// Page size, or `None` when every row is requested.
    pub fn page_size(&self) -> Option<i64> {
        match self.per_page {
            Some(n) if n < 0 => None,
            Some(n) => Some(n),
            None => Some(DEFAULT_PER_PAGE),
        }
    }

    pub fn sort_or<'a>(&'a self, default: &'a str) -> &'a str {
        match self.sort.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => default,
        }
    }

    pub fn direction(&self) -> SortDirection {
        self.direction.unwrap_or_default()
    }

    /// A find filter that returns every row in the default order.
    pub fn all() -> Self {
        Self {
            per_page: Some(-1),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_nested_filter() {
        let json = r#"{
            "criteria": [{"rating": {"value": 3, "modifier": "GREATER_THAN"}}],
            "OR": {"criteria": [{"tags": {"value": [1, 2], "modifier": "INCLUDES_ALL"}}]}
        }"#;
        let filter: SceneFilter = serde_json::from_str(json).unwrap();
        assert_eq!(
            filter.criteria,
            vec![SceneCriterion::Rating(IntCriterion::new(
                3,
                CriterionModifier::GreaterThan
            ))]
        );
        let or = filter.or.unwrap();
        assert_eq!(
            or.criteria,
            vec![SceneCriterion::Tags(MultiCriterion::new(
                vec![1, 2],
                CriterionModifier::IncludesAll
            ))]
        );
        assert!(filter.and.is_none());
    }

    /// Parse a tree for any criterion type, as a caller generic over the
    /// entity would.
    fn parse_tree<C: serde::de::DeserializeOwned>(json: &str) -> FilterNode<C> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn trees_parse_without_default_criteria() {
        let tags: TagFilter =
            parse_tree(r#"{"NOT": {"criteria": [{"name": {"value": "x", "modifier": "EQUALS"}}]}}"#);
        assert!(tags.criteria.is_empty());
        assert_eq!(tags.not.unwrap().criteria.len(), 1);

        let scenes: SceneFilter = parse_tree("{}");
        assert_eq!(scenes, SceneFilter::default());
    }

    #[test]
    fn find_filter_pagination_defaults() {
        let f = FindFilter::default();
        assert_eq!(f.page(), 1);
        assert_eq!(f.page_size(), Some(DEFAULT_PER_PAGE));
        assert_eq!(FindFilter::all().page_size(), None);
        assert_eq!(f.sort_or("title"), "title");
    }

    #[test]
    fn resolution_ranges_are_contiguous() {
        let all = [
            Resolution::Low,
            Resolution::Standard,
            Resolution::StandardHd,
            Resolution::FullHd,
            Resolution::FourK,
        ];
        for pair in all.windows(2) {
            assert_eq!(pair[0].range().1, Some(pair[1].range().0));
        }
    }
}
