//! Search query types, normalization, and validation for provider lookups

use crate::error::{Result, StreetshotError};
use crate::geo::AreaOfInterest;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Provider-enforced upper bound on the page size of any search
pub const MAX_PAGE_SIZE: u32 = 5000;
/// Default page size for polygon (area) searches
pub const DEFAULT_AREA_PAGE_SIZE: u32 = 1000;
/// Default page size for address searches
pub const DEFAULT_ADDRESS_PAGE_SIZE: u32 = 5000;
/// Default page size for saved-AOI feed reads
pub const DEFAULT_FEED_PAGE_SIZE: u32 = 5000;

/// Response property the provider sorts results by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortField {
    /// Capture timestamp (default for area and feed queries)
    CapturedOn,
    /// Distance from the query location (default for address queries)
    Distance,
}

impl SortField {
    /// Wire name of the sort field
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CapturedOn => "captured_on",
            Self::Distance => "distance",
        }
    }
}

impl std::fmt::Display for SortField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sort direction for search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Smallest or earliest first
    Ascending,
    /// Largest or latest first
    Descending,
}

impl Default for SortOrder {
    fn default() -> Self {
        Self::Ascending
    }
}

impl SortOrder {
    /// Wire name of the sort order
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed resolution variants the provider serves for every image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeVariant {
    /// 360 x 272
    Tiny,
    /// 640 x 480
    Small,
    /// 960 x 720
    Medium,
    /// 1280 x 960
    Large,
    /// Full capture resolution (camera-dependent, e.g. 3264 x 2448 for
    /// side-facing cameras)
    Native,
}

impl Default for SizeVariant {
    fn default() -> Self {
        Self::Small
    }
}

impl SizeVariant {
    /// Wire name of the size variant
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Native => "native",
        }
    }

    /// Pixel dimensions of the variant, `None` for camera-dependent native
    #[must_use]
    pub const fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            Self::Tiny => Some((360, 272)),
            Self::Small => Some((640, 480)),
            Self::Medium => Some((960, 720)),
            Self::Large => Some((1280, 960)),
            Self::Native => None,
        }
    }
}

impl std::fmt::Display for SizeVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An inclusive capture-date window, encoded on the wire as
/// `YYYY-MM-DD,YYYY-MM-DD`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a date range, rejecting windows that end before they start
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(StreetshotError::invalid_query(format!(
                "date range start {start} is after end {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Window covering the last `days` days up to today (UTC)
    #[must_use]
    pub fn last_days(days: u32) -> Self {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(i64::from(days));
        Self { start, end }
    }

    /// First day of the window
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Encode the window in the provider's query-parameter form
    #[must_use]
    pub fn to_query_value(&self) -> String {
        format!(
            "{},{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// The one location predicate a valid query carries
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationPredicate<'a> {
    /// Polygon search over an area of interest
    Area(&'a AreaOfInterest),
    /// Proximity search around a street address
    Address(&'a str),
}

/// Parameters for an image search.
///
/// Exactly one of `area` and `address` must be set by the time the query is
/// executed; everything else is optional and is normalized to provider
/// defaults at request time. Construct with [`SearchQuery::by_area`] or
/// [`SearchQuery::by_address`] and refine with the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Polygon to search within (mutually exclusive with `address`)
    pub area: Option<AreaOfInterest>,
    /// Street address to search around (mutually exclusive with `area`)
    pub address: Option<String>,
    /// Search radius in meters
    pub radius_meters: Option<u32>,
    /// Sort field override; defaults per predicate type when unset
    pub sort: Option<SortField>,
    /// Sort direction
    pub order: SortOrder,
    /// Opaque provider filter expression, e.g. `position=1|4,speed>=20`
    pub filter: Option<String>,
    /// Opaque provider tag expression, e.g. `car.make=bmw`
    pub tags: Option<String>,
    /// Capture-date window
    pub date_range: Option<DateRange>,
    /// Pagination offset
    pub offset: u32,
    /// Page size override; defaults per predicate type when unset
    pub limit: Option<u32>,
}

impl SearchQuery {
    /// Query for images captured within a polygon
    #[must_use]
    pub fn by_area(area: AreaOfInterest) -> Self {
        Self {
            area: Some(area),
            ..Self::default()
        }
    }

    /// Query for images captured near a street address
    #[must_use]
    pub fn by_address<S: Into<String>>(address: S) -> Self {
        Self {
            address: Some(address.into()),
            ..Self::default()
        }
    }

    /// Set the search radius in meters
    #[must_use]
    pub fn with_radius(mut self, meters: u32) -> Self {
        self.radius_meters = Some(meters);
        self
    }

    /// Override the sort field
    #[must_use]
    pub fn with_sort(mut self, field: SortField) -> Self {
        self.sort = Some(field);
        self
    }

    /// Set the sort direction
    #[must_use]
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Set an opaque provider filter expression
    #[must_use]
    pub fn with_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set an opaque provider tag expression
    #[must_use]
    pub fn with_tags<S: Into<String>>(mut self, tags: S) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Restrict results to a capture-date window
    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Set the pagination offset
    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Override the page size
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The query's location predicate, or `InvalidQuery` when it is absent or
    /// ambiguous
    pub fn location(&self) -> Result<LocationPredicate<'_>> {
        match (&self.area, &self.address) {
            (Some(_), Some(_)) => Err(StreetshotError::invalid_query(
                "area and address are mutually exclusive; set exactly one",
            )),
            (None, None) => Err(StreetshotError::invalid_query(
                "either an area polygon or an address is required",
            )),
            (Some(area), None) => Ok(LocationPredicate::Area(area)),
            (None, Some(address)) => Ok(LocationPredicate::Address(address)),
        }
    }

    /// Validate the query before any network activity
    pub fn validate(&self) -> Result<()> {
        self.location()?;

        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_PAGE_SIZE {
                return Err(StreetshotError::query_value_error(
                    "limit",
                    limit,
                    "1-5000",
                    Some(MAX_PAGE_SIZE),
                ));
            }
        }
        if self.radius_meters == Some(0) {
            return Err(StreetshotError::invalid_query(
                "radius must be a positive number of meters",
            ));
        }
        Ok(())
    }

    /// Sort field after applying the per-predicate default
    #[must_use]
    pub fn resolved_sort(&self) -> SortField {
        self.sort.unwrap_or(if self.address.is_some() {
            SortField::Distance
        } else {
            SortField::CapturedOn
        })
    }

    /// Page size after applying the per-predicate default
    #[must_use]
    pub fn resolved_limit(&self) -> u32 {
        self.limit.unwrap_or(if self.address.is_some() {
            DEFAULT_ADDRESS_PAGE_SIZE
        } else {
            DEFAULT_AREA_PAGE_SIZE
        })
    }
}

/// Optional parameters for reading a saved AOI's image feed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeedOptions {
    /// Sort field override; defaults to capture timestamp
    pub sort: Option<SortField>,
    /// Sort direction
    pub order: SortOrder,
    /// Opaque provider filter expression
    pub filter: Option<String>,
    /// Opaque provider tag expression
    pub tags: Option<String>,
    /// Capture-date window
    pub date_range: Option<DateRange>,
    /// Pagination offset
    pub offset: u32,
    /// Page size override
    pub limit: Option<u32>,
}

impl FeedOptions {
    /// Override the sort field
    #[must_use]
    pub fn with_sort(mut self, field: SortField) -> Self {
        self.sort = Some(field);
        self
    }

    /// Set the sort direction
    #[must_use]
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Set an opaque provider filter expression
    #[must_use]
    pub fn with_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Set an opaque provider tag expression
    #[must_use]
    pub fn with_tags<S: Into<String>>(mut self, tags: S) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Restrict the feed to a capture-date window
    #[must_use]
    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Set the pagination offset
    #[must_use]
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Override the page size
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Validate the options before any network activity
    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_PAGE_SIZE {
                return Err(StreetshotError::query_value_error(
                    "limit",
                    limit,
                    "1-5000",
                    Some(MAX_PAGE_SIZE),
                ));
            }
        }
        Ok(())
    }

    /// Sort field after applying the feed default
    #[must_use]
    pub fn resolved_sort(&self) -> SortField {
        self.sort.unwrap_or(SortField::CapturedOn)
    }

    /// Page size after applying the feed default
    #[must_use]
    pub fn resolved_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_FEED_PAGE_SIZE)
    }
}
