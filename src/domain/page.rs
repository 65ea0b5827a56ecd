/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Upper bound on page size unless the server is configured otherwise.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Hard ceiling for any configured maximum page size.
pub const PAGE_SIZE_LIMIT: u32 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Id,
    Amount,
    Owner,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Amount => "amount",
            SortField::Owner => "owner",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "id" => Some(SortField::Id),
            "amount" => Some(SortField::Amount),
            "owner" => Some(SortField::Owner),
            _ => None,
        }
    }

    /// Column backing this field in the `cash_cards` table.
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Amount => "amount_cents",
            SortField::Owner => "owner",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Asc => "asc",
            Direction::Desc => "desc",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Some(Direction::Asc),
            "desc" => Some(Direction::Desc),
            _ => None,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sort {
    pub field: SortField,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: Direction::Desc,
        }
    }

    /// Parse `field` or `field,direction`, e.g. `amount,desc`.
    pub fn parse(s: &str) -> Option<Self> {
        let (field, direction) = match s.split_once(',') {
            Some((field, direction)) => (field, Direction::from_str(direction)?),
            None => (s, Direction::Asc),
        };
        Some(Self {
            field: SortField::from_str(field)?,
            direction,
        })
    }
}

impl std::fmt::Display for Sort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.field.as_str(), self.direction.as_str())
    }
}

/// Ascending by amount, applied only when the caller gives no sort.
pub fn default_sort() -> Vec<Sort> {
    vec![Sort::asc(SortField::Amount)]
}

/// A request for one page of results. Page indices start at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort: Vec<Sort>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            sort: Vec::new(),
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    pub fn is_sorted(&self) -> bool {
        !self.sort.is_empty()
    }

    /// Replace an empty sort with `fallback`; an explicit sort wins.
    pub fn sort_or(mut self, fallback: Vec<Sort>) -> Self {
        if self.sort.is_empty() {
            self.sort = fallback;
        }
        self
    }

    /// Rows skipped before this page, or `None` if that does not fit in an `i64`.
    pub fn offset(&self) -> Option<i64> {
        i64::from(self.page).checked_mul(i64::from(self.size))
    }

    /// Bring `size` into `1..=max`. A zero size takes the default page size.
    pub fn clamp_size(mut self, max: u32) -> Self {
        let max = max.max(1);
        self.size = match self.size {
            0 => DEFAULT_PAGE_SIZE.min(max),
            size => size.min(max),
        };
        self
    }
}
