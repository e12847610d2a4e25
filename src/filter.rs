use crate::task::TodoStatus;
use std::fmt;

/// Label shown for the wildcard option of the status and category filters.
pub const ALL: &str = "All";

/// A status constraint, or no constraint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TodoStatus),
}

impl StatusFilter {
    /// `All`, then each status in display order, then back to `All`.
    pub fn cycle(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(TodoStatus::Pending),
            StatusFilter::Only(TodoStatus::Completed) => StatusFilter::All,
            StatusFilter::Only(status) => StatusFilter::Only(status.next()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => ALL,
            StatusFilter::Only(status) => status.as_str(),
        }
    }
}

/// A category constraint, or no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn as_str(&self) -> &str {
        match self {
            CategoryFilter::All => ALL,
            CategoryFilter::Only(category) => category,
        }
    }

    /// Parse an option label as produced by the category options list.
    pub fn from_label(label: &str) -> Self {
        if label == ALL || label.is_empty() {
            CategoryFilter::All
        } else {
            CategoryFilter::Only(label.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    CreatedAt,
    DueDate,
    Title,
}

impl SortBy {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortBy::CreatedAt => "createdAt",
            SortBy::DueDate => "dueDate",
            SortBy::Title => "title",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// The sort choices offered in the list view, in the order they cycle.
pub const SORT_PRESETS: [(SortBy, SortOrder, &str); 6] = [
    (SortBy::CreatedAt, SortOrder::Desc, "Newest First"),
    (SortBy::CreatedAt, SortOrder::Asc, "Oldest First"),
    (SortBy::DueDate, SortOrder::Asc, "Due Date (Earliest)"),
    (SortBy::DueDate, SortOrder::Desc, "Due Date (Latest)"),
    (SortBy::Title, SortOrder::Asc, "Title (A-Z)"),
    (SortBy::Title, SortOrder::Desc, "Title (Z-A)"),
];

/// Query parameters controlling which todos are fetched and in what order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub search: String,
    pub status: StatusFilter,
    pub category: CategoryFilter,
    pub sort_by: SortBy,
    pub sort_order: SortOrder,
}

impl FilterCriteria {
    /// Request parameters. Wildcards and an empty search are omitted; the sort
    /// key and order are always present.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(5);
        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        if let StatusFilter::Only(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let CategoryFilter::Only(category) = &self.category {
            params.push(("category", category.clone()));
        }
        params.push(("sortBy", self.sort_by.as_param().to_string()));
        params.push(("sortOrder", self.sort_order.as_param().to_string()));
        params
    }

    /// Whether any constraint narrows the result set. Sorting does not count.
    pub fn is_narrowed(&self) -> bool {
        !self.search.is_empty()
            || self.status != StatusFilter::All
            || self.category != CategoryFilter::All
    }

    pub fn sort_label(&self) -> &'static str {
        SORT_PRESETS
            .iter()
            .find(|(by, order, _)| *by == self.sort_by && *order == self.sort_order)
            .map(|(_, _, label)| *label)
            .unwrap_or("Custom")
    }

    /// Move to the next sort preset.
    pub fn cycle_sort(&mut self) {
        let current = SORT_PRESETS
            .iter()
            .position(|(by, order, _)| *by == self.sort_by && *order == self.sort_order);
        let next = current.map_or(0, |i| (i + 1) % SORT_PRESETS.len());
        let (by, order, _) = SORT_PRESETS[next];
        self.sort_by = by;
        self.sort_order = order;
    }
}

impl fmt::Display for FilterCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "search={:?} status={} category={} sort={}",
            self.search,
            self.status.as_str(),
            self.category.as_str(),
            self.sort_label()
        )
    }
}
