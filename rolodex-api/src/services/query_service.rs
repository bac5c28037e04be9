//! Query Service
//!
//! Turns raw list/export query strings into a [`ContactSelector`] and
//! [`SortOrder`], and runs them against the store.

use rolodex_core::{Contact, ContactField, ContactId, ContactSelector, FieldFilter, SortOrder};
use rolodex_storage::ContactStore;

use crate::constants::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::{ApiError, ApiResult};
use crate::types::{ExportParams, ListContactsParams, ListContactsResponse};
use crate::validation::ValidateRange;

/// A parsed, validated list query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactQuery {
    pub selector: ContactSelector,
    pub sort: SortOrder,
    pub page: u64,
    pub limit: u64,
}

impl Default for ContactQuery {
    fn default() -> Self {
        Self {
            selector: ContactSelector::all(),
            sort: SortOrder::default(),
            page: DEFAULT_PAGE,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ContactQuery {
    pub fn from_params(params: &ListContactsParams) -> ApiResult<Self> {
        let page = params.page.unwrap_or(DEFAULT_PAGE);
        page.validate_range("page", 1, u64::MAX)?;
        let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        limit.validate_range("limit", 1, MAX_PAGE_SIZE)?;

        let sort = match params.sort.as_deref() {
            Some(raw) => SortOrder::parse(raw)?,
            None => SortOrder::default(),
        };

        Ok(Self {
            selector: build_selector(params.search.as_deref(), params.filter.as_deref())?,
            sort,
            page,
            limit,
        })
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Combine an optional search term with an optional JSON filter object.
pub fn build_selector(search: Option<&str>, filter: Option<&str>) -> ApiResult<ContactSelector> {
    let mut selector = ContactSelector::all();
    if let Some(term) = search {
        selector = selector.with_search(term);
    }
    Ok(selector.with_filters(parse_filter(filter)?))
}

/// Parse the `filter` query parameter. Absent or blank means no filter.
pub fn parse_filter(raw: Option<&str>) -> ApiResult<Vec<FieldFilter>> {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return Ok(Vec::new());
    };
    let value: serde_json::Value = serde_json::from_str(raw)
        .map_err(|e| ApiError::invalid_format("filter", &format!("a JSON object ({})", e)))?;
    Ok(ContactSelector::parse_filters(&value)?)
}

/// Parse a comma-separated field list. Blank input selects the business
/// fields.
pub fn parse_fields(raw: Option<&str>) -> ApiResult<Vec<ContactField>> {
    let fields = raw
        .unwrap_or("")
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<ContactField>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::invalid_input(e.to_string()))?;

    if fields.is_empty() {
        return Ok(ContactField::BUSINESS.to_vec());
    }
    Ok(fields)
}

/// Parse a comma-separated id list.
pub fn parse_ids<S: AsRef<str>>(raw: &[S]) -> ApiResult<Vec<ContactId>> {
    raw.iter()
        .map(|s| s.as_ref().trim())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<ContactId>()
                .map_err(|_| ApiError::invalid_format("ids", "a list of contact UUIDs"))
        })
        .collect()
}

/// Run a list query and report the page.
pub async fn list_contacts(
    store: &dyn ContactStore,
    query: &ContactQuery,
) -> ApiResult<ListContactsResponse> {
    let total = store.count(&query.selector).await?;
    let contacts = store
        .find(&query.selector, query.sort, query.offset(), query.limit)
        .await?;

    Ok(ListContactsResponse {
        contacts,
        total,
        page: query.page,
        total_pages: total.div_ceil(query.limit),
    })
}

/// Records for an export.
///
/// With `ids`, each listed contact is fetched in the given order and a
/// missing id is an error. Otherwise search and filter select up to `limit`
/// records sorted by name.
pub async fn export_selection(
    store: &dyn ContactStore,
    params: &ExportParams,
    limit: u64,
) -> ApiResult<Vec<Contact>> {
    if let Some(raw_ids) = params.ids.as_deref().filter(|s| !s.trim().is_empty()) {
        let ids = parse_ids(&raw_ids.split(',').collect::<Vec<_>>())?;
        let mut contacts = Vec::with_capacity(ids.len());
        for id in ids {
            let contact = store
                .get(id)
                .await?
                .ok_or_else(|| ApiError::contact_not_found(id))?;
            contacts.push(contact);
        }
        return Ok(contacts);
    }

    let selector = build_selector(params.search.as_deref(), params.filter.as_deref())?;
    Ok(store
        .find(&selector, SortOrder::ascending(ContactField::Name), 0, limit)
        .await?)
}
