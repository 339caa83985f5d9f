//! # Catalog View-Model
//!
//! Pure filtering, sorting and pagination over the product catalog. The
//! rendering layer feeds user input into a [`CatalogFilter`] and redraws
//! from the returned slice; no DOM state participates in the logic.
//!
//! Text matching is accent- and case-insensitive ("cerámica" matches
//! "CERAMICA"), every whitespace-separated term must match somewhere in
//! the product, and stock filtering works on the sign of the position
//! rather than exact numbers.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Product, StockSign};

/// Name markers for special/clearance assortments excluded by the
/// "exclude special categories" toggle.
const SPECIAL_MARKERS: &[&str] = &[
    "outlet", "outle", "outl", "2da", "saldo", "lote", "@", "//", "pedido",
];

// =============================================================================
// Text Folding
// =============================================================================

/// Lowercases and strips the Spanish accented set so searches match
/// regardless of tildes ("cerámica" → "ceramica").
pub fn fold_text(text: &str) -> String {
    text.trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' | 'à' | 'ä' | 'â' => 'a',
            'é' | 'è' | 'ë' | 'ê' => 'e',
            'í' | 'ì' | 'ï' | 'î' => 'i',
            'ó' | 'ò' | 'ö' | 'ô' => 'o',
            'ú' | 'ù' | 'ü' | 'û' => 'u',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

// =============================================================================
// Filter
// =============================================================================

/// Catalog filter state.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    /// Free-text query; whitespace-separated terms are AND-ed.
    pub query: String,

    /// Exact category match, when set.
    pub category: Option<String>,

    /// Coverage group match (accent-insensitive), when set.
    pub coverage_group: Option<String>,

    pub min_price: Option<Money>,
    pub max_price: Option<Money>,

    /// Stock-sign toggles.
    pub include_positive_stock: bool,
    pub include_zero_stock: bool,
    pub include_negative_stock: bool,

    /// Hide outlet/clearance/special-order assortments.
    pub exclude_special: bool,
}

impl Default for CatalogFilter {
    fn default() -> Self {
        CatalogFilter {
            query: String::new(),
            category: None,
            coverage_group: None,
            min_price: None,
            max_price: None,
            include_positive_stock: true,
            include_zero_stock: true,
            include_negative_stock: true,
            exclude_special: false,
        }
    }
}

impl CatalogFilter {
    fn matches(&self, product: &Product) -> bool {
        // free text: every term must hit name, number or category
        let query = fold_text(&self.query);
        if !query.is_empty() {
            let name = fold_text(&product.name);
            let number = fold_text(&product.product_number);
            let category = fold_text(&product.category);
            let all_match = query.split_whitespace().all(|term| {
                name.contains(term) || number.contains(term) || category.contains(term)
            });
            if !all_match {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if product.category != *category {
                return false;
            }
        }

        if let Some(coverage) = &self.coverage_group {
            if fold_text(&product.coverage_group) != fold_text(coverage) {
                return false;
            }
        }

        if let Some(min) = self.min_price {
            if product.sale_price < min {
                return false;
            }
        }
        if let Some(max) = self.max_price {
            if product.sale_price > max {
                return false;
            }
        }

        let stock_ok = match product.stock_sign() {
            StockSign::Positive => self.include_positive_stock,
            StockSign::Zero => self.include_zero_stock,
            StockSign::Negative => self.include_negative_stock,
        };
        if !stock_ok {
            return false;
        }

        if self.exclude_special {
            let name = fold_text(&product.name);
            if SPECIAL_MARKERS.iter().any(|m| name.contains(m)) {
                return false;
            }
        }

        true
    }
}

// =============================================================================
// Sort
// =============================================================================

/// Catalog sort order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Keep backend order.
    Relevance,
    #[default]
    NameAsc,
    PriceAsc,
    PriceDesc,
}

/// Applies the filter and sort, returning references in display order.
pub fn filter_and_sort<'a>(
    products: &'a [Product],
    filter: &CatalogFilter,
    sort: SortKey,
) -> Vec<&'a Product> {
    let mut result: Vec<&Product> = products.iter().filter(|p| filter.matches(p)).collect();

    match sort {
        SortKey::Relevance => {}
        SortKey::NameAsc => result.sort_by_key(|p| fold_text(&p.name)),
        SortKey::PriceAsc => result.sort_by_key(|p| p.sale_price),
        SortKey::PriceDesc => {
            result.sort_by_key(|p| std::cmp::Reverse(p.sale_price));
        }
    }

    result
}

// =============================================================================
// Pagination
// =============================================================================

/// Number of pages needed for `total_items` (at least 1).
pub fn total_pages(total_items: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 1;
    }
    total_items.div_ceil(per_page).max(1)
}

/// The slice of `items` shown on 1-based `page`. Pages out of range
/// clamp to the nearest valid page.
pub fn page_slice<T>(items: &[T], page: usize, per_page: usize) -> &[T] {
    if per_page == 0 || items.is_empty() {
        return items;
    }
    let last = total_pages(items.len(), per_page);
    let page = page.clamp(1, last);
    let start = (page - 1) * per_page;
    let end = (start + per_page).min(items.len());
    &items[start..end]
}

// =============================================================================
// Unit Tests
// =============================================================================
