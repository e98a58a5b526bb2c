//! Filter normalization.
//!
//! Turns raw query-string values into a [`TransactionFilter`]. Nothing here
//! fails: malformed values only ever widen the result toward "no filter".

use std::{collections::BTreeSet, num::IntErrorKind};

use chrono::NaiveDate;

use crate::TransactionKind;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 20;
pub const MAX_LIMIT: u64 = 100;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw filter input, exactly as received from the caller.
#[derive(Clone, Debug, Default)]
pub struct RawTransactionFilter {
    /// `"expense"`, `"income"`, anything else means both.
    pub kind: Option<String>,
    /// Comma separated category ids.
    pub category_ids: Option<String>,
    /// Inclusive lower bound, `YYYY-MM-DD`.
    pub start_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Validated filter for one query call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionFilter {
    /// `None` queries both partitions.
    pub kind: Option<TransactionKind>,
    /// `None` disables the category predicate; never an empty set.
    pub category_ids: Option<BTreeSet<i64>>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    /// 1-based.
    pub page: u64,
    /// Always in `1..=MAX_LIMIT`.
    pub limit: u64,
}

impl Default for TransactionFilter {
    fn default() -> Self {
        Self {
            kind: None,
            category_ids: None,
            date_from: None,
            date_to: None,
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Storage-level slice of a single partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl TransactionFilter {
    pub fn normalize(raw: &RawTransactionFilter) -> Self {
        Self {
            kind: raw.kind.as_deref().and_then(parse_kind),
            category_ids: raw.category_ids.as_deref().and_then(parse_category_ids),
            date_from: raw.start_date.as_deref().and_then(parse_date),
            date_to: raw.end_date.as_deref().and_then(parse_date),
            page: parse_page(raw.page.as_deref()),
            limit: parse_limit(raw.limit.as_deref()),
        }
    }

    /// Whether rows of `kind` can match at all.
    pub fn includes(&self, kind: TransactionKind) -> bool {
        self.kind.is_none_or(|k| k == kind)
    }

    /// Only one partition is read, so paging can go to storage.
    pub fn is_single_partition(&self) -> bool {
        self.kind.is_some()
    }

    /// Index of the first record of the requested page.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }

    /// The window to push down to storage, if the query allows it.
    pub fn push_down_window(&self) -> Option<PageWindow> {
        self.is_single_partition().then(|| PageWindow {
            offset: self.offset(),
            limit: self.limit,
        })
    }
}

fn parse_kind(value: &str) -> Option<TransactionKind> {
    let value = value.trim();
    TransactionKind::ALL
        .into_iter()
        .find(|kind| kind.as_str().eq_ignore_ascii_case(value))
}

fn parse_category_ids(value: &str) -> Option<BTreeSet<i64>> {
    let ids: BTreeSet<i64> = value
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect();
    (!ids.is_empty()).then_some(ids)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Integer query value; digits too large for `i64` saturate instead of
/// counting as malformed.
fn parse_count(value: &str) -> Option<i64> {
    match value.trim().parse::<i64>() {
        Ok(n) => Some(n),
        Err(err) if *err.kind() == IntErrorKind::PosOverflow => Some(i64::MAX),
        Err(_) => None,
    }
}

fn parse_page(value: Option<&str>) -> u64 {
    value
        .and_then(parse_count)
        .filter(|page| *page >= 1)
        .map_or(DEFAULT_PAGE, |page| page.unsigned_abs())
}

fn parse_limit(value: Option<&str>) -> u64 {
    value
        .and_then(parse_count)
        .filter(|limit| *limit >= 1)
        .map_or(DEFAULT_LIMIT, |limit| limit.unsigned_abs().min(MAX_LIMIT))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawTransactionFilter {
        RawTransactionFilter::default()
    }

    fn limit_of(value: &str) -> u64 {
        TransactionFilter::normalize(&RawTransactionFilter {
            limit: Some(value.to_string()),
            ..raw()
        })
        .limit
    }

    fn page_of(value: &str) -> u64 {
        TransactionFilter::normalize(&RawTransactionFilter {
            page: Some(value.to_string()),
            ..raw()
        })
        .page
    }

    #[test]
    fn empty_input_is_default_filter() {
        assert_eq!(TransactionFilter::normalize(&raw()), TransactionFilter::default());
    }

    #[test]
    fn limit_is_defaulted_and_clamped() {
        assert_eq!(limit_of("0"), 20);
        assert_eq!(limit_of("-5"), 20);
        assert_eq!(limit_of("abc"), 20);
        assert_eq!(limit_of("500"), 100);
        assert_eq!(limit_of("1"), 1);
        assert_eq!(limit_of("100"), 100);
        assert_eq!(limit_of(" 7 "), 7);
    }

    #[test]
    fn oversized_numbers_saturate() {
        assert_eq!(limit_of("99999999999999999999"), MAX_LIMIT);
        assert_eq!(limit_of("-99999999999999999999"), DEFAULT_LIMIT);
        assert_eq!(page_of("99999999999999999999"), i64::MAX.unsigned_abs());
        assert_eq!(page_of("-99999999999999999999"), 1);
    }

    #[test]
    fn page_falls_back_to_first() {
        assert_eq!(page_of("0"), 1);
        assert_eq!(page_of("-3"), 1);
        assert_eq!(page_of("two"), 1);
        assert_eq!(page_of("4"), 4);
    }

    #[test]
    fn unknown_type_means_both_partitions() {
        for value in ["transfer", "", "expenses", "1"] {
            let filter = TransactionFilter::normalize(&RawTransactionFilter {
                kind: Some(value.to_string()),
                ..raw()
            });
            assert_eq!(filter.kind, None, "type={value:?}");
            assert!(filter.includes(TransactionKind::Expense));
            assert!(filter.includes(TransactionKind::Income));
        }
    }

    #[test]
    fn known_type_restricts_partition() {
        let filter = TransactionFilter::normalize(&RawTransactionFilter {
            kind: Some(" Income".to_string()),
            ..raw()
        });
        assert_eq!(filter.kind, Some(TransactionKind::Income));
        assert!(!filter.includes(TransactionKind::Expense));
    }

    #[test]
    fn bad_category_ids_are_dropped() {
        let filter = TransactionFilter::normalize(&RawTransactionFilter {
            category_ids: Some("3, x,1,,3,9.5".to_string()),
            ..raw()
        });
        assert_eq!(filter.category_ids, Some(BTreeSet::from([1, 3])));

        let filter = TransactionFilter::normalize(&RawTransactionFilter {
            category_ids: Some("a,b".to_string()),
            ..raw()
        });
        assert_eq!(filter.category_ids, None);
    }

    #[test]
    fn malformed_dates_are_absent_bounds() {
        let filter = TransactionFilter::normalize(&RawTransactionFilter {
            start_date: Some("2024-01-13".to_string()),
            end_date: Some("16/01/2024".to_string()),
            ..raw()
        });
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2024, 1, 13));
        assert_eq!(filter.date_to, None);
    }

    #[test]
    fn push_down_only_for_single_partition() {
        let both = TransactionFilter {
            page: 3,
            limit: 10,
            ..TransactionFilter::default()
        };
        assert_eq!(both.push_down_window(), None);
        assert_eq!(both.offset(), 20);

        let expenses = TransactionFilter {
            kind: Some(TransactionKind::Expense),
            ..both
        };
        assert_eq!(
            expenses.push_down_window(),
            Some(PageWindow {
                offset: 20,
                limit: 10
            })
        );
    }

    #[test]
    fn huge_page_does_not_overflow() {
        let filter = TransactionFilter {
            page: u64::MAX,
            limit: MAX_LIMIT,
            ..TransactionFilter::default()
        };
        assert_eq!(filter.offset(), u64::MAX);
    }
}
