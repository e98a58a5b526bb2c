//! Cross-partition merge and pagination.

use std::cmp::Ordering;

use crate::TransactionRecord;

use super::{PartitionRows, TransactionFilter};

/// One page of the unified transaction stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionPage {
    pub transactions: Vec<TransactionRecord>,
    /// Matches across every partition, independent of the page.
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// Canonical stream order: newest `date` first, then newest `created_at`.
pub fn canonical_order(a: &TransactionRecord, b: &TransactionRecord) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

/// `ceil(total / limit)`, `0` for an empty result.
pub fn total_pages(total: u64, limit: u64) -> u64 {
    debug_assert!(limit >= 1, "limit is normalized to >= 1");
    total.div_ceil(limit.max(1))
}

/// Combines partition reads into the requested page.
///
/// Single-partition queries were paged by storage and pass through
/// unchanged. Otherwise every match is materialized, sorted with a stable
/// sort (equal keys keep partition read order) and sliced in memory.
pub fn merge(filter: &TransactionFilter, partitions: Vec<PartitionRows>) -> TransactionPage {
    let total: u64 = partitions.iter().map(|p| p.count).sum();

    let transactions = if filter.is_single_partition() {
        partitions.into_iter().flat_map(|p| p.rows).collect()
    } else {
        let mut all: Vec<TransactionRecord> =
            partitions.into_iter().flat_map(|p| p.rows).collect();
        debug_assert_eq!(
            all.len() as u64,
            total,
            "unbounded partition reads return every counted row"
        );
        all.sort_by(canonical_order);

        let start = usize::try_from(filter.offset()).unwrap_or(usize::MAX);
        if start >= all.len() {
            Vec::new()
        } else {
            let limit = usize::try_from(filter.limit).unwrap_or(usize::MAX);
            all.into_iter().skip(start).take(limit).collect()
        }
    };

    TransactionPage {
        transactions,
        total,
        page: filter.page,
        limit: filter.limit,
        total_pages: total_pages(total, filter.limit),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::{MoneyCents, TransactionKind};

    fn record(kind: TransactionKind, id: i64, date: (u32, u32), hour: u32) -> TransactionRecord {
        TransactionRecord {
            id,
            user_id: 1,
            category_id: 1,
            currency_id: 1,
            amount: MoneyCents::new(100),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, date.0, date.1).unwrap(),
            kind,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
        }
    }

    fn rows(kind: TransactionKind, rows: Vec<TransactionRecord>) -> PartitionRows {
        PartitionRows {
            kind,
            count: rows.len() as u64,
            rows,
        }
    }

    fn sample() -> Vec<PartitionRows> {
        use TransactionKind::*;
        vec![
            rows(
                Expense,
                vec![
                    record(Expense, 3, (1, 15), 11),
                    record(Expense, 2, (1, 15), 10),
                    record(Expense, 1, (1, 10), 9),
                ],
            ),
            rows(
                Income,
                vec![record(Income, 2, (1, 20), 9), record(Income, 1, (1, 12), 9)],
            ),
        ]
    }

    fn keys(page: &TransactionPage) -> Vec<(TransactionKind, i64)> {
        page.transactions.iter().map(|r| (r.kind, r.id)).collect()
    }

    fn filter(page: u64, limit: u64) -> TransactionFilter {
        TransactionFilter {
            page,
            limit,
            ..TransactionFilter::default()
        }
    }

    #[test]
    fn interleaves_partitions_in_canonical_order() {
        use TransactionKind::*;
        let page = merge(&filter(1, 10), sample());
        assert_eq!(
            keys(&page),
            vec![(Income, 2), (Expense, 3), (Expense, 2), (Income, 1), (Expense, 1)]
        );
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn slices_after_merging() {
        use TransactionKind::*;
        let page = merge(&filter(2, 2), sample());
        assert_eq!(keys(&page), vec![(Expense, 2), (Income, 1)]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);

        let last = merge(&filter(3, 2), sample());
        assert_eq!(keys(&last), vec![(Expense, 1)]);
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let page = merge(&filter(4, 2), sample());
        assert!(page.transactions.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 4);
    }

    #[test]
    fn equal_keys_keep_partition_order() {
        use TransactionKind::*;
        let partitions = vec![
            rows(Expense, vec![record(Expense, 1, (1, 5), 8)]),
            rows(Income, vec![record(Income, 1, (1, 5), 8)]),
        ];
        let page = merge(&filter(1, 10), partitions);
        assert_eq!(keys(&page), vec![(Expense, 1), (Income, 1)]);
    }

    #[test]
    fn single_partition_passes_through() {
        use TransactionKind::*;
        // Storage already applied the window: page 2 of 3 matches, limit 2.
        let partitions = vec![
            PartitionRows {
                kind: Expense,
                rows: vec![record(Expense, 1, (1, 10), 9)],
                count: 3,
            },
            PartitionRows::empty(Income),
        ];
        let page = merge(
            &TransactionFilter {
                kind: Some(Expense),
                ..filter(2, 2)
            },
            partitions,
        );
        assert_eq!(keys(&page), vec![(Expense, 1)]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn no_partitions_means_no_pages() {
        let page = merge(&filter(1, 20), Vec::new());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
        assert!(page.transactions.is_empty());
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
    }
}
