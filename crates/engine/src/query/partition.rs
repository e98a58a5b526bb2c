//! Per-partition reads.

use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Select,
};

use crate::{
    ResultEngine, TransactionKind, TransactionRecord, expenses, incomes,
    transactions::LedgerEntity,
};

use super::{PageWindow, TransactionFilter};

/// Matching rows of one partition.
///
/// `count` is the number of matches before any page slicing; `rows` is
/// either every match or, with a pushed-down window, one page of them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionRows {
    pub kind: TransactionKind,
    pub rows: Vec<TransactionRecord>,
    pub count: u64,
}

impl PartitionRows {
    pub fn empty(kind: TransactionKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
            count: 0,
        }
    }
}

/// Reads the rows of `kind` owned by `user_id` that match `filter`.
///
/// A partition excluded by the filter's kind is answered without touching
/// storage. `window` slices at the storage level and must only be given
/// when no other partition takes part in the query.
pub(crate) async fn read_partition<C>(
    conn: &C,
    kind: TransactionKind,
    user_id: i64,
    filter: &TransactionFilter,
    window: Option<PageWindow>,
) -> ResultEngine<PartitionRows>
where
    C: ConnectionTrait,
{
    if !filter.includes(kind) {
        return Ok(PartitionRows::empty(kind));
    }

    match kind {
        TransactionKind::Expense => {
            read::<expenses::Entity, C>(conn, user_id, filter, window).await
        }
        TransactionKind::Income => read::<incomes::Entity, C>(conn, user_id, filter, window).await,
    }
}

fn matching<E: LedgerEntity>(user_id: i64, filter: &TransactionFilter) -> Select<E> {
    let mut query = E::find().filter(E::user_id_column().eq(user_id));

    if let Some(ids) = &filter.category_ids {
        query = query.filter(E::category_id_column().is_in(ids.iter().copied()));
    }
    if let Some(from) = filter.date_from {
        query = query.filter(E::date_column().gte(from));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(E::date_column().lte(to));
    }

    query
}

async fn read<E, C>(
    conn: &C,
    user_id: i64,
    filter: &TransactionFilter,
    window: Option<PageWindow>,
) -> ResultEngine<PartitionRows>
where
    E: LedgerEntity,
    E::Model: Send + Sync + 'static,
    C: ConnectionTrait,
{
    let count = matching::<E>(user_id, filter).count(conn).await?;

    let mut query = matching::<E>(user_id, filter)
        .order_by_desc(E::date_column())
        .order_by_desc(E::created_at_column())
        .order_by_desc(E::id_column());

    if let Some(window) = window {
        if window.offset >= count {
            return Ok(PartitionRows {
                kind: E::KIND,
                rows: Vec::new(),
                count,
            });
        }
        query = query.offset(window.offset).limit(window.limit);
    }

    let rows = query
        .all(conn)
        .await?
        .into_iter()
        .map(E::into_record)
        .collect();

    Ok(PartitionRows {
        kind: E::KIND,
        rows,
        count,
    })
}
