use sea_orm::TransactionTrait;

use crate::{
    ResultEngine, TransactionKind,
    query::{RawTransactionFilter, TransactionFilter, TransactionPage, merge, read_partition},
};

use super::super::{Engine, with_tx};

impl Engine {
    /// Lists a user's expenses and incomes as one stream, from raw filter
    /// input.
    ///
    /// Malformed filter values never fail the call; they widen the result
    /// (see [`TransactionFilter::normalize`]). Only storage errors are
    /// returned.
    pub async fn query_transactions(
        &self,
        user_id: i64,
        raw: &RawTransactionFilter,
    ) -> ResultEngine<TransactionPage> {
        let filter = TransactionFilter::normalize(raw);
        self.query_transactions_with(user_id, &filter).await
    }

    /// Lists a user's expenses and incomes as one stream.
    ///
    /// Ordering is `date DESC, created_at DESC`. `total` counts matches in
    /// every partition. A page past the end is empty, not an error.
    ///
    /// Every partition is read in the same DB transaction, so the counts and
    /// the rows come from one snapshot.
    pub async fn query_transactions_with(
        &self,
        user_id: i64,
        filter: &TransactionFilter,
    ) -> ResultEngine<TransactionPage> {
        with_tx!(self, |db_tx| {
            let window = filter.push_down_window();

            let mut partitions = Vec::with_capacity(TransactionKind::ALL.len());
            for kind in TransactionKind::ALL {
                let rows = read_partition(&db_tx, kind, user_id, filter, window).await?;
                tracing::debug!(
                    kind = kind.as_str(),
                    count = rows.count,
                    fetched = rows.rows.len(),
                    "partition read"
                );
                partitions.push(rows);
            }

            let page = merge(filter, partitions);
            tracing::debug!(
                user_id,
                total = page.total,
                page = page.page,
                limit = page.limit,
                pushed_down = window.is_some(),
                "transactions query"
            );
            Ok(page)
        })
    }
}
