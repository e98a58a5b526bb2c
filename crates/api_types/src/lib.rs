//! Wire types shared by the HTTP server and its clients.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Expense,
        Income,
    }

    /// Query string of `GET /transactions`.
    ///
    /// Every field is kept as a raw string: malformed values are normalized
    /// by the engine instead of rejecting the request.
    #[derive(Clone, Debug, Default, Serialize, Deserialize)]
    pub struct TransactionQuery {
        /// `expense` or `income`; anything else lists both.
        #[serde(rename = "type")]
        pub kind: Option<String>,
        /// Comma separated category ids.
        pub category_ids: Option<String>,
        /// Inclusive, `YYYY-MM-DD`.
        pub start_date: Option<String>,
        /// Inclusive, `YYYY-MM-DD`.
        pub end_date: Option<String>,
        /// 1-based, defaults to 1.
        pub page: Option<String>,
        /// Defaults to 20, capped at 100.
        pub limit: Option<String>,
    }

    impl TransactionQuery {
        /// Folds decoded query-string pairs into a query.
        ///
        /// The first occurrence of a key wins; repeated and unknown keys are
        /// ignored.
        pub fn from_pairs<I>(pairs: I) -> Self
        where
            I: IntoIterator<Item = (String, String)>,
        {
            let mut query = Self::default();
            for (key, value) in pairs {
                let slot = match key.as_str() {
                    "type" => &mut query.kind,
                    "category_ids" => &mut query.category_ids,
                    "start_date" => &mut query.start_date,
                    "end_date" => &mut query.end_date,
                    "page" => &mut query.page,
                    "limit" => &mut query.limit,
                    _ => continue,
                };
                if slot.is_none() {
                    *slot = Some(value);
                }
            }
            query
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TransactionView {
        /// Unique only within `type`.
        pub id: i64,
        pub user_id: i64,
        pub category_id: i64,
        pub currency_id: i64,
        /// Decimal string with two fractional digits, e.g. `"12.50"`.
        pub amount: String,
        pub description: String,
        pub date: NaiveDate,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        pub total: u64,
        pub page: u64,
        pub limit: u64,
        pub total_pages: u64,
    }

    /// Request body for `POST /expenses` and `POST /incomes`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub category_id: i64,
        pub currency_id: i64,
        /// Non-negative decimal string; `.` or `,` separator, at most two
        /// decimals.
        pub amount: String,
        pub description: Option<String>,
        pub date: NaiveDate,
    }
}
