//! Transaction primitives.
//!
//! Expense and income facts live in two separate tables (partitions). A
//! `TransactionRecord` is the unified, read-only view built from a row of
//! either partition; it is never stored as such.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, EntityTrait};

use crate::{EngineError, MoneyCents, expenses, incomes};

/// Tag of the partition a record comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    /// Every partition, in read order.
    ///
    /// Records with an identical `(date, created_at)` key keep this order
    /// after a cross-partition merge.
    pub const ALL: [TransactionKind; 2] = [Self::Expense, Self::Income];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }
}

/// A ledger fact as seen by readers.
///
/// `id` is unique only inside the partition named by `kind`: expense and
/// income ids come from independent sequences.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionRecord {
    pub id: i64,
    pub user_id: i64,
    pub category_id: i64,
    pub currency_id: i64,
    pub amount: MoneyCents,
    pub description: String,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a ledger fact in either partition.
#[derive(Clone, Debug)]
pub struct NewRecordCmd {
    pub user_id: i64,
    pub category_id: i64,
    pub currency_id: i64,
    pub amount: MoneyCents,
    pub description: Option<String>,
    pub date: NaiveDate,
    /// Persistence timestamp; `None` means "now".
    pub created_at: Option<DateTime<Utc>>,
}

/// Validated row content shared by both partitions.
#[derive(Clone, Debug)]
pub(crate) struct NewRecord {
    pub user_id: i64,
    pub category_id: i64,
    pub currency_id: i64,
    pub amount_minor: i64,
    pub description: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<NewRecordCmd> for NewRecord {
    type Error = EngineError;

    fn try_from(cmd: NewRecordCmd) -> Result<Self, Self::Error> {
        if cmd.amount.is_negative() {
            return Err(EngineError::InvalidAmount(
                "amount must be >= 0".to_string(),
            ));
        }
        Ok(Self {
            user_id: cmd.user_id,
            category_id: cmd.category_id,
            currency_id: cmd.currency_id,
            amount_minor: cmd.amount.cents(),
            description: cmd
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            date: cmd.date,
            created_at: cmd.created_at.unwrap_or_else(Utc::now),
        })
    }
}

/// Capability shared by the partition entities.
///
/// Each partition table implements it once; readers and the merger only
/// ever see `TransactionRecord`s, so adding a partition means adding an
/// implementor, not touching the merge.
pub(crate) trait LedgerEntity: EntityTrait {
    const KIND: TransactionKind;

    fn id_column() -> Self::Column;
    fn user_id_column() -> Self::Column;
    fn category_id_column() -> Self::Column;
    fn date_column() -> Self::Column;
    fn created_at_column() -> Self::Column;

    fn into_record(model: Self::Model) -> TransactionRecord;
}

macro_rules! ledger_entity {
    ($module:ident, $kind:expr) => {
        impl LedgerEntity for $module::Entity {
            const KIND: TransactionKind = $kind;

            fn id_column() -> Self::Column {
                $module::Column::Id
            }

            fn user_id_column() -> Self::Column {
                $module::Column::UserId
            }

            fn category_id_column() -> Self::Column {
                $module::Column::CategoryId
            }

            fn date_column() -> Self::Column {
                $module::Column::Date
            }

            fn created_at_column() -> Self::Column {
                $module::Column::CreatedAt
            }

            fn into_record(model: $module::Model) -> TransactionRecord {
                TransactionRecord {
                    id: model.id,
                    user_id: model.user_id,
                    category_id: model.category_id,
                    currency_id: model.currency_id,
                    amount: MoneyCents::new(model.amount_minor),
                    description: model.description,
                    date: model.date,
                    kind: Self::KIND,
                    created_at: model.created_at,
                }
            }
        }

        impl From<&NewRecord> for $module::ActiveModel {
            fn from(record: &NewRecord) -> Self {
                Self {
                    id: ActiveValue::NotSet,
                    user_id: ActiveValue::Set(record.user_id),
                    category_id: ActiveValue::Set(record.category_id),
                    currency_id: ActiveValue::Set(record.currency_id),
                    amount_minor: ActiveValue::Set(record.amount_minor),
                    description: ActiveValue::Set(record.description.clone()),
                    date: ActiveValue::Set(record.date),
                    created_at: ActiveValue::Set(record.created_at),
                }
            }
        }
    };
}

ledger_entity!(expenses, TransactionKind::Expense);
ledger_entity!(incomes, TransactionKind::Income);

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(amount: i64) -> NewRecordCmd {
        NewRecordCmd {
            user_id: 1,
            category_id: 2,
            currency_id: 3,
            amount: MoneyCents::new(amount),
            description: Some("  lunch ".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            created_at: None,
        }
    }

    #[test]
    fn negative_amount_is_rejected() {
        let err = NewRecord::try_from(cmd(-1)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidAmount("amount must be >= 0".to_string())
        );
    }

    #[test]
    fn zero_amount_and_trimmed_description_are_kept() {
        let record = NewRecord::try_from(cmd(0)).unwrap();
        assert_eq!(record.amount_minor, 0);
        assert_eq!(record.description, "lunch");
    }

    #[test]
    fn model_conversion_tags_partition() {
        let model = incomes::Model {
            id: 7,
            user_id: 1,
            category_id: 2,
            currency_id: 3,
            amount_minor: 1250,
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2024, 1, 12).unwrap(),
            created_at: Utc::now(),
        };
        let record = <incomes::Entity as LedgerEntity>::into_record(model);
        assert_eq!(record.kind, TransactionKind::Income);
        assert_eq!(record.amount.to_string(), "12.50");
    }
}
