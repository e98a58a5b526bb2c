use sea_orm::{QueryFilter, TransactionTrait, prelude::*};

use crate::{
    EngineError, NewRecordCmd, ResultEngine, TransactionKind, TransactionRecord, expenses, incomes,
    transactions::{LedgerEntity, NewRecord},
};

use super::super::{Engine, with_tx};

fn not_found(kind: TransactionKind, id: i64) -> EngineError {
    EngineError::KeyNotFound(format!("{} {id}", kind.as_str()))
}

async fn find_owned<E, C>(conn: &C, user_id: i64, id: i64) -> ResultEngine<Option<E::Model>>
where
    E: LedgerEntity,
    C: ConnectionTrait,
{
    Ok(E::find()
        .filter(E::id_column().eq(id))
        .filter(E::user_id_column().eq(user_id))
        .one(conn)
        .await?)
}

async fn delete_owned<E, C>(conn: &C, user_id: i64, id: i64) -> ResultEngine<u64>
where
    E: LedgerEntity,
    C: ConnectionTrait,
{
    let res = E::delete_many()
        .filter(E::id_column().eq(id))
        .filter(E::user_id_column().eq(user_id))
        .exec(conn)
        .await?;
    Ok(res.rows_affected)
}

impl Engine {
    /// Records an expense. `created_at` defaults to now.
    pub async fn new_expense(&self, cmd: NewRecordCmd) -> ResultEngine<TransactionRecord> {
        self.new_record(TransactionKind::Expense, cmd).await
    }

    /// Records an income. `created_at` defaults to now.
    pub async fn new_income(&self, cmd: NewRecordCmd) -> ResultEngine<TransactionRecord> {
        self.new_record(TransactionKind::Income, cmd).await
    }

    /// Inserts a record in the partition named by `kind`.
    ///
    /// Category and currency ids are stored as given; checking that they
    /// exist belongs to the caller.
    pub async fn new_record(
        &self,
        kind: TransactionKind,
        cmd: NewRecordCmd,
    ) -> ResultEngine<TransactionRecord> {
        let record = NewRecord::try_from(cmd)?;
        let inserted = match kind {
            TransactionKind::Expense => {
                let model = expenses::ActiveModel::from(&record)
                    .insert(&self.database)
                    .await?;
                <expenses::Entity as LedgerEntity>::into_record(model)
            }
            TransactionKind::Income => {
                let model = incomes::ActiveModel::from(&record)
                    .insert(&self.database)
                    .await?;
                <incomes::Entity as LedgerEntity>::into_record(model)
            }
        };
        tracing::debug!(kind = kind.as_str(), id = inserted.id, "record created");
        Ok(inserted)
    }

    /// Returns one record owned by `user_id`.
    ///
    /// A record owned by someone else is reported exactly like a missing
    /// one.
    pub async fn transaction(
        &self,
        user_id: i64,
        kind: TransactionKind,
        id: i64,
    ) -> ResultEngine<TransactionRecord> {
        let record = match kind {
            TransactionKind::Expense => {
                find_owned::<expenses::Entity, _>(&self.database, user_id, id)
                    .await?
                    .map(<expenses::Entity as LedgerEntity>::into_record)
            }
            TransactionKind::Income => {
                find_owned::<incomes::Entity, _>(&self.database, user_id, id)
                    .await?
                    .map(<incomes::Entity as LedgerEntity>::into_record)
            }
        };
        record.ok_or_else(|| not_found(kind, id))
    }

    /// Deletes one record owned by `user_id`.
    pub async fn delete_transaction(
        &self,
        user_id: i64,
        kind: TransactionKind,
        id: i64,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let deleted = match kind {
                TransactionKind::Expense => {
                    delete_owned::<expenses::Entity, _>(&db_tx, user_id, id).await?
                }
                TransactionKind::Income => {
                    delete_owned::<incomes::Entity, _>(&db_tx, user_id, id).await?
                }
            };
            if deleted == 0 {
                return Err(not_found(kind, id));
            }
            tracing::debug!(kind = kind.as_str(), id, "record deleted");
            Ok(())
        })
    }
}
