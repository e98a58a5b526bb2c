//! Transactions API endpoints

use api_types::transaction::{
    TransactionKind as ApiKind, TransactionListResponse, TransactionNew, TransactionQuery,
    TransactionView,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{MoneyCents, NewRecordCmd, RawTransactionFilter, TransactionKind, TransactionRecord};

use crate::{ServerError, server::ServerState, user};

fn map_kind(kind: TransactionKind) -> ApiKind {
    match kind {
        TransactionKind::Expense => ApiKind::Expense,
        TransactionKind::Income => ApiKind::Income,
    }
}

fn view(record: TransactionRecord) -> TransactionView {
    TransactionView {
        id: record.id,
        user_id: record.user_id,
        category_id: record.category_id,
        currency_id: record.currency_id,
        amount: record.amount.to_string(),
        description: record.description,
        date: record.date,
        kind: map_kind(record.kind),
        created_at: record.created_at,
    }
}

/// Lists expenses and incomes as one paginated stream.
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let query = TransactionQuery::from_pairs(pairs);
    let raw = RawTransactionFilter {
        kind: query.kind,
        category_ids: query.category_ids,
        start_date: query.start_date,
        end_date: query.end_date,
        page: query.page,
        limit: query.limit,
    };

    let page = state.engine.query_transactions(user.id, &raw).await?;

    Ok(Json(TransactionListResponse {
        transactions: page.transactions.into_iter().map(view).collect(),
        total: page.total,
        page: page.page,
        limit: page.limit,
        total_pages: page.total_pages,
    }))
}

async fn create(
    state: &ServerState,
    user: &user::Model,
    kind: TransactionKind,
    payload: TransactionNew,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let amount: MoneyCents = payload.amount.parse()?;
    let record = state
        .engine
        .new_record(
            kind,
            NewRecordCmd {
                user_id: user.id,
                category_id: payload.category_id,
                currency_id: payload.currency_id,
                amount,
                description: payload.description,
                date: payload.date,
                created_at: None,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(view(record))))
}

pub async fn expense_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    create(&state, &user, TransactionKind::Expense, payload).await
}

pub async fn income_new(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    create(&state, &user, TransactionKind::Income, payload).await
}

pub async fn expense_get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionView>, ServerError> {
    let record = state
        .engine
        .transaction(user.id, TransactionKind::Expense, id)
        .await?;
    Ok(Json(view(record)))
}

pub async fn income_get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionView>, ServerError> {
    let record = state
        .engine
        .transaction(user.id, TransactionKind::Income, id)
        .await?;
    Ok(Json(view(record)))
}

pub async fn expense_delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_transaction(user.id, TransactionKind::Expense, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn income_delete(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_transaction(user.id, TransactionKind::Income, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
