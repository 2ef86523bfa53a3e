use chrono::{Months, Utc};

use crate::{
    dto::dashboard::{CollectionCount, CountedModel, SoldProducts, SoldProductsList},
    error::{AppError, AppResult},
    middleware::auth::{Identity, ensure_admin},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Line items of every order placed in the last calendar month, newest
/// first.
pub async fn sold_products(
    state: &AppState,
    identity: &Identity,
) -> AppResult<ApiResponse<SoldProductsList>> {
    ensure_admin(identity)?;
    let since = Utc::now()
        .checked_sub_months(Months::new(1))
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("date out of range")))?;

    let items = state
        .store
        .find_orders_since(since)
        .await?
        .into_iter()
        .map(|order| SoldProducts {
            order_id: order.id,
            products: order.products,
            created_at: order.created_at,
        })
        .collect();

    Ok(ApiResponse::success(
        "Sold products",
        SoldProductsList { items, since },
        Some(Meta::empty()),
    ))
}

pub async fn count(
    state: &AppState,
    identity: &Identity,
    model: CountedModel,
) -> AppResult<ApiResponse<CollectionCount>> {
    ensure_admin(identity)?;
    let count = match model {
        CountedModel::Products => state.store.count_products().await?,
        CountedModel::Orders => state.store.count_orders().await?,
        CountedModel::Customers => state.store.count_customers().await?,
    };
    Ok(ApiResponse::success(
        "Fetched total count of collection successfully",
        CollectionCount { model, count },
        Some(Meta::empty()),
    ))
}
