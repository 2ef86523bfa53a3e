use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    dto::dashboard::CountedModel,
    error::{AppError, AppResult},
    models::{CustomerStatus, DeliveryStatus},
    store::{PageRequest, ProductSort},
};

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> AppResult<(i64, i64, i64)> {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1)
            .checked_mul(per_page)
            .ok_or_else(|| AppError::BadRequest("page is out of range".into()))?;
        Ok((page, per_page, offset))
    }

    /// Normalized page number and size, plus the matching store window.
    pub fn page_request(&self) -> AppResult<(i64, i64, PageRequest)> {
        let (page, per_page, offset) = self.normalize()?;
        Ok((
            page,
            per_page,
            PageRequest {
                offset: offset as u64,
                limit: per_page as u64,
            },
        ))
    }
}

#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
pub enum ProductSortBy {
    Newest,
    PriceLowToHigh,
    PriceHighToLow,
}

impl From<ProductSortBy> for ProductSort {
    fn from(sort: ProductSortBy) -> Self {
        match sort {
            ProductSortBy::Newest => ProductSort::Newest,
            ProductSortBy::PriceLowToHigh => ProductSort::PriceLowToHigh,
            ProductSortBy::PriceHighToLow => ProductSort::PriceHighToLow,
        }
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Comma-separated category names.
    pub categories: Option<String>,
    /// Comma-separated `min/max` sale price ranges, e.g. `0/500,1000/2000`.
    pub price: Option<String>,
    pub trending: Option<bool>,
    pub in_stock: Option<bool>,
    pub sort: Option<ProductSortBy>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct OrderListQuery {
    pub delivery_status: Option<DeliveryStatus>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerOrdersQuery {
    /// Required for admins; customers always get their own orders.
    pub customer_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RevenueQuery {
    /// Restrict to orders placed in the last N days.
    pub days: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CustomerListQuery {
    pub status: Option<CustomerStatus>,
}

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CountQuery {
    pub model: CountedModel,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_is_clamped() {
        let pagination = Pagination {
            page: Some(0),
            per_page: Some(500),
        };
        let (page, per_page, window) = pagination.page_request().unwrap();
        assert_eq!((page, per_page), (1, 100));
        assert_eq!(window, PageRequest { offset: 0, limit: 100 });

        let (_, _, window) = Pagination {
            page: Some(3),
            per_page: None,
        }
        .page_request()
        .unwrap();
        assert_eq!(window.offset, 40);

        let err = Pagination {
            page: Some(i64::MAX),
            per_page: Some(100),
        }
        .page_request()
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
