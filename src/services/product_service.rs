use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{
    dto::products::{AddReviewRequest, ProductDetail, ProductList, UpsertProductRequest},
    error::{AppError, AppResult},
    ids::new_document_id,
    middleware::auth::{Identity, ensure_admin, ensure_customer},
    models::{Product, Review, ReviewAuthor, VariantCombination},
    response::{ApiResponse, Meta},
    routes::params::{Pagination, ProductQuery},
    state::AppState,
    store::{ProductFilter, StoreError},
};

const DUPLICATE_NAME: &str = "Please use different name!";
const PRICE_ORDER: &str = "Sale price can't be greater than regular price";

fn product_not_found() -> AppError {
    AppError::NotFound("Product not found".into())
}

fn duplicate_name(err: StoreError) -> AppError {
    match err {
        StoreError::Duplicate(_) => AppError::BadRequest(DUPLICATE_NAME.into()),
        other => other.into(),
    }
}

/// Sale price may never exceed regular price, at the top level or on any
/// variant that declares both.
fn validate_prices(payload: &UpsertProductRequest) -> AppResult<()> {
    if payload.sale_price > payload.regular_price {
        return Err(AppError::BadRequest(PRICE_ORDER.into()));
    }
    let variant_violation = payload.variants.iter().any(|variant| {
        matches!(
            (variant.sale_price, variant.regular_price),
            (Some(sale), Some(regular)) if sale > regular
        )
    });
    if variant_violation {
        return Err(AppError::BadRequest(PRICE_ORDER.into()));
    }
    Ok(())
}

fn build_product(
    id: String,
    payload: UpsertProductRequest,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Product {
    let variants = payload
        .variants
        .into_iter()
        .map(|variant| VariantCombination {
            id: variant.id.unwrap_or_else(new_document_id),
            attributes: variant.attributes,
            images: variant.images,
            regular_price: variant.regular_price,
            sale_price: variant.sale_price,
            tax: variant.tax,
            stock: variant.stock,
        })
        .collect();

    Product {
        id,
        name: payload.name.trim().to_string(),
        description: payload.description,
        category: payload.category,
        product_type: payload.product_type,
        images: payload.images,
        regular_price: payload.regular_price,
        sale_price: payload.sale_price,
        tax: payload.tax,
        stock: payload.stock,
        variants,
        trending: payload.trending,
        created_at,
        updated_at,
    }
}

pub async fn upsert_product(
    state: &AppState,
    identity: &Identity,
    payload: UpsertProductRequest,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(identity)?;
    validate_prices(&payload)?;

    let now = Utc::now();
    match payload.id.clone() {
        None => {
            if state
                .store
                .find_product_by_name(payload.name.trim())
                .await?
                .is_some()
            {
                return Err(AppError::BadRequest(DUPLICATE_NAME.into()));
            }

            let product = build_product(new_document_id(), payload, now, now);
            state
                .store
                .insert_product(&product)
                .await
                .map_err(duplicate_name)?;

            tracing::info!(product_id = %product.id, "product created");
            Ok(ApiResponse::success(
                "Added successfully",
                product,
                Some(Meta::empty()),
            ))
        }
        Some(id) => {
            let existing = state
                .store
                .find_product(&id)
                .await?
                .ok_or_else(product_not_found)?;

            let product = build_product(id, payload, existing.created_at, now);
            if !state
                .store
                .replace_product(&product)
                .await
                .map_err(duplicate_name)?
            {
                return Err(product_not_found());
            }

            tracing::info!(product_id = %product.id, "product updated");
            Ok(ApiResponse::success(
                "Updated successfully",
                product,
                Some(Meta::empty()),
            ))
        }
    }
}

/// Attaches reviews to each product with a single store round trip.
pub(crate) async fn with_reviews(
    state: &AppState,
    products: Vec<Product>,
) -> AppResult<Vec<ProductDetail>> {
    let ids: Vec<String> = products.iter().map(|p| p.id.clone()).collect();
    let mut by_product: HashMap<String, Vec<Review>> = HashMap::new();
    for review in state.store.find_reviews_for_products(&ids).await? {
        by_product
            .entry(review.product_id.clone())
            .or_default()
            .push(review);
    }
    Ok(products
        .into_iter()
        .map(|product| ProductDetail {
            reviews: by_product.remove(&product.id).unwrap_or_default(),
            product,
        })
        .collect())
}

async fn detail(state: &AppState, product: Product) -> AppResult<ProductDetail> {
    with_reviews(state, vec![product])
        .await?
        .pop()
        .ok_or_else(product_not_found)
}

pub async fn get_product(state: &AppState, id: &str) -> AppResult<ApiResponse<ProductDetail>> {
    let product = state
        .store
        .find_product(id)
        .await?
        .ok_or_else(product_not_found)?;
    Ok(ApiResponse::success("Product", detail(state, product).await?, None))
}

/// Looks a product up by its URL slug: hyphens stand for spaces and case is
/// ignored. The whole name must match.
pub async fn get_product_by_name(
    state: &AppState,
    slug: &str,
) -> AppResult<ApiResponse<ProductDetail>> {
    let name = slug.replace('-', " ");
    let product = state
        .store
        .find_product_by_name(name.trim())
        .await?
        .ok_or_else(product_not_found)?;
    Ok(ApiResponse::success("Product", detail(state, product).await?, None))
}

/// One review per product per order, written by the customer who placed
/// the order.
pub async fn add_review(
    state: &AppState,
    identity: &Identity,
    product_id: &str,
    payload: AddReviewRequest,
) -> AppResult<ApiResponse<Review>> {
    let customer_id = ensure_customer(identity)?;
    if !payload.rating.is_finite() || !(1.0..=5.0).contains(&payload.rating) {
        return Err(AppError::BadRequest("Rating must be between 1 and 5".into()));
    }

    state
        .store
        .find_product(product_id)
        .await?
        .ok_or_else(product_not_found)?;

    let purchased = state
        .store
        .find_order(&payload.order_id)
        .await?
        .filter(|order| order.customer.customer_id == customer_id)
        .is_some_and(|order| order.products.iter().any(|item| item.product_id == product_id));
    if !purchased {
        return Err(AppError::BadRequest("Only purchased products can be reviewed".into()));
    }

    let author = state
        .store
        .find_customer(customer_id)
        .await?
        .map(|customer| ReviewAuthor {
            first_name: customer.first_name,
            last_name: customer.last_name,
        })
        .unwrap_or(ReviewAuthor {
            first_name: None,
            last_name: None,
        });

    let review = Review {
        id: new_document_id(),
        product_id: product_id.to_string(),
        customer_id: customer_id.to_string(),
        customer: author,
        order_id: payload.order_id,
        rating: payload.rating,
        comment: payload
            .comment
            .map(|comment| comment.trim().to_string())
            .filter(|comment| !comment.is_empty()),
        media: payload.media,
        created_at: Utc::now(),
    };
    state
        .store
        .insert_review(&review)
        .await
        .map_err(|err| match err {
            StoreError::Duplicate(_) => {
                AppError::BadRequest("Product already reviewed for this order".into())
            }
            other => other.into(),
        })?;

    tracing::info!(review_id = %review.id, product_id = %product_id, "review added");
    Ok(ApiResponse::success(
        "Review added successfully",
        review,
        Some(Meta::empty()),
    ))
}

fn parse_price_ranges(raw: &str) -> AppResult<Vec<(f64, f64)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|range| !range.is_empty())
        .map(|range| {
            let (min, max) = range
                .split_once('/')
                .ok_or_else(|| AppError::BadRequest(format!("Invalid price range '{range}'")))?;
            match (min.trim().parse::<f64>(), max.trim().parse::<f64>()) {
                (Ok(min), Ok(max)) => Ok((min, max)),
                _ => Err(AppError::BadRequest(format!("Invalid price range '{range}'"))),
            }
        })
        .collect()
}

pub fn filter_from_query(query: &ProductQuery) -> AppResult<ProductFilter> {
    let categories = query
        .categories
        .as_deref()
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let price_ranges = match query.price.as_deref() {
        Some(raw) => parse_price_ranges(raw)?,
        None => Vec::new(),
    };

    Ok(ProductFilter {
        categories,
        price_ranges,
        trending: query.trending.unwrap_or(false),
        in_stock: query.in_stock.unwrap_or(false),
        sort: query.sort.map(Into::into).unwrap_or_default(),
        ..ProductFilter::default()
    })
}

async fn list_with(
    state: &AppState,
    filter: ProductFilter,
    pagination: &Pagination,
    message: &str,
) -> AppResult<ApiResponse<ProductList>> {
    let (page, per_page, window) = pagination.page_request()?;
    let (products, total) = state.store.list_products(&filter, window).await?;
    let items = with_reviews(state, products).await?;
    Ok(ApiResponse::success(
        message,
        ProductList { items },
        Some(Meta::new(page, per_page, total as i64)),
    ))
}

pub async fn list_products(
    state: &AppState,
    pagination: Pagination,
    query: ProductQuery,
) -> AppResult<ApiResponse<ProductList>> {
    let filter = filter_from_query(&query)?;
    list_with(state, filter, &pagination, "Products").await
}

pub async fn search_products(
    state: &AppState,
    pagination: Pagination,
    term: &str,
) -> AppResult<ApiResponse<ProductList>> {
    let term = term.trim();
    if term.is_empty() {
        return Err(AppError::BadRequest("Search term is required".into()));
    }
    let filter = ProductFilter {
        search: Some(term.to_string()),
        ..ProductFilter::default()
    };
    list_with(state, filter, &pagination, "Search results").await
}

pub async fn out_of_stock_products(
    state: &AppState,
    identity: &Identity,
    pagination: Pagination,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(identity)?;
    let filter = ProductFilter {
        out_of_stock: true,
        ..ProductFilter::default()
    };
    list_with(state, filter, &pagination, "Out of stock products").await
}

pub async fn set_trending(
    state: &AppState,
    identity: &Identity,
    id: &str,
    trending: bool,
) -> AppResult<ApiResponse<Product>> {
    ensure_admin(identity)?;
    let product = state
        .store
        .set_trending(id, trending)
        .await?
        .ok_or_else(product_not_found)?;
    Ok(ApiResponse::success("Success", product, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    identity: &Identity,
    id: &str,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(identity)?;
    if !state.store.delete_product(id).await? {
        return Err(product_not_found());
    }

    tracing::info!(product_id = %id, "product deleted");
    Ok(ApiResponse::success(
        "Deleted successfully",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_ranges_parse_min_max_pairs() {
        assert_eq!(
            parse_price_ranges("0/500, 1000/2000").unwrap(),
            vec![(0.0, 500.0), (1000.0, 2000.0)]
        );
        assert!(parse_price_ranges("cheap").is_err());
        assert!(parse_price_ranges("10/abc").is_err());
    }

    #[test]
    fn query_categories_are_split_and_trimmed() {
        let query = ProductQuery {
            categories: Some("shoes, bags,,".into()),
            ..ProductQuery::default()
        };
        let filter = filter_from_query(&query).unwrap();
        assert_eq!(filter.categories, vec!["shoes", "bags"]);
        assert!(!filter.in_stock);
    }
}
