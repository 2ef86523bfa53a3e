use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{
            ChangeAdminPasswordRequest, ChangePasswordRequest, LoginRequest, LoginResponse,
            RegisterRequest, ResetPasswordRequest, VerificationCodeRequest,
        },
        cart::{AddItemRequest, CartView, ChangeQuantityRequest, QuantityAction, RemoveItemRequest},
        customers::{CustomerList, UpdateCustomerRequest, WishlistRequest},
        dashboard::{CollectionCount, CountedModel, SoldProducts, SoldProductsList},
        newsletter::NewsletterRequest,
        orders::{
            CreateOrderRequest, CreatedOrder, EditOrderRequest, OrderCustomerInput, OrderList,
            RevenueSummary,
        },
        payments::{
            CashfreeOrderRequest, RazorpayCheckout, RazorpayOrderRequest, StripeIntentRequest,
        },
        products::{
            AddReviewRequest, ProductDetail, ProductList, TrendingRequest, UpsertProductRequest,
            VariantInput,
        },
        settings::{UpsertSettingsRequest, VariantOptionInput, VariantTaxonomyInput},
    },
    models::{
        Address, Customer, CustomerStatus, DeliveryStatus, LineItem, Order, OrderCustomer,
        PaymentStatus, Product, ProductSettings, ProductType, Review, ReviewAuthor,
        VariantCombination, VariantDefinition, VariantOption,
    },
    payments::{CashfreeCustomer, PaymentIntent, RazorpayOrder, StripeShipping},
    response::{ApiResponse, Meta},
    routes::{
        auth, cart, customers, dashboard, health, newsletter, orders, params, payments, products,
        settings,
    },
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("access_token"))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register,
        auth::login,
        auth::admin_login,
        auth::logout,
        auth::send_verification_code,
        auth::reset_password,
        auth::change_password,
        auth::change_admin_password,
        cart::get_cart,
        cart::add_item,
        cart::change_quantity,
        cart::remove_item,
        products::list_products,
        products::upsert_product,
        products::search_products,
        products::out_of_stock,
        products::get_product_by_name,
        products::get_product,
        products::delete_product,
        products::set_trending,
        products::add_review,
        settings::get_settings,
        settings::upsert_settings,
        settings::upsert_variant,
        settings::delete_variant,
        orders::create_order,
        orders::list_orders,
        orders::customer_orders,
        orders::revenue,
        orders::get_order,
        orders::edit_order,
        customers::get_me,
        customers::update_customer,
        customers::list_customers,
        customers::get_customer,
        customers::add_to_wishlist,
        customers::wishlist,
        payments::stripe,
        payments::razorpay,
        payments::cashfree,
        dashboard::sold_products,
        dashboard::count,
        newsletter::subscribe
    ),
    components(
        schemas(
            Address,
            LineItem,
            Product,
            ProductType,
            Review,
            ReviewAuthor,
            VariantCombination,
            ProductSettings,
            VariantDefinition,
            VariantOption,
            Order,
            OrderCustomer,
            PaymentStatus,
            DeliveryStatus,
            Customer,
            CustomerStatus,
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            VerificationCodeRequest,
            ResetPasswordRequest,
            ChangePasswordRequest,
            ChangeAdminPasswordRequest,
            AddItemRequest,
            ChangeQuantityRequest,
            RemoveItemRequest,
            QuantityAction,
            CartView,
            UpsertProductRequest,
            VariantInput,
            TrendingRequest,
            ProductList,
            ProductDetail,
            AddReviewRequest,
            UpsertSettingsRequest,
            VariantTaxonomyInput,
            VariantOptionInput,
            CreateOrderRequest,
            OrderCustomerInput,
            CreatedOrder,
            EditOrderRequest,
            OrderList,
            RevenueSummary,
            UpdateCustomerRequest,
            WishlistRequest,
            CustomerList,
            StripeIntentRequest,
            StripeShipping,
            PaymentIntent,
            RazorpayOrderRequest,
            RazorpayOrder,
            RazorpayCheckout,
            CashfreeOrderRequest,
            CashfreeCustomer,
            SoldProducts,
            SoldProductsList,
            CountedModel,
            CollectionCount,
            NewsletterRequest,
            params::Pagination,
            params::ProductQuery,
            params::ProductSortBy,
            params::OrderListQuery,
            params::RevenueQuery,
            params::CustomerListQuery,
            params::CountQuery,
            health::HealthData,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<ProductDetail>,
            ApiResponse<CartView>,
            ApiResponse<Order>,
            ApiResponse<OrderList>,
            ApiResponse<Customer>,
            ApiResponse<LoginResponse>
        )
    ),
    security(
        ("bearer_auth" = []),
        ("cookie_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Login, registration and password recovery"),
        (name = "Cart", description = "Guest and customer carts"),
        (name = "Products", description = "Catalog endpoints"),
        (name = "Settings", description = "Categories and variant taxonomies"),
        (name = "Orders", description = "Checkout and order management"),
        (name = "Customers", description = "Profiles and wishlists"),
        (name = "Payments", description = "Payment gateway sessions"),
        (name = "Dashboard", description = "Admin sales figures"),
        (name = "Newsletter", description = "Marketing list signups"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
