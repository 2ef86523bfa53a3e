pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod ids;
pub mod middleware;
pub mod models;
pub mod notifications;
pub mod payments;
pub mod response;
pub mod routes;
pub mod state;
pub mod store;

pub mod dto {
    pub mod auth;
    pub mod cart;
    pub mod customers;
    pub mod dashboard;
    pub mod newsletter;
    pub mod orders;
    pub mod payments;
    pub mod products;
    pub mod settings;
}

pub mod services {
    pub mod auth_service;
    pub mod cart_service;
    pub mod customer_service;
    pub mod dashboard_service;
    pub mod maintenance;
    pub mod newsletter_service;
    pub mod order_service;
    pub mod payment_service;
    pub mod product_service;
    pub mod settings_service;
}
