pub mod admins;
pub mod carts;
pub mod customers;
pub mod orders;
pub mod product_settings;
pub mod products;
pub mod reviews;
pub mod verifications;

pub use admins::Entity as Admins;
pub use carts::Entity as Carts;
pub use customers::Entity as Customers;
pub use orders::Entity as Orders;
pub use product_settings::Entity as ProductSettings;
pub use products::Entity as Products;
pub use reviews::Entity as Reviews;
pub use verifications::Entity as Verifications;
