use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Address, Customer, CustomerChanges, CustomerStatus};

/// Profile update. Only supplied fields change. `customer_id` and `status`
/// are honoured for admins only.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCustomerRequest {
    pub customer_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub avatar: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub dob: Option<String>,
    pub address: Option<Address>,
    pub status: Option<CustomerStatus>,
}

impl UpdateCustomerRequest {
    pub fn into_changes(self, allow_status: bool) -> CustomerChanges {
        CustomerChanges {
            first_name: self.first_name,
            last_name: self.last_name,
            avatar: self.avatar,
            phone_number: self.phone_number,
            gender: self.gender,
            dob: self.dob,
            address: self.address,
            status: self.status.filter(|_| allow_status),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct WishlistRequest {
    pub product_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerList {
    pub items: Vec<Customer>,
}
