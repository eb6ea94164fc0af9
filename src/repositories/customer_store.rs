use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;

use crate::entities::{customer, Customer, CustomerModel};
use crate::errors::ServiceError;

use super::{CustomerStore, NewCustomer};

/// sea-orm implementation of [`CustomerStore`].
#[derive(Clone)]
pub struct SeaOrmCustomerStore {
    db: Arc<DatabaseConnection>,
}

impl SeaOrmCustomerStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CustomerStore for SeaOrmCustomerStore {
    async fn create(&self, new_customer: NewCustomer) -> Result<CustomerModel, ServiceError> {
        let now = Utc::now();

        let inserted = customer::ActiveModel {
            name: Set(new_customer.name),
            username: Set(new_customer.username),
            email: Set(new_customer.email),
            password: Set(new_customer.password),
            phone_number: Set(new_customer.phone_number),
            address: Set(new_customer.address),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*self.db)
        .await?;

        Ok(inserted)
    }

    async fn get_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CustomerModel>, ServiceError> {
        Ok(Customer::find()
            .filter(customer::Column::Username.eq(username))
            .one(&*self.db)
            .await?)
    }
}
