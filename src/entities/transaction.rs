use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Checkout transaction header
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub idempotency_key: String,
    pub customer_id: i64,
    #[sea_orm(column_name = "shopping_cart_id")]
    pub cart_id: i64,
    pub status: TransactionStatus,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_amount: Decimal,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction_detail::Entity")]
    Details,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::shopping_cart::Entity",
        from = "Column::CartId",
        to = "super::shopping_cart::Column::Id"
    )]
    ShoppingCart,
}

impl Related<super::transaction_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Details.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::shopping_cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingCart.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Transaction status enumeration, stored as an integer column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum TransactionStatus {
    #[sea_orm(num_value = 1)]
    InProgress,
    #[sea_orm(num_value = 2)]
    Success,
    #[sea_orm(num_value = 3)]
    Failed,
}

impl TransactionStatus {
    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::InProgress => "IN PROGRESS",
            TransactionStatus::Success => "SUCCESS",
            TransactionStatus::Failed => "FAILED",
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(TransactionStatus::InProgress),
            2 => Some(TransactionStatus::Success),
            3 => Some(TransactionStatus::Failed),
            _ => None,
        }
    }

    pub fn label_for(value: i32) -> &'static str {
        Self::from_value(value).map_or("UNKNOWN", Self::label)
    }
}

/// Accepted payment methods. Checkout records the requested method;
/// it never executes payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum PaymentMethod {
    #[sea_orm(num_value = 1)]
    CreditCard,
    #[sea_orm(num_value = 2)]
    PayPal,
    #[sea_orm(num_value = 3)]
    BankTransfer,
    #[sea_orm(num_value = 4)]
    Cash,
}

impl PaymentMethod {
    pub fn label(self) -> &'static str {
        match self {
            PaymentMethod::CreditCard => "CREDIT CARD",
            PaymentMethod::PayPal => "PAYPAL",
            PaymentMethod::BankTransfer => "BANK TRANSFER",
            PaymentMethod::Cash => "CASH",
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(PaymentMethod::CreditCard),
            2 => Some(PaymentMethod::PayPal),
            3 => Some(PaymentMethod::BankTransfer),
            4 => Some(PaymentMethod::Cash),
            _ => None,
        }
    }

    pub fn label_for(value: i32) -> &'static str {
        Self::from_value(value).map_or("UNKNOWN", Self::label)
    }
}
