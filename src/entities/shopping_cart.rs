use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shopping cart header
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_carts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub customer_id: i64,
    pub status: CartStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Cart status enumeration, stored as an integer column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "i32", db_type = "Integer")]
pub enum CartStatus {
    #[sea_orm(num_value = 1)]
    Active,
    #[sea_orm(num_value = 2)]
    Pending,
    #[sea_orm(num_value = 3)]
    Completed,
    #[sea_orm(num_value = 4)]
    Cancelled,
}

impl CartStatus {
    /// Display string used in API responses
    pub fn label(self) -> &'static str {
        match self {
            CartStatus::Active => "ACTIVE",
            CartStatus::Pending => "PENDING",
            CartStatus::Completed => "COMPLETED",
            CartStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(CartStatus::Active),
            2 => Some(CartStatus::Pending),
            3 => Some(CartStatus::Completed),
            4 => Some(CartStatus::Cancelled),
            _ => None,
        }
    }

    /// Label for a raw stored value; unrecognized values render as UNKNOWN
    pub fn label_for(value: i32) -> &'static str {
        Self::from_value(value).map_or("UNKNOWN", Self::label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_status_labels() {
        assert_eq!(CartStatus::Active.label(), "ACTIVE");
        assert_eq!(CartStatus::Pending.label(), "PENDING");
        assert_eq!(CartStatus::Completed.label(), "COMPLETED");
        assert_eq!(CartStatus::Cancelled.label(), "CANCELLED");
    }

    #[test]
    fn cart_status_unknown_value_renders_unknown() {
        assert_eq!(CartStatus::label_for(0), "UNKNOWN");
        assert_eq!(CartStatus::label_for(99), "UNKNOWN");
        assert_eq!(CartStatus::label_for(2), "PENDING");
    }
}
