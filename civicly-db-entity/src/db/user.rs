use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users", schema_name = "public")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub wallet_address: String,
    pub network: String,
    pub email: Option<String>,
    pub points: i64,
    pub streak: i32,
    pub last_check_in: Option<i64>,
    // {"lastWeek": <points before the latest check-in>}
    pub points_history: Option<Json>,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::check_in::Entity")]
    CheckIn,
    #[sea_orm(has_many = "super::message::Entity")]
    Message,
    #[sea_orm(has_many = "super::stake::Entity")]
    Stake,
}

impl Related<super::check_in::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CheckIn.def()
    }
}

impl Related<super::message::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Message.def()
    }
}

impl Related<super::stake::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stake.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
