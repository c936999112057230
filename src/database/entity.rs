//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! `feature_flags` 表的实体定义。

use crate::model::Flag;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use sea_orm::ActiveValue::Set;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feature_flags")]
pub struct Model {
    #[sea_orm(
        primary_key,
        auto_increment = false,
        column_type = "String(StringLen::N(256))"
    )]
    pub key: String,
    pub enabled: bool,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Flag {
    fn from(model: Model) -> Self {
        Flag {
            key: model.key,
            enabled: model.enabled,
            description: model.description,
        }
    }
}

impl From<&Flag> for ActiveModel {
    fn from(flag: &Flag) -> Self {
        ActiveModel {
            key: Set(flag.key.clone()),
            enabled: Set(flag.enabled),
            description: Set(flag.description.clone()),
        }
    }
}
