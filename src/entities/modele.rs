use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Garment template owning base-textile colors and overlay elements.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "modeles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[validate(length(min = 1, max = 200, message = "Le nom du modèle est requis"))]
    pub nom: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::couleur::Entity")]
    Couleurs,
    #[sea_orm(has_many = "super::element_superposable::Entity")]
    ElementsSuperposables,
}

impl Related<super::couleur::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Couleurs.def()
    }
}

impl Related<super::element_superposable::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ElementsSuperposables.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
