use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Link from a variant to a model/color combination it may be printed on.
/// Model and color are denormalized names, as in the historical schema.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "associations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub variante_id: Uuid,

    pub modele: String,

    pub couleur: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::variante::Entity",
        from = "Column::VarianteId",
        to = "super::variante::Column::Id"
    )]
    Variante,
}

impl Related<super::variante::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variante.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
