use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One visual rendition of a motif, carrying its own image and associations.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "variantes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub motif_id: Uuid,

    pub nom: String,

    pub image_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::motif::Entity",
        from = "Column::MotifId",
        to = "super::motif::Column::Id"
    )]
    Motif,
    #[sea_orm(has_many = "super::association::Entity")]
    Associations,
}

impl Related<super::motif::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Motif.def()
    }
}

impl Related<super::association::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Associations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
