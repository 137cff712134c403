use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Positioned decorative image layered on top of a model. Positions are
/// pixel offsets used when compositing.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "elements_superposables")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub modele_id: Uuid,

    pub nom: String,

    pub image_url: Option<String>,

    pub position_x: i32,

    pub position_y: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::modele::Entity",
        from = "Column::ModeleId",
        to = "super::modele::Column::Id"
    )]
    Modele,
}

impl Related<super::modele::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Modele.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
