use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Base-textile color of a model. Exactly one of `code_hex` / `image_url`
/// is set; the API layer exposes the pair as a tagged value.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "couleurs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub modele_id: Uuid,

    pub nom: String,

    pub code_hex: Option<String>,

    pub image_url: Option<String>,
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
