use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::NouvelleImage;
use crate::entities::{association, motif, variante};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AssociationView {
    pub id: Uuid,
    pub modele: String,
    pub couleur: String,
}

impl From<association::Model> for AssociationView {
    fn from(model: association::Model) -> Self {
        Self {
            id: model.id,
            modele: model.modele,
            couleur: model.couleur,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct VarianteView {
    pub id: Uuid,
    pub nom: String,
    pub image_url: Option<String>,
    pub associations: Vec<AssociationView>,
}

impl VarianteView {
    pub fn assemble(variante: variante::Model, associations: Vec<association::Model>) -> Self {
        Self {
            id: variante.id,
            nom: variante.nom,
            image_url: variante.image_url,
            associations: associations
                .into_iter()
                .map(AssociationView::from)
                .collect(),
        }
    }
}

/// Motif with its nested variants and associations.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MotifView {
    pub id: Uuid,
    pub nom: String,
    pub variantes: Vec<VarianteView>,
}

impl MotifView {
    pub fn assemble(motif: motif::Model, variantes: Vec<VarianteView>) -> Self {
        Self {
            id: motif.id,
            nom: motif.nom,
            variantes,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMotifRequest {
    #[validate(length(min = 1, max = 200, message = "Le nom du motif est requis"))]
    pub nom: String,
}

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateMotifRequest {
    #[validate(length(min = 1, max = 200, message = "Le nom du motif est requis"))]
    pub nom: String,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct AddVarianteRequest {
    pub nom: String,
    pub image: NouvelleImage,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct AddAssociationRequest {
    pub modele: String,
    pub couleur: String,
}

/// One association inside a motif draft. Temporary ids mark associations
/// added in this session.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AssociationDraft {
    pub id: String,
    pub modele: String,
    pub couleur: String,
}

/// One variant inside a motif draft. A temporary id plus a pending image
/// means the variant was added in this session and still needs creating.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct VarianteDraft {
    pub id: String,
    pub nom: String,
    /// Image attached during the session, pending upload
    pub image: Option<NouvelleImage>,
    #[serde(default)]
    pub associations: Vec<AssociationDraft>,
    /// Persisted associations detached during the session
    #[serde(default)]
    pub associations_supprimees: Vec<Uuid>,
}

/// Whole pattern editing session, applied transactionally on submit.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct MotifDraft {
    /// Absent for a motif created in this session
    pub id: Option<Uuid>,
    pub nom: String,
    #[serde(default)]
    pub variantes: Vec<VarianteDraft>,
    /// Persisted variants removed during the session
    #[serde(default)]
    pub variantes_supprimees: Vec<Uuid>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveMotifResponse {
    pub id: Uuid,
}
