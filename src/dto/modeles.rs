use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::NouvelleImage;
use crate::entities::{couleur, element_superposable, modele};

/// Value of a base-textile color: the two historical shapes (hex code vs
/// uploaded swatch image) unified as one tagged variant.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouleurValeur {
    Hex { code: String },
    Image { url: String },
}

impl CouleurValeur {
    /// Reconstructs the tagged value from the two nullable columns. Hex
    /// wins when both are set (legacy rows); rows with neither are invalid.
    pub fn from_columns(code_hex: Option<String>, image_url: Option<String>) -> Option<Self> {
        match (code_hex, image_url) {
            (Some(code), _) => Some(CouleurValeur::Hex { code }),
            (None, Some(url)) => Some(CouleurValeur::Image { url }),
            (None, None) => None,
        }
    }
}

/// Couleur as returned by the API.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CouleurView {
    pub id: Uuid,
    pub nom: String,
    pub valeur: Option<CouleurValeur>,
}

impl From<couleur::Model> for CouleurView {
    fn from(model: couleur::Model) -> Self {
        Self {
            id: model.id,
            nom: model.nom,
            valeur: CouleurValeur::from_columns(model.code_hex, model.image_url),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ElementView {
    pub id: Uuid,
    pub nom: String,
    pub image_url: Option<String>,
    pub position_x: i32,
    pub position_y: i32,
}

impl From<element_superposable::Model> for ElementView {
    fn from(model: element_superposable::Model) -> Self {
        Self {
            id: model.id,
            nom: model.nom,
            image_url: model.image_url,
            position_x: model.position_x,
            position_y: model.position_y,
        }
    }
}

/// Model with its nested couleurs and elements.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ModeleView {
    pub id: Uuid,
    pub nom: String,
    pub couleurs: Vec<CouleurView>,
    pub elements_superposables: Vec<ElementView>,
}

impl ModeleView {
    pub fn assemble(
        modele: modele::Model,
        couleurs: Vec<couleur::Model>,
        elements: Vec<element_superposable::Model>,
    ) -> Self {
        Self {
            id: modele.id,
            nom: modele.nom,
            couleurs: couleurs.into_iter().map(CouleurView::from).collect(),
            elements_superposables: elements.into_iter().map(ElementView::from).collect(),
        }
    }
}

/// One entry of the live association catalog: a model name and its color
/// names, drawn from persisted rows.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CatalogModele {
    pub nom: String,
    pub couleurs: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct CreateModeleRequest {
    #[validate(length(min = 1, max = 200, message = "Le nom du modèle est requis"))]
    pub nom: String,
}

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateModeleRequest {
    #[validate(length(min = 1, max = 200, message = "Le nom du modèle est requis"))]
    pub nom: String,
}

/// Pending value for a color added during an editing session.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CouleurValeurDraft {
    Hex { code: String },
    Image { fichier: NouvelleImage },
}

/// Direct add-color request.
#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct AddCouleurRequest {
    pub nom: String,
    pub valeur: CouleurValeurDraft,
}

/// One color inside a model draft. Temporary ids mark colors added in this
/// session; UUID ids mark colors that already exist remotely.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CouleurDraft {
    pub id: String,
    pub nom: String,
    /// Present for colors added in this session
    pub valeur: Option<CouleurValeurDraft>,
}

/// Whole model editing session, applied transactionally on submit.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ModeleDraft {
    /// Absent for a model created in this session
    pub id: Option<Uuid>,
    pub nom: String,
    #[serde(default)]
    pub couleurs: Vec<CouleurDraft>,
    /// Persisted colors removed during the session
    #[serde(default)]
    pub couleurs_supprimees: Vec<Uuid>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct SaveModeleResponse {
    pub id: Uuid,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct AddElementRequest {
    pub nom: String,
    pub image: NouvelleImage,
    #[serde(default)]
    pub position_x: i32,
    #[serde(default)]
    pub position_y: i32,
}

#[derive(Clone, Debug, Deserialize, ToSchema)]
pub struct UpdatePositionRequest {
    pub position_x: i32,
    pub position_y: i32,
}
