use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::dto;
use crate::errors::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Atelier API",
        description = r#"
Administration backend for textile print models and motifs.

- **Modèles**: garment templates with base-textile colors and positioned
  overlay elements.
- **Motifs**: print designs with image-bearing variants, each associated
  to model/color combinations.
- **Drafts**: whole editing sessions submitted in one transactional call
  (`POST /api/v1/modeles/save`, `POST /api/v1/motifs/save`).

Errors use a uniform JSON body with `error`, `message` and `timestamp`.
"#
    ),
    paths(
        handlers::health::health,
        handlers::modeles::list_modeles,
        handlers::modeles::catalog,
        handlers::modeles::get_modele,
        handlers::modeles::create_modele,
        handlers::modeles::update_modele,
        handlers::modeles::delete_modele,
        handlers::modeles::save_modele,
        handlers::modeles::add_couleur,
        handlers::modeles::delete_couleur,
        handlers::modeles::add_element,
        handlers::modeles::update_element_position,
        handlers::modeles::delete_element,
        handlers::motifs::list_motifs,
        handlers::motifs::get_motif,
        handlers::motifs::create_motif,
        handlers::motifs::update_motif,
        handlers::motifs::delete_motif,
        handlers::motifs::save_motif,
        handlers::motifs::add_variante,
        handlers::motifs::delete_variante,
        handlers::motifs::add_association,
        handlers::motifs::delete_association,
    ),
    components(schemas(
        ErrorResponse,
        handlers::health::HealthResponse,
        handlers::health::ComponentHealth,
        handlers::health::ComponentStatus,
        dto::NouvelleImage,
        dto::modeles::CouleurValeur,
        dto::modeles::CouleurValeurDraft,
        dto::modeles::CouleurView,
        dto::modeles::ElementView,
        dto::modeles::ModeleView,
        dto::modeles::CatalogModele,
        dto::modeles::CreateModeleRequest,
        dto::modeles::UpdateModeleRequest,
        dto::modeles::AddCouleurRequest,
        dto::modeles::AddElementRequest,
        dto::modeles::UpdatePositionRequest,
        dto::modeles::CouleurDraft,
        dto::modeles::ModeleDraft,
        dto::modeles::SaveModeleResponse,
        dto::motifs::AssociationView,
        dto::motifs::VarianteView,
        dto::motifs::MotifView,
        dto::motifs::CreateMotifRequest,
        dto::motifs::UpdateMotifRequest,
        dto::motifs::AddVarianteRequest,
        dto::motifs::AddAssociationRequest,
        dto::motifs::AssociationDraft,
        dto::motifs::VarianteDraft,
        dto::motifs::MotifDraft,
        dto::motifs::SaveMotifResponse,
    )),
    tags(
        (name = "modeles", description = "Garment templates, couleurs and overlay elements"),
        (name = "motifs", description = "Print designs, variants and associations"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Swagger UI mounted at `/docs`, serving the generated document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/modeles",
            "/api/v1/modeles/catalog",
            "/api/v1/modeles/save",
            "/api/v1/modeles/{id}",
            "/api/v1/couleurs/{id}",
            "/api/v1/elements/{id}/position",
            "/api/v1/motifs",
            "/api/v1/motifs/save",
            "/api/v1/motifs/{id}/variantes",
            "/api/v1/variantes/{id}/associations",
            "/api/v1/associations/{id}",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "{path} missing from the document"
            );
        }
        assert!(doc.paths.paths.len() >= 17);
    }
}
