use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::modeles::{
    AddCouleurRequest, AddElementRequest, CatalogModele, CouleurView, CreateModeleRequest,
    ElementView, ModeleDraft, ModeleView, SaveModeleResponse, UpdateModeleRequest,
    UpdatePositionRequest,
};
use crate::errors::{ErrorResponse, ServiceError};
use crate::AppState;

/// List every model with its couleurs and overlay elements
#[utoipa::path(
    get,
    path = "/api/v1/modeles",
    responses(
        (status = 200, description = "Models retrieved", body = [ModeleView])
    ),
    tag = "modeles"
)]
pub async fn list_modeles(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServiceError> {
    let modeles = state.services.modeles.get_all_modeles().await?;
    Ok(Json(modeles))
}

/// Live association options: every persisted model name with its color names
#[utoipa::path(
    get,
    path = "/api/v1/modeles/catalog",
    responses(
        (status = 200, description = "Catalog retrieved", body = [CatalogModele])
    ),
    tag = "modeles"
)]
pub async fn catalog(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let catalog = state.services.modeles.catalog().await?;
    Ok(Json(catalog))
}

/// Get a single model
#[utoipa::path(
    get,
    path = "/api/v1/modeles/{id}",
    params(("id" = Uuid, Path, description = "Model id")),
    responses(
        (status = 200, description = "Model retrieved", body = ModeleView),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "modeles"
)]
pub async fn get_modele(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let modele = state.services.modeles.get_modele(id).await?;
    Ok(Json(modele))
}

/// Create a model (name only)
#[utoipa::path(
    post,
    path = "/api/v1/modeles",
    request_body = CreateModeleRequest,
    responses(
        (status = 201, description = "Model created", body = ModeleView),
        (status = 400, description = "Invalid name", body = ErrorResponse)
    ),
    tag = "modeles"
)]
pub async fn create_modele(
    State(state): State<AppState>,
    Json(request): Json<CreateModeleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;
    let created = state.services.modeles.create_modele(&request.nom).await?;
    Ok((
        StatusCode::CREATED,
        Json(ModeleView::assemble(created, Vec::new(), Vec::new())),
    ))
}

/// Rename a model
#[utoipa::path(
    put,
    path = "/api/v1/modeles/{id}",
    params(("id" = Uuid, Path, description = "Model id")),
    request_body = UpdateModeleRequest,
    responses(
        (status = 204, description = "Model renamed"),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "modeles"
)]
pub async fn update_modele(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateModeleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;
    state
        .services
        .modeles
        .update_modele(id, &request.nom)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a model with its couleurs, elements and stored images
#[utoipa::path(
    delete,
    path = "/api/v1/modeles/{id}",
    params(("id" = Uuid, Path, description = "Model id")),
    responses(
        (status = 204, description = "Model deleted"),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "modeles"
)]
pub async fn delete_modele(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.modeles.delete_modele(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a whole model editing session in one transaction
#[utoipa::path(
    post,
    path = "/api/v1/modeles/save",
    request_body = ModeleDraft,
    responses(
        (status = 200, description = "Draft applied", body = SaveModeleResponse),
        (status = 400, description = "Invalid draft", body = ErrorResponse),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "modeles"
)]
pub async fn save_modele(
    State(state): State<AppState>,
    Json(draft): Json<ModeleDraft>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = state.services.modeles.save_modele(draft).await?;
    Ok(Json(SaveModeleResponse { id }))
}

/// Add a color (hex or swatch image) to a model
#[utoipa::path(
    post,
    path = "/api/v1/modeles/{id}/couleurs",
    params(("id" = Uuid, Path, description = "Model id")),
    request_body = AddCouleurRequest,
    responses(
        (status = 201, description = "Color added", body = CouleurView),
        (status = 400, description = "Invalid color", body = ErrorResponse),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "modeles"
)]
pub async fn add_couleur(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddCouleurRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.modeles.add_couleur(id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a color, removing its swatch image when it has one
#[utoipa::path(
    delete,
    path = "/api/v1/couleurs/{id}",
    params(("id" = Uuid, Path, description = "Color id")),
    responses(
        (status = 204, description = "Color deleted"),
        (status = 404, description = "Color not found", body = ErrorResponse)
    ),
    tag = "modeles"
)]
pub async fn delete_couleur(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.modeles.delete_couleur(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add an overlay element with its image and compositing position
#[utoipa::path(
    post,
    path = "/api/v1/modeles/{id}/elements",
    params(("id" = Uuid, Path, description = "Model id")),
    request_body = AddElementRequest,
    responses(
        (status = 201, description = "Element added", body = ElementView),
        (status = 400, description = "Invalid element", body = ErrorResponse),
        (status = 404, description = "Model not found", body = ErrorResponse)
    ),
    tag = "modeles"
)]
pub async fn add_element(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddElementRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.modeles.add_element(id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Move an overlay element
#[utoipa::path(
    put,
    path = "/api/v1/elements/{id}/position",
    params(("id" = Uuid, Path, description = "Element id")),
    request_body = UpdatePositionRequest,
    responses(
        (status = 204, description = "Position updated"),
        (status = 404, description = "Element not found", body = ErrorResponse)
    ),
    tag = "modeles"
)]
pub async fn update_element_position(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdatePositionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    state
        .services
        .modeles
        .update_element_position(id, request.position_x, request.position_y)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete an overlay element and its stored image
#[utoipa::path(
    delete,
    path = "/api/v1/elements/{id}",
    params(("id" = Uuid, Path, description = "Element id")),
    responses(
        (status = 204, description = "Element deleted"),
        (status = 404, description = "Element not found", body = ErrorResponse)
    ),
    tag = "modeles"
)]
pub async fn delete_element(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.modeles.delete_element(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn modele_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_modeles))
        .route("/", post(create_modele))
        .route("/catalog", get(catalog))
        .route("/save", post(save_modele))
        .route("/:id", get(get_modele))
        .route("/:id", put(update_modele))
        .route("/:id", delete(delete_modele))
        .route("/:id/couleurs", post(add_couleur))
        .route("/:id/elements", post(add_element))
}

pub fn couleur_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_couleur))
}

pub fn element_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/position", put(update_element_position))
        .route("/:id", delete(delete_element))
}
