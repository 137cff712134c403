use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::motifs::{
    AddAssociationRequest, AddVarianteRequest, AssociationView, CreateMotifRequest, MotifDraft,
    MotifView, SaveMotifResponse, UpdateMotifRequest, VarianteView,
};
use crate::errors::{ErrorResponse, ServiceError};
use crate::AppState;

/// List every motif with its variants and associations
#[utoipa::path(
    get,
    path = "/api/v1/motifs",
    responses(
        (status = 200, description = "Motifs retrieved", body = [MotifView])
    ),
    tag = "motifs"
)]
pub async fn list_motifs(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let motifs = state.services.motifs.get_all_motifs().await?;
    Ok(Json(motifs))
}

/// Get a single motif
#[utoipa::path(
    get,
    path = "/api/v1/motifs/{id}",
    params(("id" = Uuid, Path, description = "Motif id")),
    responses(
        (status = 200, description = "Motif retrieved", body = MotifView),
        (status = 404, description = "Motif not found", body = ErrorResponse)
    ),
    tag = "motifs"
)]
pub async fn get_motif(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let motif = state.services.motifs.get_motif(id).await?;
    Ok(Json(motif))
}

/// Create a motif (name only)
#[utoipa::path(
    post,
    path = "/api/v1/motifs",
    request_body = CreateMotifRequest,
    responses(
        (status = 201, description = "Motif created", body = MotifView),
        (status = 400, description = "Invalid name", body = ErrorResponse)
    ),
    tag = "motifs"
)]
pub async fn create_motif(
    State(state): State<AppState>,
    Json(request): Json<CreateMotifRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;
    let created = state.services.motifs.create_motif(&request.nom).await?;
    Ok((
        StatusCode::CREATED,
        Json(MotifView::assemble(created, Vec::new())),
    ))
}

/// Rename a motif
#[utoipa::path(
    put,
    path = "/api/v1/motifs/{id}",
    params(("id" = Uuid, Path, description = "Motif id")),
    request_body = UpdateMotifRequest,
    responses(
        (status = 204, description = "Motif renamed"),
        (status = 400, description = "Invalid name", body = ErrorResponse),
        (status = 404, description = "Motif not found", body = ErrorResponse)
    ),
    tag = "motifs"
)]
pub async fn update_motif(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateMotifRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    request.validate()?;
    state.services.motifs.update_motif(id, &request.nom).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a motif with its variants, associations and stored images
#[utoipa::path(
    delete,
    path = "/api/v1/motifs/{id}",
    params(("id" = Uuid, Path, description = "Motif id")),
    responses(
        (status = 204, description = "Motif deleted"),
        (status = 404, description = "Motif not found", body = ErrorResponse)
    ),
    tag = "motifs"
)]
pub async fn delete_motif(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.motifs.delete_motif(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Apply a whole pattern editing session in one transaction
#[utoipa::path(
    post,
    path = "/api/v1/motifs/save",
    request_body = MotifDraft,
    responses(
        (status = 200, description = "Draft applied", body = SaveMotifResponse),
        (status = 400, description = "Invalid draft", body = ErrorResponse),
        (status = 404, description = "Motif not found", body = ErrorResponse),
        (status = 409, description = "Association pair already claimed", body = ErrorResponse)
    ),
    tag = "motifs"
)]
pub async fn save_motif(
    State(state): State<AppState>,
    Json(draft): Json<MotifDraft>,
) -> Result<impl IntoResponse, ServiceError> {
    let id = state.services.motifs.save_motif(draft).await?;
    Ok(Json(SaveMotifResponse { id }))
}

/// Add an image-bearing variant to a motif
#[utoipa::path(
    post,
    path = "/api/v1/motifs/{id}/variantes",
    params(("id" = Uuid, Path, description = "Motif id")),
    request_body = AddVarianteRequest,
    responses(
        (status = 201, description = "Variant added", body = VarianteView),
        (status = 400, description = "Invalid variant", body = ErrorResponse),
        (status = 404, description = "Motif not found", body = ErrorResponse)
    ),
    tag = "motifs"
)]
pub async fn add_variante(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddVarianteRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.motifs.add_variante(id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a variant with its image and associations
#[utoipa::path(
    delete,
    path = "/api/v1/variantes/{id}",
    params(("id" = Uuid, Path, description = "Variant id")),
    responses(
        (status = 204, description = "Variant deleted"),
        (status = 404, description = "Variant not found", body = ErrorResponse)
    ),
    tag = "motifs"
)]
pub async fn delete_variante(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.motifs.delete_variante(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attach a model/color combination to a variant
#[utoipa::path(
    post,
    path = "/api/v1/variantes/{id}/associations",
    params(("id" = Uuid, Path, description = "Variant id")),
    request_body = AddAssociationRequest,
    responses(
        (status = 201, description = "Association added", body = AssociationView),
        (status = 400, description = "Unknown model/color pair", body = ErrorResponse),
        (status = 404, description = "Variant not found", body = ErrorResponse),
        (status = 409, description = "Pair already claimed by a variant of the motif", body = ErrorResponse)
    ),
    tag = "motifs"
)]
pub async fn add_association(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AddAssociationRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let created = state.services.motifs.add_association(id, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Detach an association
#[utoipa::path(
    delete,
    path = "/api/v1/associations/{id}",
    params(("id" = Uuid, Path, description = "Association id")),
    responses(
        (status = 204, description = "Association deleted"),
        (status = 404, description = "Association not found", body = ErrorResponse)
    ),
    tag = "motifs"
)]
pub async fn delete_association(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.motifs.delete_association(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn motif_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_motifs))
        .route("/", post(create_motif))
        .route("/save", post(save_motif))
        .route("/:id", get(get_motif))
        .route("/:id", put(update_motif))
        .route("/:id", delete(delete_motif))
        .route("/:id/variantes", post(add_variante))
}

pub fn variante_routes() -> Router<AppState> {
    Router::new()
        .route("/:id", delete(delete_variante))
        .route("/:id/associations", post(add_association))
}

pub fn association_routes() -> Router<AppState> {
    Router::new().route("/:id", delete(delete_association))
}
