use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::dto::motifs::{
    AddAssociationRequest, AddVarianteRequest, AssociationView, MotifDraft, MotifView,
    VarianteDraft, VarianteView,
};
use crate::entities::{association, motif, variante};
use crate::errors::ServiceError;
use crate::ids::{is_temp_id, parse_persisted_id};
use crate::services::modeles::{flatten_db_tx_error, flatten_tx_error, ModeleService};
use crate::storage::{self, ObjectStore, BUCKET_VARIANTES_IMAGES};

/// Variant added during the session, its image already uploaded.
struct NewVariantePlan {
    temp_id: String,
    nom: String,
    image_url: Option<String>,
}

/// Persisted variant surviving the session: rename, optional image swap.
struct KeepVariantePlan {
    id: Uuid,
    nom: String,
    new_image_url: Option<String>,
    associations_supprimees: Vec<Uuid>,
}

/// Association added during the session. Its owner may itself be a variant
/// created in the same session, referenced by temporary id until the
/// transaction assigns the real one.
struct NewAssociationPlan {
    owner: OwnerRef,
    modele: String,
    couleur: String,
}

enum OwnerRef {
    Temp(String),
    Persisted(Uuid),
}

/// Returns a `(modele, couleur)` pair claimed more than once across the
/// motif, if any: twice within the draft, or by the draft while a
/// persisted variant left out of it still carries the pair. The invariant
/// is motif-wide: one pair may be associated to at most one variant.
pub fn find_duplicate_pair(
    persisted: &[(String, String)],
    variantes: &[VarianteDraft],
) -> Option<(String, String)> {
    let mut seen: HashSet<(String, String)> = persisted
        .iter()
        .map(|(m, c)| (m.trim().to_string(), c.trim().to_string()))
        .collect();
    for v in variantes {
        for a in &v.associations {
            let pair = (
                a.modele.trim().to_string(),
                a.couleur.trim().to_string(),
            );
            if !seen.insert(pair.clone()) {
                return Some(pair);
            }
        }
    }
    None
}

/// Service for managing motifs, their variants and associations.
#[derive(Clone)]
pub struct MotifService {
    db: Arc<DbPool>,
    storage: Arc<dyn ObjectStore>,
    modeles: Arc<ModeleService>,
}

impl MotifService {
    pub fn new(db: Arc<DbPool>, storage: Arc<dyn ObjectStore>, modeles: Arc<ModeleService>) -> Self {
        Self {
            db,
            storage,
            modeles,
        }
    }

    /// All motifs with their nested variants and associations.
    #[instrument(skip(self))]
    pub async fn get_all_motifs(&self) -> Result<Vec<MotifView>, ServiceError> {
        let db = &*self.db;
        let motifs = motif::Entity::find()
            .order_by_asc(motif::Column::CreatedAt)
            .all(db)
            .await?;
        let variantes = variante::Entity::find().all(db).await?;
        let associations = association::Entity::find().all(db).await?;

        let mut assocs_by_variante: HashMap<Uuid, Vec<association::Model>> = HashMap::new();
        for a in associations {
            assocs_by_variante.entry(a.variante_id).or_default().push(a);
        }
        let mut variantes_by_motif: HashMap<Uuid, Vec<VarianteView>> = HashMap::new();
        for v in variantes {
            let assocs = assocs_by_variante.remove(&v.id).unwrap_or_default();
            variantes_by_motif
                .entry(v.motif_id)
                .or_default()
                .push(VarianteView::assemble(v, assocs));
        }

        Ok(motifs
            .into_iter()
            .map(|m| {
                let variantes = variantes_by_motif.remove(&m.id).unwrap_or_default();
                MotifView::assemble(m, variantes)
            })
            .collect())
    }

    /// A single motif with its nested variants and associations.
    #[instrument(skip(self))]
    pub async fn get_motif(&self, motif_id: Uuid) -> Result<MotifView, ServiceError> {
        let db = &*self.db;
        let motif = motif::Entity::find_by_id(motif_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Motif {motif_id} introuvable")))?;
        let variantes = variante::Entity::find()
            .filter(variante::Column::MotifId.eq(motif_id))
            .all(db)
            .await?;
        let variante_ids: Vec<Uuid> = variantes.iter().map(|v| v.id).collect();
        let associations = if variante_ids.is_empty() {
            Vec::new()
        } else {
            association::Entity::find()
                .filter(association::Column::VarianteId.is_in(variante_ids))
                .all(db)
                .await?
        };

        let mut assocs_by_variante: HashMap<Uuid, Vec<association::Model>> = HashMap::new();
        for a in associations {
            assocs_by_variante.entry(a.variante_id).or_default().push(a);
        }
        let variantes = variantes
            .into_iter()
            .map(|v| {
                let assocs = assocs_by_variante.remove(&v.id).unwrap_or_default();
                VarianteView::assemble(v, assocs)
            })
            .collect();
        Ok(MotifView::assemble(motif, variantes))
    }

    #[instrument(skip(self))]
    pub async fn create_motif(&self, nom: &str) -> Result<motif::Model, ServiceError> {
        let nom = nom.trim();
        if nom.is_empty() {
            return Err(ServiceError::ValidationError(
                "Le nom du motif est requis".into(),
            ));
        }
        let created = motif::ActiveModel {
            id: Set(Uuid::new_v4()),
            nom: Set(nom.to_string()),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&*self.db)
        .await?;
        info!(motif_id = %created.id, "created motif");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_motif(&self, motif_id: Uuid, nom: &str) -> Result<(), ServiceError> {
        let nom = nom.trim();
        if nom.is_empty() {
            return Err(ServiceError::ValidationError(
                "Le nom du motif est requis".into(),
            ));
        }
        let existing = motif::Entity::find_by_id(motif_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Motif {motif_id} introuvable")))?;
        let mut active: motif::ActiveModel = existing.into();
        active.nom = Set(nom.to_string());
        active.update(&*self.db).await?;
        Ok(())
    }

    /// Deletes a motif, attempting removal of every variant image from the
    /// object store before the rows disappear.
    #[instrument(skip(self))]
    pub async fn delete_motif(&self, motif_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        motif::Entity::find_by_id(motif_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Motif {motif_id} introuvable")))?;

        let variantes = variante::Entity::find()
            .filter(variante::Column::MotifId.eq(motif_id))
            .all(db)
            .await?;
        for v in &variantes {
            if let Some(url) = &v.image_url {
                storage::remove_logged(&self.storage, BUCKET_VARIANTES_IMAGES, url).await;
            }
        }
        let variante_ids: Vec<Uuid> = variantes.iter().map(|v| v.id).collect();

        self.db
            .transaction::<_, (), sea_orm::DbErr>(move |txn| {
                Box::pin(async move {
                    if !variante_ids.is_empty() {
                        association::Entity::delete_many()
                            .filter(association::Column::VarianteId.is_in(variante_ids))
                            .exec(txn)
                            .await?;
                    }
                    variante::Entity::delete_many()
                        .filter(variante::Column::MotifId.eq(motif_id))
                        .exec(txn)
                        .await?;
                    motif::Entity::delete_by_id(motif_id).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten_db_tx_error)?;

        info!(motif_id = %motif_id, "deleted motif");
        Ok(())
    }

    /// Applies a whole pattern editing session in one pass:
    ///
    /// 1. reject `(modele, couleur)` pairs claimed twice motif-wide,
    ///    counting pairs still held by persisted variants the draft
    ///    leaves untouched;
    /// 2. reject associations naming unknown model/color combinations;
    /// 3. upload pending variant images;
    /// 4. in one transaction: upsert the motif, drop removed variants,
    ///    insert session variants (temporary id mapped to a fresh UUID),
    ///    rename surviving ones, drop detached associations and insert new
    ///    ones — resolving owners created in the same session through the
    ///    temporary-id mapping;
    /// 5. on failure, remove the just-uploaded objects and report the
    ///    error; nothing is half-applied;
    /// 6. after commit, remove images of deleted or replaced variants.
    #[instrument(skip(self, draft), fields(motif_id = ?draft.id))]
    pub async fn save_motif(&self, draft: MotifDraft) -> Result<Uuid, ServiceError> {
        let nom = draft.nom.trim().to_string();
        if nom.is_empty() {
            return Err(ServiceError::ValidationError(
                "Le nom du motif est requis".into(),
            ));
        }

        // Rows of variants already persisted under this motif; used to
        // seed the duplicate check, validate ownership and collect replaced
        // image urls.
        let existing_variantes: HashMap<Uuid, variante::Model> = match draft.id {
            Some(motif_id) => variante::Entity::find()
                .filter(variante::Column::MotifId.eq(motif_id))
                .all(&*self.db)
                .await?
                .into_iter()
                .map(|v| (v.id, v))
                .collect(),
            None => HashMap::new(),
        };

        // Pairs staying on persisted variants the draft leaves untouched.
        // A pair is out of play when its variant is being removed, the
        // association is detached, or the draft resubmits it.
        let persisted_pairs: Vec<(String, String)> = if existing_variantes.is_empty() {
            Vec::new()
        } else {
            let resubmitted: HashSet<Uuid> = draft
                .variantes
                .iter()
                .flat_map(|v| v.associations.iter())
                .filter_map(|a| parse_persisted_id(&a.id))
                .collect();
            let detached: HashSet<Uuid> = draft
                .variantes
                .iter()
                .flat_map(|v| v.associations_supprimees.iter().copied())
                .collect();
            let removed_variantes: HashSet<Uuid> =
                draft.variantes_supprimees.iter().copied().collect();
            association::Entity::find()
                .filter(
                    association::Column::VarianteId
                        .is_in(existing_variantes.keys().copied().collect::<Vec<_>>()),
                )
                .all(&*self.db)
                .await?
                .into_iter()
                .filter(|a| {
                    !removed_variantes.contains(&a.variante_id)
                        && !detached.contains(&a.id)
                        && !resubmitted.contains(&a.id)
                })
                .map(|a| (a.modele, a.couleur))
                .collect()
        };

        if let Some((modele, couleur)) = find_duplicate_pair(&persisted_pairs, &draft.variantes) {
            return Err(ServiceError::DuplicateAssociation(format!(
                "L'association {modele} / {couleur} existe déjà sur une autre variante"
            )));
        }

        // New associations must name a persisted model/color combination.
        let catalog: HashSet<(String, String)> = self
            .modeles
            .catalog()
            .await?
            .into_iter()
            .flat_map(|m| {
                m.couleurs
                    .into_iter()
                    .map(move |c| (m.nom.clone(), c))
                    .collect::<Vec<_>>()
            })
            .collect();
        for v in &draft.variantes {
            for a in v.associations.iter().filter(|a| is_temp_id(&a.id)) {
                let pair = (
                    a.modele.trim().to_string(),
                    a.couleur.trim().to_string(),
                );
                if !catalog.contains(&pair) {
                    return Err(ServiceError::ValidationError(format!(
                        "Le modèle {} n'a pas de couleur {}",
                        pair.0, pair.1
                    )));
                }
            }
        }

        let mut uploaded: Vec<(String, String)> = Vec::new();
        let mut images_to_remove: Vec<String> = Vec::new();
        let mut new_plans: Vec<NewVariantePlan> = Vec::new();
        let mut keep_plans: Vec<KeepVariantePlan> = Vec::new();
        let mut association_plans: Vec<NewAssociationPlan> = Vec::new();

        for v in &draft.variantes {
            let variante_nom = v.nom.trim();
            if variante_nom.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Le nom de la variante est requis".into(),
                ));
            }

            let pending_url = match &v.image {
                Some(image) => {
                    let data = image.decode()?;
                    let object = storage::unique_object_name(&image.file_name);
                    let content_type = storage::content_type_for(&object);
                    self.storage
                        .upload(BUCKET_VARIANTES_IMAGES, &object, data, content_type)
                        .await?;
                    let url = self.storage.public_url(BUCKET_VARIANTES_IMAGES, &object);
                    uploaded.push((BUCKET_VARIANTES_IMAGES.to_string(), object));
                    Some(url)
                }
                None => None,
            };

            match parse_persisted_id(&v.id) {
                None => {
                    // Added in this session.
                    for a in &v.associations {
                        association_plans.push(NewAssociationPlan {
                            owner: OwnerRef::Temp(v.id.clone()),
                            modele: a.modele.trim().to_string(),
                            couleur: a.couleur.trim().to_string(),
                        });
                    }
                    new_plans.push(NewVariantePlan {
                        temp_id: v.id.clone(),
                        nom: variante_nom.to_string(),
                        image_url: pending_url,
                    });
                }
                Some(id) => {
                    let existing = existing_variantes.get(&id).ok_or_else(|| {
                        ServiceError::InvalidInput(format!(
                            "La variante {id} n'appartient pas à ce motif"
                        ))
                    })?;
                    if pending_url.is_some() {
                        if let Some(old_url) = &existing.image_url {
                            images_to_remove.push(old_url.clone());
                        }
                    }
                    for a in v.associations.iter().filter(|a| is_temp_id(&a.id)) {
                        association_plans.push(NewAssociationPlan {
                            owner: OwnerRef::Persisted(id),
                            modele: a.modele.trim().to_string(),
                            couleur: a.couleur.trim().to_string(),
                        });
                    }
                    keep_plans.push(KeepVariantePlan {
                        id,
                        nom: variante_nom.to_string(),
                        new_image_url: pending_url,
                        associations_supprimees: v.associations_supprimees.clone(),
                    });
                }
            }
        }

        // Images of variants removed during the session, deleted from
        // storage only after the transaction commits.
        let variantes_supprimees: Vec<Uuid> = match draft.id {
            Some(_) => draft.variantes_supprimees.clone(),
            None => Vec::new(),
        };
        for id in &variantes_supprimees {
            if let Some(v) = existing_variantes.get(id) {
                if let Some(url) = &v.image_url {
                    images_to_remove.push(url.clone());
                }
            }
        }

        let draft_id = draft.id;
        let result = self
            .db
            .transaction::<_, Uuid, ServiceError>(move |txn| {
                Box::pin(async move {
                    let motif_id = match draft_id {
                        Some(id) => {
                            let existing = motif::Entity::find_by_id(id)
                                .one(txn)
                                .await?
                                .ok_or_else(|| {
                                    ServiceError::NotFound(format!("Motif {id} introuvable"))
                                })?;
                            let mut active: motif::ActiveModel = existing.into();
                            active.nom = Set(nom);
                            active.update(txn).await?;
                            id
                        }
                        None => {
                            let id = Uuid::new_v4();
                            motif::ActiveModel {
                                id: Set(id),
                                nom: Set(nom),
                                created_at: Set(chrono::Utc::now()),
                            }
                            .insert(txn)
                            .await?;
                            id
                        }
                    };

                    if !variantes_supprimees.is_empty() {
                        association::Entity::delete_many()
                            .filter(
                                association::Column::VarianteId
                                    .is_in(variantes_supprimees.clone()),
                            )
                            .exec(txn)
                            .await?;
                        variante::Entity::delete_many()
                            .filter(variante::Column::Id.is_in(variantes_supprimees))
                            .filter(variante::Column::MotifId.eq(motif_id))
                            .exec(txn)
                            .await?;
                    }

                    // Temporary variant id -> freshly assigned UUID.
                    let mut id_map: HashMap<String, Uuid> = HashMap::new();
                    for plan in new_plans {
                        let id = Uuid::new_v4();
                        id_map.insert(plan.temp_id, id);
                        variante::ActiveModel {
                            id: Set(id),
                            motif_id: Set(motif_id),
                            nom: Set(plan.nom),
                            image_url: Set(plan.image_url),
                        }
                        .insert(txn)
                        .await?;
                    }

                    for plan in keep_plans {
                        let existing = variante::Entity::find_by_id(plan.id)
                            .one(txn)
                            .await?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!(
                                    "Variante {} introuvable",
                                    plan.id
                                ))
                            })?;
                        let mut active: variante::ActiveModel = existing.into();
                        active.nom = Set(plan.nom);
                        if let Some(url) = plan.new_image_url {
                            active.image_url = Set(Some(url));
                        }
                        active.update(txn).await?;

                        if !plan.associations_supprimees.is_empty() {
                            association::Entity::delete_many()
                                .filter(
                                    association::Column::Id
                                        .is_in(plan.associations_supprimees),
                                )
                                .filter(association::Column::VarianteId.eq(plan.id))
                                .exec(txn)
                                .await?;
                        }
                    }

                    for plan in association_plans {
                        let variante_id = match plan.owner {
                            OwnerRef::Persisted(id) => id,
                            OwnerRef::Temp(temp_id) => {
                                *id_map.get(&temp_id).ok_or_else(|| {
                                    ServiceError::InvalidInput(format!(
                                        "Variante inconnue: {temp_id}"
                                    ))
                                })?
                            }
                        };
                        association::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            variante_id: Set(variante_id),
                            modele: Set(plan.modele),
                            couleur: Set(plan.couleur),
                        }
                        .insert(txn)
                        .await?;
                    }

                    Ok(motif_id)
                })
            })
            .await;

        match result {
            Ok(motif_id) => {
                for url in images_to_remove {
                    storage::remove_logged(&self.storage, BUCKET_VARIANTES_IMAGES, &url).await;
                }
                info!(motif_id = %motif_id, "saved motif draft");
                Ok(motif_id)
            }
            Err(err) => {
                for (bucket, object) in &uploaded {
                    if let Err(cleanup_err) = self.storage.remove(bucket, object).await {
                        tracing::warn!(bucket, object, "compensation failed: {cleanup_err}");
                    }
                }
                Err(flatten_tx_error(err))
            }
        }
    }

    /// Adds a variant directly to a persisted motif: upload, derive the
    /// public URL, insert the row.
    #[instrument(skip(self, request))]
    pub async fn add_variante(
        &self,
        motif_id: Uuid,
        request: AddVarianteRequest,
    ) -> Result<VarianteView, ServiceError> {
        let nom = request.nom.trim();
        if nom.is_empty() {
            return Err(ServiceError::ValidationError(
                "Le nom de la variante est requis".into(),
            ));
        }
        motif::Entity::find_by_id(motif_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Motif {motif_id} introuvable")))?;

        let data = request.image.decode()?;
        let object = storage::unique_object_name(&request.image.file_name);
        let content_type = storage::content_type_for(&object);
        self.storage
            .upload(BUCKET_VARIANTES_IMAGES, &object, data, content_type)
            .await?;
        let url = self.storage.public_url(BUCKET_VARIANTES_IMAGES, &object);

        let created = variante::ActiveModel {
            id: Set(Uuid::new_v4()),
            motif_id: Set(motif_id),
            nom: Set(nom.to_string()),
            image_url: Set(Some(url)),
        }
        .insert(&*self.db)
        .await?;

        Ok(VarianteView::assemble(created, Vec::new()))
    }

    /// Deletes a variant with its image and associations.
    #[instrument(skip(self))]
    pub async fn delete_variante(&self, variante_id: Uuid) -> Result<(), ServiceError> {
        let existing = variante::Entity::find_by_id(variante_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Variante {variante_id} introuvable"))
            })?;

        if let Some(url) = &existing.image_url {
            storage::remove_logged(&self.storage, BUCKET_VARIANTES_IMAGES, url).await;
        }

        self.db
            .transaction::<_, (), sea_orm::DbErr>(move |txn| {
                Box::pin(async move {
                    association::Entity::delete_many()
                        .filter(association::Column::VarianteId.eq(variante_id))
                        .exec(txn)
                        .await?;
                    variante::Entity::delete_by_id(variante_id).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten_db_tx_error)?;
        Ok(())
    }

    /// Attaches a model/color combination to a variant. Rejected when the
    /// pair is already associated to any variant of the same motif, or when
    /// it names an unknown model/color.
    #[instrument(skip(self, request))]
    pub async fn add_association(
        &self,
        variante_id: Uuid,
        request: AddAssociationRequest,
    ) -> Result<AssociationView, ServiceError> {
        let modele_nom = request.modele.trim().to_string();
        let couleur_nom = request.couleur.trim().to_string();
        if modele_nom.is_empty() || couleur_nom.is_empty() {
            return Err(ServiceError::ValidationError(
                "Le modèle et la couleur sont requis".into(),
            ));
        }

        let variante = variante::Entity::find_by_id(variante_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Variante {variante_id} introuvable"))
            })?;

        let known = self
            .modeles
            .catalog()
            .await?
            .into_iter()
            .any(|m| m.nom == modele_nom && m.couleurs.contains(&couleur_nom));
        if !known {
            return Err(ServiceError::ValidationError(format!(
                "Le modèle {modele_nom} n'a pas de couleur {couleur_nom}"
            )));
        }

        let sibling_ids: Vec<Uuid> = variante::Entity::find()
            .filter(variante::Column::MotifId.eq(variante.motif_id))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();
        let already = association::Entity::find()
            .filter(association::Column::VarianteId.is_in(sibling_ids))
            .filter(association::Column::Modele.eq(modele_nom.clone()))
            .filter(association::Column::Couleur.eq(couleur_nom.clone()))
            .one(&*self.db)
            .await?;
        if already.is_some() {
            return Err(ServiceError::DuplicateAssociation(format!(
                "L'association {modele_nom} / {couleur_nom} existe déjà sur une autre variante"
            )));
        }

        let created = association::ActiveModel {
            id: Set(Uuid::new_v4()),
            variante_id: Set(variante_id),
            modele: Set(modele_nom),
            couleur: Set(couleur_nom),
        }
        .insert(&*self.db)
        .await?;

        Ok(AssociationView::from(created))
    }

    #[instrument(skip(self))]
    pub async fn delete_association(&self, association_id: Uuid) -> Result<(), ServiceError> {
        let deleted = association::Entity::delete_by_id(association_id)
            .exec(&*self.db)
            .await?;
        if deleted.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Association {association_id} introuvable"
            )));
        }
        Ok(())
    }
}
