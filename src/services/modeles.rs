use std::collections::HashMap;
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionError,
    TransactionTrait,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::db::DbPool;
use crate::dto::modeles::{
    AddCouleurRequest, AddElementRequest, CatalogModele, CouleurValeurDraft, CouleurView,
    ElementView, ModeleDraft, ModeleView,
};
use crate::entities::{couleur, element_superposable, modele};
use crate::errors::ServiceError;
use crate::ids::is_temp_id;
use crate::storage::{
    self, ObjectStore, BUCKET_BASES_TEXTILES, BUCKET_ELEMENTS_SUPERPOSABLES,
};

/// New color prepared for insertion, uploads already done.
struct PreparedCouleur {
    nom: String,
    code_hex: Option<String>,
    image_url: Option<String>,
}

/// Service for managing models, their base-textile colors and overlay
/// elements.
#[derive(Clone)]
pub struct ModeleService {
    db: Arc<DbPool>,
    storage: Arc<dyn ObjectStore>,
}

impl ModeleService {
    pub fn new(db: Arc<DbPool>, storage: Arc<dyn ObjectStore>) -> Self {
        Self { db, storage }
    }

    /// All models with their nested couleurs and elements.
    #[instrument(skip(self))]
    pub async fn get_all_modeles(&self) -> Result<Vec<ModeleView>, ServiceError> {
        let db = &*self.db;
        let modeles = modele::Entity::find()
            .order_by_asc(modele::Column::CreatedAt)
            .all(db)
            .await?;
        let couleurs = couleur::Entity::find().all(db).await?;
        let elements = element_superposable::Entity::find().all(db).await?;

        let mut couleurs_by_modele: HashMap<Uuid, Vec<couleur::Model>> = HashMap::new();
        for c in couleurs {
            couleurs_by_modele.entry(c.modele_id).or_default().push(c);
        }
        let mut elements_by_modele: HashMap<Uuid, Vec<element_superposable::Model>> =
            HashMap::new();
        for e in elements {
            elements_by_modele.entry(e.modele_id).or_default().push(e);
        }

        Ok(modeles
            .into_iter()
            .map(|m| {
                let couleurs = couleurs_by_modele.remove(&m.id).unwrap_or_default();
                let elements = elements_by_modele.remove(&m.id).unwrap_or_default();
                ModeleView::assemble(m, couleurs, elements)
            })
            .collect())
    }

    /// A single model with its nested couleurs and elements.
    #[instrument(skip(self))]
    pub async fn get_modele(&self, modele_id: Uuid) -> Result<ModeleView, ServiceError> {
        let db = &*self.db;
        let modele = modele::Entity::find_by_id(modele_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Modèle {modele_id} introuvable")))?;
        let couleurs = couleur::Entity::find()
            .filter(couleur::Column::ModeleId.eq(modele_id))
            .all(db)
            .await?;
        let elements = element_superposable::Entity::find()
            .filter(element_superposable::Column::ModeleId.eq(modele_id))
            .all(db)
            .await?;
        Ok(ModeleView::assemble(modele, couleurs, elements))
    }

    /// Live association options: every persisted model name with its color
    /// names. Replaces the historical hard-coded catalog.
    #[instrument(skip(self))]
    pub async fn catalog(&self) -> Result<Vec<CatalogModele>, ServiceError> {
        let db = &*self.db;
        let modeles = modele::Entity::find()
            .order_by_asc(modele::Column::CreatedAt)
            .all(db)
            .await?;
        let couleurs = couleur::Entity::find().all(db).await?;

        let mut noms_by_modele: HashMap<Uuid, Vec<String>> = HashMap::new();
        for c in couleurs {
            noms_by_modele.entry(c.modele_id).or_default().push(c.nom);
        }

        Ok(modeles
            .into_iter()
            .map(|m| CatalogModele {
                couleurs: noms_by_modele.remove(&m.id).unwrap_or_default(),
                nom: m.nom,
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn create_modele(&self, nom: &str) -> Result<modele::Model, ServiceError> {
        let nom = nom.trim();
        if nom.is_empty() {
            return Err(ServiceError::ValidationError(
                "Le nom du modèle est requis".into(),
            ));
        }
        let model = modele::ActiveModel {
            id: Set(Uuid::new_v4()),
            nom: Set(nom.to_string()),
            created_at: Set(chrono::Utc::now()),
        };
        let created = model.insert(&*self.db).await?;
        info!(modele_id = %created.id, "created modele");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update_modele(&self, modele_id: Uuid, nom: &str) -> Result<(), ServiceError> {
        let nom = nom.trim();
        if nom.is_empty() {
            return Err(ServiceError::ValidationError(
                "Le nom du modèle est requis".into(),
            ));
        }
        let existing = modele::Entity::find_by_id(modele_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Modèle {modele_id} introuvable")))?;
        let mut active: modele::ActiveModel = existing.into();
        active.nom = Set(nom.to_string());
        active.update(&*self.db).await?;
        Ok(())
    }

    /// Deletes a model, attempting removal of every couleur swatch and
    /// element image from the object store before the rows disappear.
    #[instrument(skip(self))]
    pub async fn delete_modele(&self, modele_id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db;
        modele::Entity::find_by_id(modele_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Modèle {modele_id} introuvable")))?;

        let couleurs = couleur::Entity::find()
            .filter(couleur::Column::ModeleId.eq(modele_id))
            .all(db)
            .await?;
        let elements = element_superposable::Entity::find()
            .filter(element_superposable::Column::ModeleId.eq(modele_id))
            .all(db)
            .await?;

        for c in &couleurs {
            if let Some(url) = &c.image_url {
                storage::remove_logged(&self.storage, BUCKET_BASES_TEXTILES, url).await;
            }
        }
        for e in &elements {
            if let Some(url) = &e.image_url {
                storage::remove_logged(&self.storage, BUCKET_ELEMENTS_SUPERPOSABLES, url).await;
            }
        }

        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    couleur::Entity::delete_many()
                        .filter(couleur::Column::ModeleId.eq(modele_id))
                        .exec(txn)
                        .await?;
                    element_superposable::Entity::delete_many()
                        .filter(element_superposable::Column::ModeleId.eq(modele_id))
                        .exec(txn)
                        .await?;
                    modele::Entity::delete_by_id(modele_id).exec(txn).await?;
                    Ok(())
                })
            })
            .await
            .map_err(flatten_db_tx_error)?;

        info!(modele_id = %modele_id, "deleted modele");
        Ok(())
    }

    /// Applies a whole model editing session: create-or-rename the model,
    /// insert colors added during the session, delete removed ones — one
    /// database transaction. Pending swatch images are uploaded first and
    /// removed again if the transaction fails.
    #[instrument(skip(self, draft), fields(modele_id = ?draft.id))]
    pub async fn save_modele(&self, draft: ModeleDraft) -> Result<Uuid, ServiceError> {
        let nom = draft.nom.trim().to_string();
        if nom.is_empty() {
            return Err(ServiceError::ValidationError(
                "Le nom du modèle est requis".into(),
            ));
        }

        // Colors added in this session carry temporary ids; colors with
        // UUID ids already exist remotely and are left untouched.
        let mut prepared: Vec<PreparedCouleur> = Vec::new();
        let mut uploaded: Vec<(String, String)> = Vec::new();
        for c in draft.couleurs.iter().filter(|c| is_temp_id(&c.id)) {
            let couleur_nom = c.nom.trim();
            let Some(valeur) = &c.valeur else {
                return Err(ServiceError::ValidationError(
                    "Le nom et la couleur sont requis".into(),
                ));
            };
            if couleur_nom.is_empty() {
                return Err(ServiceError::ValidationError(
                    "Le nom et la couleur sont requis".into(),
                ));
            }
            match valeur {
                CouleurValeurDraft::Hex { code } => {
                    let code = code.trim();
                    if code.is_empty() {
                        return Err(ServiceError::ValidationError(
                            "Le nom et la couleur sont requis".into(),
                        ));
                    }
                    prepared.push(PreparedCouleur {
                        nom: couleur_nom.to_string(),
                        code_hex: Some(code.to_string()),
                        image_url: None,
                    });
                }
                CouleurValeurDraft::Image { fichier } => {
                    let data = fichier.decode()?;
                    let object = storage::unique_object_name(&fichier.file_name);
                    let content_type = storage::content_type_for(&object);
                    self.storage
                        .upload(BUCKET_BASES_TEXTILES, &object, data, content_type)
                        .await?;
                    let url = self.storage.public_url(BUCKET_BASES_TEXTILES, &object);
                    uploaded.push((BUCKET_BASES_TEXTILES.to_string(), object));
                    prepared.push(PreparedCouleur {
                        nom: couleur_nom.to_string(),
                        code_hex: None,
                        image_url: Some(url),
                    });
                }
            }
        }

        // Image urls of removed colors, collected before the rows go away.
        let removed_urls: Vec<String> = if draft.id.is_some()
            && !draft.couleurs_supprimees.is_empty()
        {
            couleur::Entity::find()
                .filter(couleur::Column::Id.is_in(draft.couleurs_supprimees.clone()))
                .all(&*self.db)
                .await?
                .into_iter()
                .filter_map(|c| c.image_url)
                .collect()
        } else {
            Vec::new()
        };

        let draft_id = draft.id;
        let couleurs_supprimees = draft.couleurs_supprimees.clone();
        let result = self
            .db
            .transaction::<_, Uuid, ServiceError>(move |txn| {
                Box::pin(async move {
                    let modele_id = match draft_id {
                        Some(id) => {
                            let existing = modele::Entity::find_by_id(id)
                                .one(txn)
                                .await?
                                .ok_or_else(|| {
                                    ServiceError::NotFound(format!("Modèle {id} introuvable"))
                                })?;
                            let mut active: modele::ActiveModel = existing.into();
                            active.nom = Set(nom);
                            active.update(txn).await?;
                            id
                        }
                        None => {
                            let id = Uuid::new_v4();
                            modele::ActiveModel {
                                id: Set(id),
                                nom: Set(nom),
                                created_at: Set(chrono::Utc::now()),
                            }
                            .insert(txn)
                            .await?;
                            id
                        }
                    };

                    if !couleurs_supprimees.is_empty() {
                        couleur::Entity::delete_many()
                            .filter(couleur::Column::Id.is_in(couleurs_supprimees))
                            .filter(couleur::Column::ModeleId.eq(modele_id))
                            .exec(txn)
                            .await?;
                    }

                    for p in prepared {
                        couleur::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            modele_id: Set(modele_id),
                            nom: Set(p.nom),
                            code_hex: Set(p.code_hex),
                            image_url: Set(p.image_url),
                        }
                        .insert(txn)
                        .await?;
                    }

                    Ok(modele_id)
                })
            })
            .await;

        match result {
            Ok(modele_id) => {
                for url in removed_urls {
                    storage::remove_logged(&self.storage, BUCKET_BASES_TEXTILES, &url).await;
                }
                info!(modele_id = %modele_id, "saved modele draft");
                Ok(modele_id)
            }
            Err(err) => {
                // Compensate the uploads so a failed submit leaves no
                // orphan objects behind.
                for (bucket, object) in &uploaded {
                    if let Err(cleanup_err) = self.storage.remove(bucket, object).await {
                        tracing::warn!(bucket, object, "compensation failed: {cleanup_err}");
                    }
                }
                Err(flatten_tx_error(err))
            }
        }
    }

    /// Adds a color directly to a persisted model.
    #[instrument(skip(self, request))]
    pub async fn add_couleur(
        &self,
        modele_id: Uuid,
        request: AddCouleurRequest,
    ) -> Result<CouleurView, ServiceError> {
        let nom = request.nom.trim();
        if nom.is_empty() {
            return Err(ServiceError::ValidationError(
                "Le nom et la couleur sont requis".into(),
            ));
        }
        modele::Entity::find_by_id(modele_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Modèle {modele_id} introuvable")))?;

        let (code_hex, image_url) = match &request.valeur {
            CouleurValeurDraft::Hex { code } => {
                let code = code.trim();
                if code.is_empty() {
                    return Err(ServiceError::ValidationError(
                        "Le nom et la couleur sont requis".into(),
                    ));
                }
                (Some(code.to_string()), None)
            }
            CouleurValeurDraft::Image { fichier } => {
                let data = fichier.decode()?;
                let object = storage::unique_object_name(&fichier.file_name);
                let content_type = storage::content_type_for(&object);
                self.storage
                    .upload(BUCKET_BASES_TEXTILES, &object, data, content_type)
                    .await?;
                (
                    None,
                    Some(self.storage.public_url(BUCKET_BASES_TEXTILES, &object)),
                )
            }
        };

        let created = couleur::ActiveModel {
            id: Set(Uuid::new_v4()),
            modele_id: Set(modele_id),
            nom: Set(nom.to_string()),
            code_hex: Set(code_hex),
            image_url: Set(image_url),
        }
        .insert(&*self.db)
        .await?;

        Ok(CouleurView::from(created))
    }

    /// Deletes a color, removing its swatch image when it has one.
    #[instrument(skip(self))]
    pub async fn delete_couleur(&self, couleur_id: Uuid) -> Result<(), ServiceError> {
        let existing = couleur::Entity::find_by_id(couleur_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Couleur {couleur_id} introuvable")))?;

        if let Some(url) = &existing.image_url {
            storage::remove_logged(&self.storage, BUCKET_BASES_TEXTILES, url).await;
        }
        couleur::Entity::delete_by_id(couleur_id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    /// Adds an overlay element: upload the image, derive its public URL,
    /// insert the row with its compositing position.
    #[instrument(skip(self, request))]
    pub async fn add_element(
        &self,
        modele_id: Uuid,
        request: AddElementRequest,
    ) -> Result<ElementView, ServiceError> {
        let nom = request.nom.trim();
        if nom.is_empty() {
            return Err(ServiceError::ValidationError(
                "Le nom de l'élément est requis".into(),
            ));
        }
        modele::Entity::find_by_id(modele_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Modèle {modele_id} introuvable")))?;

        let data = request.image.decode()?;
        let object = storage::unique_object_name(&request.image.file_name);
        let content_type = storage::content_type_for(&object);
        self.storage
            .upload(BUCKET_ELEMENTS_SUPERPOSABLES, &object, data, content_type)
            .await?;
        let url = self
            .storage
            .public_url(BUCKET_ELEMENTS_SUPERPOSABLES, &object);

        let created = element_superposable::ActiveModel {
            id: Set(Uuid::new_v4()),
            modele_id: Set(modele_id),
            nom: Set(nom.to_string()),
            image_url: Set(Some(url)),
            position_x: Set(request.position_x),
            position_y: Set(request.position_y),
        }
        .insert(&*self.db)
        .await?;

        Ok(ElementView::from(created))
    }

    #[instrument(skip(self))]
    pub async fn update_element_position(
        &self,
        element_id: Uuid,
        position_x: i32,
        position_y: i32,
    ) -> Result<(), ServiceError> {
        let existing = element_superposable::Entity::find_by_id(element_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Élément {element_id} introuvable"))
            })?;
        let mut active: element_superposable::ActiveModel = existing.into();
        active.position_x = Set(position_x);
        active.position_y = Set(position_y);
        active.update(&*self.db).await?;
        Ok(())
    }

    /// Deletes an element, removing its stored image first.
    #[instrument(skip(self))]
    pub async fn delete_element(&self, element_id: Uuid) -> Result<(), ServiceError> {
        let existing = element_superposable::Entity::find_by_id(element_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Élément {element_id} introuvable"))
            })?;

        if let Some(url) = &existing.image_url {
            storage::remove_logged(&self.storage, BUCKET_ELEMENTS_SUPERPOSABLES, url).await;
        }
        element_superposable::Entity::delete_by_id(element_id)
            .exec(&*self.db)
            .await?;
        Ok(())
    }
}

pub(crate) fn flatten_tx_error(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(e) => ServiceError::DatabaseError(e),
        TransactionError::Transaction(e) => e,
    }
}

pub(crate) fn flatten_db_tx_error(err: TransactionError<sea_orm::DbErr>) -> ServiceError {
    match err {
        TransactionError::Connection(e) | TransactionError::Transaction(e) => {
            ServiceError::DatabaseError(e)
        }
    }
}
