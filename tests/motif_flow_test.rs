mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use common::{body_json, png_base64, TestApp};

/// Seeds the live catalog: Creator (Bordeaux, Noir) and Urban (Gris).
async fn seed_catalog(app: &TestApp) {
    for draft in [
        json!({
            "nom": "Creator",
            "couleurs": [
                { "id": "couleur-1", "nom": "Bordeaux", "valeur": { "type": "hex", "code": "#800020" } },
                { "id": "couleur-2", "nom": "Noir", "valeur": { "type": "hex", "code": "#000000" } }
            ]
        }),
        json!({
            "nom": "Urban",
            "couleurs": [
                { "id": "couleur-1", "nom": "Gris", "valeur": { "type": "hex", "code": "#808080" } }
            ]
        }),
    ] {
        let response = app
            .request(Method::POST, "/api/v1/modeles/save", Some(draft))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

fn avalon_draft() -> Value {
    json!({
        "id": null,
        "nom": "AVALON",
        "variantes": [
            {
                "id": "variante-1",
                "nom": "Version Noire",
                "image": { "file_name": "avalon.png", "data_base64": png_base64() },
                "associations": [
                    { "id": "association-1", "modele": "Creator", "couleur": "Bordeaux" },
                    { "id": "association-2", "modele": "Urban", "couleur": "Gris" }
                ]
            }
        ]
    })
}

#[tokio::test]
async fn submitting_a_new_motif_creates_the_whole_tree() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(avalon_draft()))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let motif_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    let motifs = body_json(response).await;
    assert_eq!(motifs.as_array().unwrap().len(), 1);
    assert_eq!(motifs[0]["id"], motif_id.as_str());
    assert_eq!(motifs[0]["nom"], "AVALON");

    let variante = &motifs[0]["variantes"][0];
    assert_eq!(variante["nom"], "Version Noire");
    // The temporary id was replaced by a real one.
    assert!(Uuid::parse_str(variante["id"].as_str().unwrap()).is_ok());
    // The uploaded image has a retrievable public URL.
    let image_url = variante["image_url"].as_str().unwrap();
    assert!(image_url.starts_with("memory://variantes-images/"));
    assert_eq!(app.storage.object_count("variantes-images").await, 1);
    // Both associations landed on the freshly created variant.
    assert_eq!(variante["associations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_pair_across_variants_is_rejected() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let draft = json!({
        "nom": "AVALON",
        "variantes": [
            {
                "id": "variante-1",
                "nom": "Version Noire",
                "image": null,
                "associations": [
                    { "id": "association-1", "modele": "Creator", "couleur": "Bordeaux" }
                ]
            },
            {
                "id": "variante-2",
                "nom": "Version Claire",
                "image": null,
                "associations": [
                    { "id": "association-2", "modele": "Creator", "couleur": "Bordeaux" }
                ]
            }
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(draft))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert!(!body["message"].as_str().unwrap_or_default().is_empty());

    // Nothing was created.
    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn adding_a_duplicate_association_leaves_both_variants_unchanged() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let draft = json!({
        "nom": "AVALON",
        "variantes": [
            {
                "id": "variante-1",
                "nom": "Version Noire",
                "image": null,
                "associations": [
                    { "id": "association-1", "modele": "Creator", "couleur": "Bordeaux" }
                ]
            },
            {
                "id": "variante-2",
                "nom": "Version Claire",
                "image": null,
                "associations": []
            }
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(draft))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    let motifs = body_json(response).await;
    let claire_id = motifs[0]["variantes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["nom"] == "Version Claire")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    // The pair already lives on "Version Noire".
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/variantes/{claire_id}/associations"),
            Some(json!({ "modele": "Creator", "couleur": "Bordeaux" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    let motifs = body_json(response).await;
    let variantes = motifs[0]["variantes"].as_array().unwrap();
    for v in variantes {
        let expected = if v["nom"] == "Version Noire" { 1 } else { 0 };
        assert_eq!(v["associations"].as_array().unwrap().len(), expected);
    }
}

#[tokio::test]
async fn partial_resubmit_cannot_claim_a_pair_held_by_an_omitted_variant() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(avalon_draft()))
        .await;
    let motif_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // The draft omits the persisted variant, which stays untouched and
    // keeps (Creator, Bordeaux). A new variant claiming the same pair
    // must be rejected motif-wide.
    let draft = json!({
        "id": motif_id,
        "nom": "AVALON",
        "variantes": [
            {
                "id": "variante-1",
                "nom": "Version Blanche",
                "image": null,
                "associations": [
                    { "id": "association-1", "modele": "Creator", "couleur": "Bordeaux" }
                ]
            }
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(draft))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    let motifs = body_json(response).await;
    let variantes = motifs[0]["variantes"].as_array().unwrap();
    assert_eq!(variantes.len(), 1);
    assert_eq!(variantes[0]["nom"], "Version Noire");

    // Removing the holder in the same draft frees the pair.
    let old_id = variantes[0]["id"].clone();
    let draft = json!({
        "id": motif_id,
        "nom": "AVALON",
        "variantes": [
            {
                "id": "variante-1",
                "nom": "Version Blanche",
                "image": null,
                "associations": [
                    { "id": "association-1", "modele": "Creator", "couleur": "Bordeaux" }
                ]
            }
        ],
        "variantes_supprimees": [old_id]
    });
    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(draft))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    let motifs = body_json(response).await;
    let variantes = motifs[0]["variantes"].as_array().unwrap();
    assert_eq!(variantes.len(), 1);
    assert_eq!(variantes[0]["nom"], "Version Blanche");
    assert_eq!(variantes[0]["associations"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn association_naming_an_unknown_pair_is_rejected() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let draft = json!({
        "nom": "AVALON",
        "variantes": [
            {
                "id": "variante-1",
                "nom": "Version Noire",
                "image": null,
                "associations": [
                    { "id": "association-1", "modele": "Creator", "couleur": "Violet" }
                ]
            }
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(draft))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn resubmitting_a_saved_motif_does_not_duplicate_children() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(avalon_draft()))
        .await;
    let motif_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // Rebuild the draft from the persisted state, as a reloading client
    // would, rename the variant, and submit again.
    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    let motifs = body_json(response).await;
    let variante = &motifs[0]["variantes"][0];
    let draft = json!({
        "id": motif_id,
        "nom": "AVALON",
        "variantes": [
            {
                "id": variante["id"],
                "nom": "Version Sombre",
                "image": null,
                "associations": variante["associations"]
            }
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(draft))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    let motifs = body_json(response).await;
    let variantes = motifs[0]["variantes"].as_array().unwrap();
    assert_eq!(variantes.len(), 1);
    assert_eq!(variantes[0]["nom"], "Version Sombre");
    assert_eq!(variantes[0]["associations"].as_array().unwrap().len(), 2);
    assert_eq!(app.storage.object_count("variantes-images").await, 1);
}

#[tokio::test]
async fn removed_variant_disappears_with_its_image() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(avalon_draft()))
        .await;
    let motif_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    let motifs = body_json(response).await;
    let variante_id = motifs[0]["variantes"][0]["id"].as_str().unwrap().to_string();

    let draft = json!({
        "id": motif_id,
        "nom": "AVALON",
        "variantes": [],
        "variantes_supprimees": [variante_id]
    });
    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(draft))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    let motifs = body_json(response).await;
    assert!(motifs[0]["variantes"].as_array().unwrap().is_empty());
    assert_eq!(app.storage.object_count("variantes-images").await, 0);
}

#[tokio::test]
async fn deleting_a_motif_cascades_to_variants_and_storage() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(avalon_draft()))
        .await;
    let motif_id = body_json(response).await["id"].as_str().unwrap().to_string();
    assert_eq!(app.storage.object_count("variantes-images").await, 1);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/motifs/{motif_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());
    assert_eq!(app.storage.object_count("variantes-images").await, 0);
}

#[tokio::test]
async fn detaching_an_association_on_resubmit() {
    let app = TestApp::new().await;
    seed_catalog(&app).await;

    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(avalon_draft()))
        .await;
    let motif_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    let motifs = body_json(response).await;
    let variante = &motifs[0]["variantes"][0];
    let detached = variante["associations"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["modele"] == "Urban")
        .unwrap()["id"]
        .clone();
    let kept: Vec<Value> = variante["associations"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|a| a["modele"] != "Urban")
        .cloned()
        .collect();

    let draft = json!({
        "id": motif_id,
        "nom": "AVALON",
        "variantes": [
            {
                "id": variante["id"],
                "nom": variante["nom"],
                "image": null,
                "associations": kept,
                "associations_supprimees": [detached]
            }
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/motifs/save", Some(draft))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/api/v1/motifs", None).await;
    let motifs = body_json(response).await;
    let associations = motifs[0]["variantes"][0]["associations"].as_array().unwrap();
    assert_eq!(associations.len(), 1);
    assert_eq!(associations[0]["modele"], "Creator");
    assert_eq!(associations[0]["couleur"], "Bordeaux");
}
