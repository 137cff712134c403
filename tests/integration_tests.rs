mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{body_json, png_base64, TestApp};

#[tokio::test]
async fn health_reports_database_up() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "up");
    assert_eq!(body["database"]["status"], "up");
}

#[tokio::test]
async fn modele_draft_scenario_tshirt_creator() {
    let app = TestApp::new().await;

    // Create "T-Shirt Creator" with two hex colors in one submit.
    let draft = json!({
        "id": null,
        "nom": "T-Shirt Creator",
        "couleurs": [
            { "id": "couleur-1", "nom": "Bordeaux", "valeur": { "type": "hex", "code": "#800020" } },
            { "id": "couleur-2", "nom": "Noir", "valeur": { "type": "hex", "code": "#000000" } }
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/modeles/save", Some(draft))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The list shows 2 bases textiles, 0 éléments superposables.
    let response = app.request(Method::GET, "/api/v1/modeles", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let modeles = body_json(response).await;
    assert_eq!(modeles.as_array().unwrap().len(), 1);
    assert_eq!(modeles[0]["nom"], "T-Shirt Creator");
    assert_eq!(modeles[0]["couleurs"].as_array().unwrap().len(), 2);
    assert_eq!(
        modeles[0]["elements_superposables"].as_array().unwrap().len(),
        0
    );

    // Delete "Noir"; exactly "Bordeaux" remains.
    let noir_id = modeles[0]["couleurs"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["nom"] == "Noir")
        .expect("Noir present")["id"]
        .as_str()
        .unwrap()
        .to_string();
    let response = app
        .request(Method::DELETE, &format!("/api/v1/couleurs/{noir_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.request(Method::GET, "/api/v1/modeles", None).await;
    let modeles = body_json(response).await;
    let couleurs = modeles[0]["couleurs"].as_array().unwrap();
    assert_eq!(couleurs.len(), 1);
    assert_eq!(couleurs[0]["nom"], "Bordeaux");
    assert_eq!(couleurs[0]["valeur"]["type"], "hex");
    assert_eq!(couleurs[0]["valeur"]["code"], "#800020");
}

#[tokio::test]
async fn catalog_reflects_persisted_modeles() {
    let app = TestApp::new().await;

    let draft = json!({
        "nom": "Creator",
        "couleurs": [
            { "id": "couleur-1", "nom": "Bordeaux", "valeur": { "type": "hex", "code": "#800020" } },
            { "id": "couleur-2", "nom": "Marine", "valeur": { "type": "hex", "code": "#001f3f" } }
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/modeles/save", Some(draft))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .request(Method::GET, "/api/v1/modeles/catalog", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let catalog = body_json(response).await;
    assert_eq!(catalog.as_array().unwrap().len(), 1);
    assert_eq!(catalog[0]["nom"], "Creator");
    let couleurs = catalog[0]["couleurs"].as_array().unwrap();
    assert!(couleurs.contains(&json!("Bordeaux")));
    assert!(couleurs.contains(&json!("Marine")));
}

#[tokio::test]
async fn deleting_a_modele_removes_its_images_from_storage() {
    let app = TestApp::new().await;

    // One swatch-image color and one overlay element.
    let draft = json!({
        "nom": "Urban",
        "couleurs": [
            { "id": "couleur-1", "nom": "Gris", "valeur": { "type": "image", "fichier": { "file_name": "gris.png", "data_base64": png_base64() } } }
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/modeles/save", Some(draft))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let modele_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let element = json!({
        "nom": "Logo",
        "image": { "file_name": "logo.png", "data_base64": png_base64() },
        "position_x": 40,
        "position_y": 12
    });
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/modeles/{modele_id}/elements"),
            Some(element),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    assert_eq!(app.storage.object_count("bases-textiles").await, 1);
    assert_eq!(app.storage.object_count("elements-superposables").await, 1);

    let response = app
        .request(Method::DELETE, &format!("/api/v1/modeles/{modele_id}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(app.storage.object_count("bases-textiles").await, 0);
    assert_eq!(app.storage.object_count("elements-superposables").await, 0);

    let response = app.request(Method::GET, "/api/v1/modeles", None).await;
    let modeles = body_json(response).await;
    assert!(modeles.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn resubmitting_without_deletions_leaves_colors_alone() {
    let app = TestApp::new().await;

    let draft = json!({
        "nom": "Creator",
        "couleurs": [
            { "id": "couleur-1", "nom": "Bordeaux", "valeur": { "type": "hex", "code": "#800020" } },
            { "id": "couleur-2", "nom": "Noir", "valeur": { "type": "hex", "code": "#000000" } }
        ]
    });
    let response = app
        .request(Method::POST, "/api/v1/modeles/save", Some(draft))
        .await;
    let modele_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // A later session renames the model. Colors it does not explicitly
    // remove stay untouched, even when absent from the draft list.
    let rename = json!({
        "id": modele_id,
        "nom": "Creator V2",
        "couleurs": [],
        "couleurs_supprimees": []
    });
    let response = app
        .request(Method::POST, "/api/v1/modeles/save", Some(rename))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.request(Method::GET, "/api/v1/modeles", None).await;
    let modeles = body_json(response).await;
    assert_eq!(modeles[0]["nom"], "Creator V2");
    assert_eq!(modeles[0]["couleurs"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn blank_modele_name_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/modeles",
            Some(json!({ "nom": "" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(!body["message"].as_str().unwrap_or_default().is_empty());
}

#[tokio::test]
async fn element_position_can_be_updated() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::POST,
            "/api/v1/modeles",
            Some(json!({ "nom": "Creator" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let modele_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let element = json!({
        "nom": "Ecusson",
        "image": { "file_name": "ecusson.png", "data_base64": png_base64() }
    });
    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/modeles/{modele_id}/elements"),
            Some(element),
        )
        .await;
    let element_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/elements/{element_id}/position"),
            Some(json!({ "position_x": 120, "position_y": -8 })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .request(Method::GET, &format!("/api/v1/modeles/{modele_id}"), None)
        .await;
    let modele = body_json(response).await;
    let element = &modele["elements_superposables"][0];
    assert_eq!(element["position_x"], 120);
    assert_eq!(element["position_y"], -8);
    assert!(element["image_url"]
        .as_str()
        .unwrap()
        .starts_with("memory://elements-superposables/"));
}

#[tokio::test]
async fn unknown_ids_return_not_found() {
    let app = TestApp::new().await;
    let missing = uuid::Uuid::new_v4();

    for uri in [
        format!("/api/v1/modeles/{missing}"),
        format!("/api/v1/motifs/{missing}"),
    ] {
        let response = app.request(Method::GET, &uri, None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }

    let response = app
        .request(Method::DELETE, &format!("/api/v1/couleurs/{missing}"), None)
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
