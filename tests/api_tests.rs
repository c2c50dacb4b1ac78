use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use fleet_backoffice::{create_router, AppState};

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "memory");
    assert_eq!(body["cache"], "memory");
    assert_eq!(body["cache_available"], true);
}

#[tokio::test]
async fn test_duplicate_unit_identifier() {
    let app = create_test_app();

    let (status, body) = send(&app, Method::POST, "/api/units", Some(unit("STZ", "12345678000100"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["identifier"], "STZ");
    assert_eq!(body["data"]["company"]["document"], "12345678000100");

    let (status, body) = send(&app, Method::POST, "/api/units", Some(unit("stz", "98765432000155"))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Já existe uma unidade com esse identificador");

    // no se creó ni la unidad ni la company
    let (_, body) = send(&app, Method::GET, "/api/units", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
    let (_, body) = send(&app, Method::GET, "/api/companies", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_unit_update_keeps_own_identifier() {
    let app = create_test_app();
    let (_, body) = send(&app, Method::POST, "/api/units", Some(unit("STZ", "12345678000100"))).await;
    let company_id = body["data"]["company_id"].as_i64().unwrap();
    send(&app, Method::POST, "/api/units", Some(unit("CWB", "98765432000155"))).await;

    let uri = format!("/api/units/{}", company_id);
    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "identifier": "STZ", "company": { "trade_name": "SANTA CRUZ" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["identifier"], "STZ");
    assert_eq!(body["data"]["company"]["trade_name"], "SANTA CRUZ");

    let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "identifier": "CWB" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Já existe uma unidade com esse identificador");
}

#[tokio::test]
async fn test_unit_update_document_follows_document_type() {
    let app = create_test_app();
    let (_, body) = send(&app, Method::POST, "/api/units", Some(unit("STZ", "12345678000100"))).await;
    let uri = format!("/api/units/{}", body["data"]["company_id"].as_i64().unwrap());

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "company": { "document": "12345678901" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["document_type"].is_array());

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["company"]["document"], "12345678000100");

    let (status, body) = send(
        &app,
        Method::PUT,
        &uri,
        Some(json!({ "company": { "document": "12345678901", "document_type": "cpf" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["company"]["document_type"], "cpf");
}

#[tokio::test]
async fn test_validation_errors_carry_details() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/units",
        Some(json!({ "company": { "name": "", "document": "123" } })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Dados inválidos");
    assert!(body["details"].is_object());
}

#[tokio::test]
async fn test_trip_lifecycle_and_dashboard() {
    let app = create_test_app();
    let fleet = register_fleet(&app).await;

    let departed_at = chrono::Utc::now() + chrono::Duration::hours(2);
    let arrived_at = departed_at + chrono::Duration::hours(10);
    let trip = json!({
        "status": "scheduled",
        "origin_id": fleet.origin_id,
        "destination_id": fleet.destination_id,
        "driver_id": fleet.driver_id,
        "truck_id": fleet.truck_id,
        "semi_trailer_id": fleet.semi_trailer_id,
        "departed_at": departed_at,
        "arrived_at": arrived_at,
        "order": " 4500012345 "
    });

    let (status, body) = send(&app, Method::POST, "/api/trips", Some(trip.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["draft"], false);
    assert_eq!(body["data"]["order"], "4500012345");
    let trip_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&app, Method::POST, "/api/trips/drafts", Some(json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["draft"], true);
    assert_eq!(body["data"]["status"], "scheduled");

    let mut loaded = trip.clone();
    loaded["status"] = json!("loaded");
    let (status, body) = send(&app, Method::PUT, &format!("/api/trips/{}", trip_id), Some(loaded)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "loaded");

    let (status, body) = send(&app, Method::GET, "/api/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let dashboard = &body["data"];
    assert_eq!(dashboard["counts"]["scheduled"], 0);
    assert_eq!(dashboard["counts"]["in_progress"], 1);
    assert_eq!(dashboard["counts"]["drafts"], 1);
    assert_eq!(dashboard["overview"].as_array().map(Vec::len), Some(7));

    let in_progress = &dashboard["in_progress"][0];
    assert_eq!(in_progress["truck_plate"], "RST1A23");
    assert_eq!(in_progress["trailer_plates"], "OPQ-5678");
    assert_eq!(in_progress["origin"]["location"], "RIO BRANCO DO SUL, PR");

    let (_, body) = send(&app, Method::GET, "/api/trips?draft=true", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, body) = send(&app, Method::GET, "/api/trips?limit=-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_trip_with_unknown_origin() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trips/drafts",
        Some(json!({ "origin_id": 999 })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Origem não encontrada");
}

#[tokio::test]
async fn test_client_in_use_cannot_be_deleted() {
    let app = create_test_app();
    let fleet = register_fleet(&app).await;
    send(
        &app,
        Method::POST,
        "/api/trips/drafts",
        Some(json!({ "origin_id": fleet.origin_id })),
    )
    .await;

    let uri = format!("/api/clients/{}", fleet.origin_id);
    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Não é possível excluir: o registro está em uso");

    let uri = format!("/api/clients/{}", fleet.destination_id);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_wizard_flow() {
    let app = create_test_app();
    let fleet = register_fleet(&app).await;

    // paso 1 vacío: error de validación con detalles, sin acción
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trip-wizard",
        Some(json!({ "command": { "type": "next" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].is_object());

    let departed_at = chrono::Utc::now() + chrono::Duration::days(1);
    let wizard = json!({
        "step": 1,
        "trip_id": null,
        "values": {
            "status": "scheduled",
            "origin_id": fleet.origin_id,
            "destination_id": fleet.destination_id,
            "departed_at": departed_at,
            "arrived_at": departed_at + chrono::Duration::hours(6)
        }
    });
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trip-wizard",
        Some(json!({ "wizard": wizard, "command": { "type": "next" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["wizard"]["step"], 2);
    assert!(body["data"]["trip"].is_null());

    // paso 2 incompleto: mensaje único
    let wizard = body["data"]["wizard"].clone();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trip-wizard",
        Some(json!({ "wizard": wizard.clone(), "command": { "type": "next" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Preencha todos os campos obrigatórios");

    // el conjunto trae su primera carga como default
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/trip-wizard",
        Some(json!({
            "wizard": wizard,
            "command": { "type": "select_semi_trailer", "semi_trailer_id": fleet.semi_trailer_id }
        })),
    )
    .await;
    let mut wizard = body["data"]["wizard"].clone();
    assert!(wizard["values"]["cargo_id"].is_i64());

    // rascunho desde el paso 2: guarda y vuelve al paso 2
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trip-wizard",
        Some(json!({ "wizard": wizard.clone(), "command": { "type": "save_draft" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["wizard"]["step"], 2);
    assert_eq!(body["data"]["trip"]["draft"], true);

    // completar y programar desde el resumen: update del mismo viaje
    wizard = body["data"]["wizard"].clone();
    wizard["values"]["driver_id"] = json!(fleet.driver_id);
    wizard["values"]["truck_id"] = json!(fleet.truck_id);
    wizard["step"] = json!(3);
    let draft_id = wizard["trip_id"].clone();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trip-wizard",
        Some(json!({ "wizard": wizard, "command": { "type": "submit" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["trip"]["id"], draft_id);
    assert_eq!(body["data"]["trip"]["draft"], false);

    let (_, body) = send(&app, Method::GET, "/api/trips", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_wizard_rejects_steps_outside_the_form() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trip-wizard",
        Some(json!({ "wizard": { "step": 0 }, "command": { "type": "submit" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passo inválido");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trip-wizard",
        Some(json!({ "wizard": { "step": 4 }, "command": { "type": "submit" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passo inválido");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/trip-wizard",
        Some(json!({ "command": { "type": "go_to", "step": 4 } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Passo inválido");

    let (_, body) = send(&app, Method::GET, "/api/trips", None).await;
    assert_eq!(body["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_import_units() {
    let app = create_test_app();
    let sheet = "Nome,Nome fantasia,CNPJ,CEP,Estado,Cidade,Endereço\n\
                 Cimentos Sul Ltda,Cimentos Sul,11222333000181,80010-000,PR,Curitiba,Rua XV 100\n\
                 ,,,,,,\n";

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/units/import")
        .header("content-type", "text/csv")
        .body(Body::from(sheet))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["data"]["created"], 1);
    assert_eq!(body["data"]["failed"][0]["row"], 2);
}

struct Fleet {
    origin_id: i64,
    destination_id: i64,
    driver_id: i64,
    truck_id: i64,
    semi_trailer_id: i64,
}

async fn register_fleet(app: &axum::Router) -> Fleet {
    let (_, origin) = send(
        app,
        Method::POST,
        "/api/clients",
        Some(json!({ "company": {
            "name": "CIMENTOS DO SUL SA",
            "document": "11222333000181",
            "address": { "state": "PARANÁ", "city": "RIO BRANCO DO SUL" }
        } })),
    )
    .await;
    let (_, destination) = send(
        app,
        Method::POST,
        "/api/clients",
        Some(json!({ "company": { "name": "CONSTRUTORA LITORAL LTDA", "document": "44555666000122" } })),
    )
    .await;
    let (_, driver) = send(
        app,
        Method::POST,
        "/api/drivers",
        Some(json!({
            "person": { "name": "João da Silva", "document": "52998224725" },
            "cnh": "12345678900"
        })),
    )
    .await;
    let (_, truck) = send(
        app,
        Method::POST,
        "/api/trucks",
        Some(json!({ "vehicle": { "license_plate": "RST1A23" }, "compressor": true })),
    )
    .await;
    let (_, semi_trailer) = send(
        app,
        Method::POST,
        "/api/semi-trailers",
        Some(json!({
            "type": "silo",
            "configuration": { "name": "ls", "number_of_trailers": 1 },
            "cargos": ["cimento", "cal"],
            "trailers": [{ "vehicle": { "license_plate": "opq5678" } }]
        })),
    )
    .await;

    Fleet {
        origin_id: origin["data"]["company_id"].as_i64().unwrap(),
        destination_id: destination["data"]["company_id"].as_i64().unwrap(),
        driver_id: driver["data"]["person_id"].as_i64().unwrap(),
        truck_id: truck["data"]["id"].as_i64().unwrap(),
        semi_trailer_id: semi_trailer["data"]["id"].as_i64().unwrap(),
    }
}

fn unit(identifier: &str, document: &str) -> Value {
    json!({
        "identifier": identifier,
        "company": {
            "name": "TRANSPORTES SANTA CRUZ LTDA",
            "document": document,
            "document_type": "cnpj",
            "address": { "zip_code": "88301-000", "state": "SC", "city": "ITAJAÍ" }
        }
    })
}

async fn send(app: &axum::Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
}

// Función helper para crear la app de test
fn create_test_app() -> axum::Router {
    create_router(AppState::in_memory())
}
