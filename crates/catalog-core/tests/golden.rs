//! End-to-end pipeline test: refresh a small fixture corpus, then walk the
//! same sequence of operations as the reference implementation's golden
//! output test (search, contract lookup, payload generate/validate,
//! snippets), asserting on structure rather than byte-for-byte golden files.

use catalog_core::config::{CatalogConfig, DerefMode};
use catalog_core::engine::CatalogEngine;

fn config(spec_dir: &std::path::Path) -> CatalogConfig {
    CatalogConfig {
        spec_dir: spec_dir.to_string_lossy().to_string(),
        index_path: ":memory:".to_string(),
        deref_mode: DerefMode::Lazy,
        semantic_enabled: false,
        embed_model: "BAAI/bge-small-en-v1.5".into(),
        execution_enabled: false,
        base_url_override: None,
        watch_enabled: false,
        watch_interval_secs: 2,
    }
}

fn write_pets_spec(dir: &std::path::Path) {
    std::fs::write(
        dir.join("pets.yaml"),
        r#"
openapi: 3.0.3
info:
  title: Pet Store
  version: "1.0.0"
servers:
  - url: https://api.pets.example.com
paths:
  /pets:
    post:
      operationId: createPet
      summary: Create a pet
      tags: [pets]
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/NewPet'
      responses:
        "201":
          description: created
  /pets/{petId}:
    get:
      operationId: getPet
      summary: Fetch a pet by id
      tags: [pets]
      parameters:
        - name: petId
          in: path
          required: true
          schema:
            type: string
            format: uuid
      responses:
        "200":
          description: ok
components:
  schemas:
    NewPet:
      type: object
      required: [name, tag]
      properties:
        name:
          type: string
        tag:
          type: string
"#,
    )
    .unwrap();
}

#[tokio::test]
async fn full_pipeline_produces_consistent_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    write_pets_spec(dir.path());

    let engine = CatalogEngine::new(config(dir.path())).unwrap();
    engine.refresh(false).await.unwrap();

    let catalog = engine.get_catalog().await;
    assert_eq!(catalog["specs"][0]["specId"], "pets");
    assert_eq!(catalog["specs"][0]["operationCount"], 2);
    assert_eq!(catalog["specs"][0]["isValid"], true);

    let search = engine.catalog_search("pet", None).await;
    let matches = search["matches"].as_array().unwrap();
    assert!(matches.iter().any(|m| m["endpointId"] == "pets:createPet"));
    assert!(matches.iter().any(|m| m["endpointId"] == "pets:getPet"));

    let contract = engine.endpoint_get("pets:createPet", true).await;
    assert_eq!(contract["method"], "post");
    assert_eq!(
        contract["requestBody"]["content"]["application/json"]["schema"]["required"],
        serde_json::json!(["name", "tag"])
    );

    let short_contract = engine.endpoint_get("pets:createPet", false).await;
    assert!(short_contract["requestBody"].is_null());

    let generated = engine.payload_generate("pets:createPet", None).await;
    assert_eq!(
        generated["unknownRequiredFields"],
        serde_json::json!(["body.name", "body.tag"])
    );
    assert_eq!(generated["request"]["method"], "post");
    assert_eq!(generated["request"]["path"], "/pets");

    let validation = engine.payload_validate("pets:createPet", &generated["request"]).await;
    assert!(validation.ok, "generated payload must validate: {:?}", validation.errors);

    let snippets = engine.snippet_generate(&generated["request"], None);
    let rendered = snippets["snippets"].as_object().unwrap();
    assert!(rendered.contains_key("curl"));
    assert!(rendered.contains_key("python"));
    assert!(rendered.contains_key("ts"));
    assert!(rendered["curl"].as_str().unwrap().contains("/pets"));

    let path_payload = engine.payload_generate("pets:getPet", None).await;
    assert_eq!(path_payload["unknownRequiredFields"], serde_json::json!(["params.path.petId"]));
    assert!(path_payload["request"]["parameters"]["path"]["petId"].is_string());
}

#[tokio::test]
async fn invalid_endpoint_reports_unknown_rather_than_panicking() {
    let dir = tempfile::tempdir().unwrap();
    write_pets_spec(dir.path());

    let engine = CatalogEngine::new(config(dir.path())).unwrap();
    engine.refresh(false).await.unwrap();

    assert_eq!(engine.get_operation_by_operation_id("pets", "noSuchOp").await, serde_json::json!({}));
    assert_eq!(engine.get_schema("pets", "NoSuchSchema").await, serde_json::json!({}));

    let execution = engine.execute_request("pets:missing", &serde_json::json!({}), None).await;
    assert!(!execution.ok);
    assert_eq!(execution.error.as_deref(), Some("Unknown endpointId"));
}
