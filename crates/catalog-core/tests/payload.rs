//! Integration-level payload heuristics coverage across a small multi-spec
//! corpus: allOf merging, oneOf/discriminator selection, and recursion
//! bottoming out, all driven through `CatalogEngine::payload_generate` rather
//! than the crate-internal functions `src/payload.rs` already unit-tests.

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

fn write_billing_spec(dir: &std::path::Path) {
    std::fs::write(
        dir.join("billing.yaml"),
        r#"
openapi: 3.1.0
info:
  title: Billing
  version: "2.0.0"
paths:
  /charges:
    post:
      operationId: createCharge
      requestBody:
        required: true
        content:
          application/json:
            schema:
              allOf:
                - type: object
                  required: [amount]
                  properties:
                    amount:
                      type: number
                - type: object
                  required: [currency]
                  properties:
                    currency:
                      type: string
      responses:
        "201":
          description: created
  /payment-methods:
    post:
      operationId: createPaymentMethod
      requestBody:
        required: true
        content:
          application/json:
            schema:
              oneOf:
                - type: object
                  properties:
                    kind: { const: card }
                    last4: { type: string }
                - type: object
                  properties:
                    kind: { const: bank }
                    routingNumber: { type: string }
              discriminator:
                propertyName: kind
                mapping:
                  card: "#/components/schemas/Card"
                  bank: "#/components/schemas/Bank"
      responses:
        "201":
          description: created
"#,
    )
    .unwrap();
}

#[tokio::test]
async fn all_of_request_body_merges_both_branches_required_fields() {
    let dir = tempfile::tempdir().unwrap();
    write_billing_spec(dir.path());
    let engine = CatalogEngine::new(config(dir.path())).unwrap();
    engine.refresh(false).await.unwrap();

    let generated = engine.payload_generate("billing:createCharge", None).await;
    let mut unknowns: Vec<&str> = generated["unknownRequiredFields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    unknowns.sort();
    assert_eq!(unknowns, vec!["body.amount", "body.currency"]);
    assert!(generated["request"]["body"]["amount"].is_number());
    assert!(generated["request"]["body"]["currency"].is_string());
}

#[tokio::test]
async fn discriminator_mapping_picks_matching_branch_through_the_engine() {
    let dir = tempfile::tempdir().unwrap();
    write_billing_spec(dir.path());
    let engine = CatalogEngine::new(config(dir.path())).unwrap();
    engine.refresh(false).await.unwrap();

    let provided = serde_json::json!({"body": {"kind": "bank"}});
    let generated = engine.payload_generate("billing:createPaymentMethod", Some(&provided)).await;
    assert_eq!(generated["request"]["body"]["kind"], "bank");
    assert!(generated["request"]["body"]["routingNumber"].is_string());
    assert!(generated["request"]["body"].get("last4").is_none());
}

#[tokio::test]
async fn oas31_dialect_is_selected_for_validation_by_openapi_field() {
    let dir = tempfile::tempdir().unwrap();
    write_billing_spec(dir.path());
    let engine = CatalogEngine::new(config(dir.path())).unwrap();
    engine.refresh(false).await.unwrap();

    let generated = engine.payload_generate("billing:createCharge", None).await;
    let validation = engine.payload_validate("billing:createCharge", &generated["request"]).await;
    assert!(validation.ok, "oas31 spec should validate under draft 2020-12: {:?}", validation.errors);
}
