//! Multi-spec corpus behavior the single-fixture tests in `src/engine.rs`
//! don't exercise: an invalid spec alongside a valid one, `spec_id` scoping
//! in search, and the watcher's polling/refresh loop end to end.

use std::sync::Arc;
use std::time::Duration;

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
        watch_enabled: true,
        watch_interval_secs: 1,
    }
}

#[tokio::test]
async fn invalid_spec_does_not_contribute_operations_but_valid_specs_still_index() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("pets.yaml"),
        r#"
openapi: 3.0.3
info:
  title: Pet Store
  version: "1.0.0"
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        "200":
          description: ok
"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("broken.yaml"),
        r#"
paths:
  /broken:
    get:
      operationId: brokenOp
"#,
    )
    .unwrap();

    let mut cfg = config(dir.path());
    cfg.watch_enabled = false;
    let engine = CatalogEngine::new(cfg).unwrap();
    engine.refresh(false).await.unwrap();

    let catalog = engine.get_catalog().await;
    let specs = catalog["specs"].as_array().unwrap();
    let pets_meta = specs.iter().find(|s| s["specId"] == "pets").unwrap();
    let broken_meta = specs.iter().find(|s| s["specId"] == "broken").unwrap();

    assert_eq!(pets_meta["isValid"], true);
    assert_eq!(pets_meta["operationCount"], 1);
    assert_eq!(broken_meta["isValid"], false);
    assert_eq!(broken_meta["operationCount"], 0);
    assert!(broken_meta["validationError"].is_string());

    let matches = engine.search_operations("pets", None).await;
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].endpoint_id, "pets:listPets");
}

#[tokio::test]
async fn unparseable_spec_file_degrades_instead_of_failing_the_whole_refresh() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("pets.yaml"),
        r#"
openapi: 3.0.3
info:
  title: Pet Store
  version: "1.0.0"
paths:
  /pets:
    get:
      operationId: listPets
      responses:
        "200":
          description: ok
"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("garbage.json"), "{not valid json at all").unwrap();

    let mut cfg = config(dir.path());
    cfg.watch_enabled = false;
    let engine = CatalogEngine::new(cfg).unwrap();
    engine.refresh(false).await.unwrap();

    let catalog = engine.get_catalog().await;
    let specs = catalog["specs"].as_array().unwrap();
    let pets_meta = specs.iter().find(|s| s["specId"] == "pets").unwrap();
    let garbage_meta = specs.iter().find(|s| s["specId"] == "garbage").unwrap();

    assert_eq!(pets_meta["isValid"], true);
    assert_eq!(pets_meta["operationCount"], 1);
    assert_eq!(garbage_meta["isValid"], false);
    assert_eq!(garbage_meta["operationCount"], 0);
    assert!(garbage_meta["validationError"].is_string());

    let matches = engine.search_operations("pets", None).await;
    assert_eq!(matches.len(), 1);
}

#[tokio::test]
async fn search_can_be_scoped_to_a_single_spec_id() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("a.yaml"),
        r#"
openapi: 3.0.3
info: {title: A, version: "1.0.0"}
paths:
  /widgets:
    get:
      operationId: listWidgets
      summary: list widgets
      responses: {"200": {description: ok}}
"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("b.yaml"),
        r#"
openapi: 3.0.3
info: {title: B, version: "1.0.0"}
paths:
  /widgets:
    get:
      operationId: listWidgetsToo
      summary: list widgets
      responses: {"200": {description: ok}}
"#,
    )
    .unwrap();

    let mut cfg = config(dir.path());
    cfg.watch_enabled = false;
    let engine = CatalogEngine::new(cfg).unwrap();
    engine.refresh(false).await.unwrap();

    let unscoped = engine.search_operations("widgets", None).await;
    assert_eq!(unscoped.len(), 2);

    let scoped = engine.search_operations("widgets", Some("a")).await;
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].endpoint_id, "a:listWidgets");
}

#[tokio::test]
async fn watcher_triggers_a_refresh_when_the_spec_directory_changes() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("pets.yaml"),
        r#"
openapi: 3.0.3
info: {title: Pets, version: "1.0.0"}
paths:
  /pets:
    get:
      operationId: listPets
      responses: {"200": {description: ok}}
"#,
    )
    .unwrap();

    let engine = Arc::new(CatalogEngine::new(config(dir.path())).unwrap());
    engine.refresh(false).await.unwrap();
    assert_eq!(engine.search_operations("pets", None).await.len(), 1);

    let handle = catalog_core::watcher::spawn(engine.clone()).expect("watcher should spawn when enabled");

    std::fs::write(
        dir.path().join("pets.yaml"),
        r#"
openapi: 3.0.3
info: {title: Pets, version: "1.0.0"}
paths:
  /pets:
    get:
      operationId: listPets
      responses: {"200": {description: ok}}
  /pets/{id}:
    get:
      operationId: getPet
      parameters:
        - {name: id, in: path, required: true, schema: {type: string}}
      responses: {"200": {description: ok}}
"#,
    )
    .unwrap();

    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if engine.search_operations("pets", None).await.len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    })
    .await
    .expect("watcher did not pick up the spec change in time");

    handle.abort();
}
