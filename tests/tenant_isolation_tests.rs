//! Tenant isolation and ownership rules for items and categories.

use axum::http::StatusCode;
use serde_json::{Value, json};

#[path = "test_utils/mod.rs"]
mod test_utils;
use test_utils::{TestApp, id_of};

fn item(name: &str) -> Value {
    json!({ "name": name, "sku": "SKU-1", "quantity": 5, "price": 9.5 })
}

#[tokio::test]
async fn resources_are_invisible_across_companies() {
    let app = TestApp::new().await;
    let (_, _, acme) = app.new_company("alice", "alice@acme.test").await;
    let (globex_id, _, globex) = app.new_company("gina", "gina@globex.test").await;
    let (_, hank) = app
        .approved_member(globex_id, "hank", "hank@globex.test", &globex)
        .await;

    let created = app.post("/items", &acme, item("Hammer")).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let item_id = id_of(&created.body);

    let read = app.get(&format!("/items/{item_id}"), &globex).await;
    assert_eq!(read.status, StatusCode::NOT_FOUND);
    assert_eq!(read.body["code"], "NOT_FOUND");

    let update = app
        .put(&format!("/items/{item_id}"), &globex, Some(item("Stolen")))
        .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let delete = app.delete(&format!("/items/{item_id}"), &globex).await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let listed = app.get("/items", &globex).await;
    assert_eq!(listed.body["total"], 0);

    // A plain user of the other company hits the same wall.
    let read = app.get(&format!("/items/{item_id}"), &hank).await;
    assert_eq!(read.status, StatusCode::NOT_FOUND);
    assert_eq!(read.body["code"], "NOT_FOUND");
    let delete = app.delete(&format!("/items/{item_id}"), &hank).await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);
    assert_eq!(app.get("/items", &hank).await.body["total"], 0);

    // Still intact for its owner.
    let read = app.get(&format!("/items/{item_id}"), &acme).await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["name"], "Hammer");
}

#[tokio::test]
async fn client_supplied_tenant_is_overridden_for_non_super_admins() {
    let app = TestApp::new().await;
    let (acme_id, _, acme) = app.new_company("alice", "alice@acme.test").await;
    let (globex_id, _, globex) = app.new_company("gina", "gina@globex.test").await;

    let mut body = item("Sneaky");
    body["tenant_id"] = json!(globex_id);
    let created = app.post("/items", &acme, body).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["tenant_id"], acme_id);

    let category = app
        .post("/categories", &acme, json!({ "name": "Tools", "tenant_id": globex_id }))
        .await;
    assert_eq!(category.status, StatusCode::CREATED);
    assert_eq!(category.body["tenant_id"], acme_id);

    assert_eq!(app.get("/items", &globex).await.body["total"], 0);
    assert!(app.get("/categories", &globex).await.body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn plain_users_modify_only_their_own_rows() {
    let app = TestApp::new().await;
    let (acme_id, _, admin) = app.new_company("alice", "alice@acme.test").await;
    let (_, bob) = app.approved_member(acme_id, "bob", "bob@acme.test", &admin).await;
    let (_, carol) = app.approved_member(acme_id, "carol", "carol@acme.test", &admin).await;

    let bobs = id_of(&app.post("/items", &bob, item("Bob's drill")).await.body);

    // Same company, so carol can see it.
    let read = app.get(&format!("/items/{bobs}"), &carol).await;
    assert_eq!(read.status, StatusCode::OK);

    let update = app
        .put(&format!("/items/{bobs}"), &carol, Some(item("Carol's now")))
        .await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);
    assert_eq!(update.body["code"], "FORBIDDEN");

    let delete = app.delete(&format!("/items/{bobs}"), &carol).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);

    let update = app
        .put(&format!("/items/{bobs}"), &bob, Some(item("Bob's better drill")))
        .await;
    assert_eq!(update.status, StatusCode::OK);
    assert_eq!(update.body["name"], "Bob's better drill");

    // Admins may modify anything in their company.
    let delete = app.delete(&format!("/items/{bobs}"), &admin).await;
    assert_eq!(delete.status, StatusCode::OK);
    assert_eq!(delete.body["message"], "Item deleted");

    let gone = app.get(&format!("/items/{bobs}"), &bob).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn category_ownership_mirrors_items() {
    let app = TestApp::new().await;
    let (acme_id, _, admin) = app.new_company("alice", "alice@acme.test").await;
    let (_, bob) = app.approved_member(acme_id, "bob", "bob@acme.test", &admin).await;

    let admin_category = id_of(&app.post("/categories", &admin, json!({ "name": "Tools" })).await.body);

    let rename = app
        .put(
            &format!("/categories/{admin_category}"),
            &bob,
            Some(json!({ "name": "Mine" })),
        )
        .await;
    assert_eq!(rename.status, StatusCode::FORBIDDEN);

    let rename = app
        .put(
            &format!("/categories/{admin_category}"),
            &admin,
            Some(json!({ "name": "Hand tools" })),
        )
        .await;
    assert_eq!(rename.status, StatusCode::OK);
    assert_eq!(rename.body["name"], "Hand tools");

    let read = app.get(&format!("/categories/{admin_category}"), &bob).await;
    assert_eq!(read.status, StatusCode::OK);

    let delete = app
        .delete(&format!("/categories/{admin_category}"), &admin)
        .await;
    assert_eq!(delete.status, StatusCode::OK);
    assert_eq!(
        app.get(&format!("/categories/{admin_category}"), &admin)
            .await
            .status,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn item_category_must_belong_to_same_company() {
    let app = TestApp::new().await;
    let (_, _, acme) = app.new_company("alice", "alice@acme.test").await;
    let (_, _, globex) = app.new_company("gina", "gina@globex.test").await;

    let globex_category = id_of(&app.post("/categories", &globex, json!({ "name": "Parts" })).await.body);
    let acme_category = id_of(&app.post("/categories", &acme, json!({ "name": "Tools" })).await.body);

    let mut body = item("Hammer");
    body["category_id"] = json!(globex_category);
    let rejected = app.post("/items", &acme, body).await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);

    let mut body = item("Hammer");
    body["category_id"] = json!(acme_category);
    let accepted = app.post("/items", &acme, body).await;
    assert_eq!(accepted.status, StatusCode::CREATED);
    assert_eq!(accepted.body["category_id"], acme_category);
}

#[tokio::test]
async fn super_admin_must_name_tenant_on_create() {
    let app = TestApp::new().await;
    let (acme_id, _, acme) = app.new_company("alice", "alice@acme.test").await;
    let root = app.super_admin_token().await;

    let missing = app.post("/items", &root, item("Orphan")).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.body["code"], "VALIDATION_FAILED");

    let mut body = item("Nowhere");
    body["tenant_id"] = json!(9_999);
    let unknown = app.post("/items", &root, body).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let mut body = item("Placed");
    body["tenant_id"] = json!(acme_id);
    let created = app.post("/items", &root, body).await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["tenant_id"], acme_id);

    // Visible to the company it was placed in.
    let listed = app.get("/items", &acme).await;
    assert_eq!(listed.body["total"], 1);
}

#[tokio::test]
async fn super_admin_sees_and_modifies_every_company() {
    let app = TestApp::new().await;
    let (_, _, acme) = app.new_company("alice", "alice@acme.test").await;
    let (_, _, globex) = app.new_company("gina", "gina@globex.test").await;
    let root = app.super_admin_token().await;

    let acme_item = id_of(&app.post("/items", &acme, item("Hammer")).await.body);
    app.post("/items", &globex, item("Wrench")).await;

    let listed = app.get("/items", &root).await;
    assert_eq!(listed.body["total"], 2);

    let update = app
        .put(&format!("/items/{acme_item}"), &root, Some(item("Audited hammer")))
        .await;
    assert_eq!(update.status, StatusCode::OK);

    let delete = app.delete(&format!("/items/{acme_item}"), &root).await;
    assert_eq!(delete.status, StatusCode::OK);
}

#[tokio::test]
async fn item_listing_paginates_within_scope() {
    let app = TestApp::new().await;
    let (_, _, acme) = app.new_company("alice", "alice@acme.test").await;
    let (_, _, globex) = app.new_company("gina", "gina@globex.test").await;

    for n in 0..12 {
        app.post("/items", &acme, item(&format!("Item {n}"))).await;
    }
    app.post("/items", &globex, item("Elsewhere")).await;

    let first = app.get("/items", &acme).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["page"], 1);
    assert_eq!(first.body["limit"], 10);
    assert_eq!(first.body["total"], 12);
    assert_eq!(first.body["items"].as_array().unwrap().len(), 10);

    let second = app.get("/items?page=2&limit=5", &acme).await;
    let names: Vec<&str> = second.body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Item 5", "Item 6", "Item 7", "Item 8", "Item 9"]);

    let clamped = app.get("/items?page=0&limit=1000", &acme).await;
    assert_eq!(clamped.body["page"], 1);
    assert_eq!(clamped.body["limit"], 100);
    assert_eq!(clamped.body["items"].as_array().unwrap().len(), 12);

    for uri in [
        "/items?page=18446744073709551615&limit=100",
        "/items?page=200000000000000000&limit=100",
    ] {
        let beyond = app.get(uri, &acme).await;
        assert_eq!(beyond.status, StatusCode::OK, "{uri}");
        assert_eq!(beyond.body["page"], 92_233_720_368_547_759u64);
        assert_eq!(beyond.body["total"], 12);
        assert!(beyond.body["items"].as_array().unwrap().is_empty());
    }

    let malformed = app.get("/items?page=abc", &acme).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn item_validation_failures() {
    let app = TestApp::new().await;
    let (_, _, acme) = app.new_company("alice", "alice@acme.test").await;

    let cases = [
        json!({ "name": "   ", "quantity": 1, "price": 1.0 }),
        json!({ "name": "Hammer", "quantity": -1, "price": 1.0 }),
        json!({ "name": "Hammer", "quantity": 1, "price": -0.5 }),
    ];
    for body in cases {
        let response = app.post("/items", &acme, body.clone()).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response.body["code"], "VALIDATION_FAILED");
    }

    let bad_path = app.get("/items/not-a-number", &acme).await;
    assert_eq!(bad_path.status, StatusCode::BAD_REQUEST);
}
