//! Integration tests for recipe CRUD and the collection lifecycle: fetch
//! replaces the store wholesale, failures clear it, and session expiry
//! from any operation resets to the login gate.

use ladle::api::{ApiClient, ApiError, RecipeDraft};
use ladle::app::{App, AppEvent, FollowUp, View};
use ladle::config::Config;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> ApiClient {
    let base = Url::parse(&server.uri()).unwrap();
    ApiClient::new(base, Duration::from_secs(5)).unwrap()
}

async fn mount_csrf(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/api/csrf/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("csrftoken={token}; Path=/")),
        )
        .mount(server)
        .await;
}

fn recipe_body(id: i64, title: &str, cuisine: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "username": "alice",
        "title": title,
        "description": "A test recipe",
        "cuisine_type": cuisine,
        "ingredients": "1 cup of everything",
        "instructions": "Mix and cook",
        "image_url": null,
        "external_link": null,
        "created_at": "2024-05-01T12:00:00Z",
        "updated_at": "2024-05-02T08:30:00Z",
    })
}

#[tokio::test]
async fn test_list_recipes_decodes_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/recipes/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            recipe_body(1, "Taco", "Mexican"),
            recipe_body(2, "Sushi", "Japanese"),
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let recipes = client.list_recipes().await.unwrap();
    assert_eq!(recipes.len(), 2);
    assert_eq!(recipes[0].title, "Taco");
    assert_eq!(recipes[1].cuisine(), "Japanese");
}

#[tokio::test]
async fn test_create_recipe_carries_csrf_and_omits_empty_optionals() {
    let server = MockServer::start().await;
    mount_csrf(&server, "tok-create").await;
    Mock::given(method("POST"))
        .and(path("/api/recipes/"))
        .and(header("X-CSRFToken", "tok-create"))
        .and(body_partial_json(serde_json::json!({
            "title": "Pho",
            "ingredients": "broth\nnoodles",
            "instructions": "Simmer",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(recipe_body(7, "Pho", "Vietnamese")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let draft = RecipeDraft {
        title: "Pho".into(),
        ingredients: "broth\nnoodles".into(),
        instructions: "Simmer".into(),
        ..RecipeDraft::default()
    };
    let created = client.create_recipe(&draft).await.unwrap();
    assert_eq!(created.id, 7);

    // None fields must not appear in the body at all
    let requests = server.received_requests().await.unwrap();
    let create = requests
        .iter()
        .find(|r| r.url.path() == "/api/recipes/")
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&create.body).unwrap();
    assert!(body.get("description").is_none());
    assert!(body.get("image_url").is_none());
}

#[tokio::test]
async fn test_update_recipe_uses_patch() {
    let server = MockServer::start().await;
    mount_csrf(&server, "tok-edit").await;
    Mock::given(method("PATCH"))
        .and(path("/api/recipes/7/"))
        .and(header("X-CSRFToken", "tok-edit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recipe_body(7, "Pho Bo", "Vietnamese")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let draft = RecipeDraft {
        title: "Pho Bo".into(),
        ingredients: "broth\nnoodles\nbeef".into(),
        instructions: "Simmer longer".into(),
        ..RecipeDraft::default()
    };
    let updated = client.update_recipe(7, &draft).await.unwrap();
    assert_eq!(updated.title, "Pho Bo");
}

#[tokio::test]
async fn test_delete_recipe_no_content() {
    let server = MockServer::start().await;
    mount_csrf(&server, "tok-del").await;
    Mock::given(method("DELETE"))
        .and(path("/api/recipes/7/"))
        .and(header("X-CSRFToken", "tok-del"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.delete_recipe(7).await.unwrap();
}

#[tokio::test]
async fn test_fetch_replaces_collection_wholesale() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let mut app = App::new(client.clone(), &Config::default());
    app.apply_event(AppEvent::SessionChecked(Ok(ladle::api::CurrentUser {
        id: 1,
        username: "alice".into(),
        email: None,
    })));

    // First fetch: two recipes
    let first = Mock::given(method("GET"))
        .and(path("/api/recipes/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            recipe_body(1, "Taco", "Mexican"),
            recipe_body(2, "Sushi", "Japanese"),
        ])))
        .expect(1)
        .mount_as_scoped(&server)
        .await;
    let result = client.list_recipes().await;
    app.apply_event(AppEvent::RecipesLoaded(result));
    assert_eq!(app.collection.len(), 2);
    assert_eq!(app.collection.cuisines(), &["Japanese", "Mexican"]);
    drop(first);

    // Second fetch: recipe 1 is gone; no merge, just replacement
    Mock::given(method("GET"))
        .and(path("/api/recipes/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([recipe_body(2, "Sushi", "Japanese")])),
        )
        .mount(&server)
        .await;
    let result = client.list_recipes().await;
    app.apply_event(AppEvent::RecipesLoaded(result));
    assert_eq!(app.collection.len(), 1);
    assert_eq!(app.collection.cuisines(), &["Japanese"]);
}

#[tokio::test]
async fn test_expired_session_clears_collection_and_gates() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let mut app = App::new(client.clone(), &Config::default());
    app.apply_event(AppEvent::SessionChecked(Ok(ladle::api::CurrentUser {
        id: 1,
        username: "alice".into(),
        email: None,
    })));

    let live = Mock::given(method("GET"))
        .and(path("/api/recipes/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            recipe_body(1, "Taco", "Mexican"),
        ])))
        .expect(1)
        .mount_as_scoped(&server)
        .await;
    let result = client.list_recipes().await;
    app.apply_event(AppEvent::RecipesLoaded(result));
    assert_eq!(app.collection.len(), 1);
    assert_eq!(app.view, View::Browse);
    drop(live);

    // Backend now rejects the session
    Mock::given(method("GET"))
        .and(path("/api/recipes/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    let result = client.list_recipes().await;
    app.apply_event(AppEvent::RecipesLoaded(result));

    assert_eq!(app.view, View::Login);
    assert!(app.collection.is_empty());
    assert!(app.filtered.is_empty());
    let (msg, _) = app.status_message.as_ref().unwrap();
    assert_eq!(msg, "Your session has expired. Please log in again.");
}

#[tokio::test]
async fn test_delete_requests_collection_refresh() {
    let server = MockServer::start().await;
    mount_csrf(&server, "tok-1").await;
    Mock::given(method("DELETE"))
        .and(path("/api/recipes/1/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut app = App::new(client.clone(), &Config::default());
    let result = client.delete_recipe(1).await;
    let follow_up = app.apply_event(AppEvent::RecipeDeleted {
        title: "Taco".into(),
        result,
    });
    assert_eq!(follow_up, Some(FollowUp::RefreshCollection));
}

#[tokio::test]
async fn test_validation_error_does_not_kill_session() {
    let server = MockServer::start().await;
    mount_csrf(&server, "tok-1").await;
    Mock::given(method("POST"))
        .and(path("/api/recipes/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "title": ["This field may not be blank."]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut app = App::new(client.clone(), &Config::default());
    app.apply_event(AppEvent::SessionChecked(Ok(ladle::api::CurrentUser {
        id: 1,
        username: "alice".into(),
        email: None,
    })));

    let draft = RecipeDraft::default();
    let result = client.create_recipe(&draft).await;
    app.apply_event(AppEvent::RecipeSaved {
        editing: false,
        result,
    });

    // Still logged in; the field error is surfaced, not fatal
    assert_eq!(app.view, View::Browse);
    let (msg, _) = app.status_message.as_ref().unwrap();
    assert!(msg.contains("This field may not be blank."));
}
