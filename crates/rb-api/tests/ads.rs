mod common;

use actix_web::test;
use common::{body_string, location, login, TestContext};
use rb_core::traits::{AdRepo, Repository};
use rb_core::{Ad, Uuid};

async fn ad_count(ctx: &TestContext) -> usize {
    Repository::<Ad>::find_all(ctx.repo.as_ref())
        .await
        .unwrap()
        .len()
}

async fn seed_ad(ctx: &TestContext, owner: Uuid, title: &str) -> Ad {
    let ad = Ad::new(title.to_string(), "Some description".to_string(), owner);
    Repository::<Ad>::save(ctx.repo.as_ref(), ad).await.unwrap()
}

#[actix_web::test]
async fn created_ad_is_listed_and_owned_by_the_session_user() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("testUser", "pass").await;
    let app = ctx.app().await;
    let cookie = login(&app, "testUser", "pass").await;

    let req = test::TestRequest::post()
        .uri("/ads/create")
        .cookie(cookie)
        .set_form([("title", "Test Ad"), ("description", "This is a test ad")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/ads");

    let ad = ctx.repo.find_by_title("Test Ad").await.unwrap().unwrap();
    assert_eq!(ad.owner_id, user.id);
    assert_eq!(ad.description, "This is a test ad");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/ads").to_request()).await;
    assert_eq!(resp.status(), 200);
    let body = body_string(resp).await;
    assert!(body.contains("Test Ad"));
    assert!(body.contains("This is a test ad"));

    let req = test::TestRequest::get()
        .uri(&format!("/ads/{}", ad.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_string(resp).await;
    assert!(body.contains("This is a test ad"));
    assert!(body.contains("testUser"));
}

#[actix_web::test]
async fn anonymous_create_redirects_to_login_and_stores_nothing() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;

    let req = test::TestRequest::post()
        .uri("/ads/create")
        .set_form([("title", "Test Ad"), ("description", "This is a test ad")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/login");
    assert_eq!(ad_count(&ctx).await, 0);
}

#[actix_web::test]
async fn blank_title_re_renders_the_form() {
    let ctx = TestContext::new().await;
    ctx.create_user("testUser", "pass").await;
    let app = ctx.app().await;
    let cookie = login(&app, "testUser", "pass").await;

    let req = test::TestRequest::post()
        .uri("/ads/create")
        .cookie(cookie)
        .set_form([("title", "   "), ("description", "kept text")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 400);
    let body = body_string(resp).await;
    assert!(body.contains("title must not be empty"));
    assert!(body.contains("kept text"));
    assert_eq!(ad_count(&ctx).await, 0);
}

#[actix_web::test]
async fn duplicate_title_is_a_conflict() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("testUser", "pass").await;
    seed_ad(&ctx, user.id, "Bike for sale").await;
    let app = ctx.app().await;
    let cookie = login(&app, "testUser", "pass").await;

    let req = test::TestRequest::post()
        .uri("/ads/create")
        .cookie(cookie)
        .set_form([("title", "Bike for sale"), ("description", "again")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 409);
    assert_eq!(ad_count(&ctx).await, 1);
}

#[actix_web::test]
async fn owner_can_edit_an_ad() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("testUser", "pass").await;
    let ad = seed_ad(&ctx, user.id, "Old title").await;
    let app = ctx.app().await;
    let cookie = login(&app, "testUser", "pass").await;

    let req = test::TestRequest::get()
        .uri(&format!("/ads/{}/edit", ad.id))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert!(body_string(resp).await.contains("Old title"));

    let req = test::TestRequest::post()
        .uri(&format!("/ads/{}/edit", ad.id))
        .cookie(cookie)
        .set_form([("title", "New title"), ("description", "New description")])
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), format!("/ads/{}", ad.id));

    let stored = Repository::<Ad>::find_by_id(ctx.repo.as_ref(), ad.id)
        .await
        .unwrap();
    assert_eq!(stored.title, "New title");
    assert_eq!(stored.description, "New description");
    assert_eq!(stored.owner_id, user.id);
    assert_eq!(stored.created_at, ad.created_at);

    let req = test::TestRequest::get()
        .uri(&format!("/ads/{}", ad.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body = body_string(resp).await;
    assert!(body.contains("New title"));
    assert!(body.contains("New description"));
    assert!(!body.contains("Old title"));
    assert!(!body.contains("Some description"));
}

#[actix_web::test]
async fn other_users_cannot_edit_or_delete() {
    let ctx = TestContext::new().await;
    let owner = ctx.create_user("owner", "pass").await;
    ctx.create_user("intruder", "pass").await;
    let ad = seed_ad(&ctx, owner.id, "Mine").await;
    let app = ctx.app().await;
    let cookie = login(&app, "intruder", "pass").await;

    let req = test::TestRequest::post()
        .uri(&format!("/ads/{}/edit", ad.id))
        .cookie(cookie.clone())
        .set_form([("title", "Stolen"), ("description", "Stolen")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    let req = test::TestRequest::post()
        .uri(&format!("/ads/{}/delete", ad.id))
        .cookie(cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    let stored = Repository::<Ad>::find_by_id(ctx.repo.as_ref(), ad.id)
        .await
        .unwrap();
    assert_eq!(stored, ad);
}

#[actix_web::test]
async fn owner_can_delete_an_ad() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("testUser", "pass").await;
    let ad = seed_ad(&ctx, user.id, "Test Ad").await;
    let app = ctx.app().await;
    let cookie = login(&app, "testUser", "pass").await;

    let req = test::TestRequest::post()
        .uri(&format!("/ads/{}/delete", ad.id))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 303);
    assert_eq!(location(&resp), "/ads");
    assert!(ctx.repo.find_by_title("Test Ad").await.unwrap().is_none());
}

#[actix_web::test]
async fn deleting_a_missing_ad_is_not_found() {
    let ctx = TestContext::new().await;
    let user = ctx.create_user("testUser", "pass").await;
    seed_ad(&ctx, user.id, "Keep me").await;
    let app = ctx.app().await;
    let cookie = login(&app, "testUser", "pass").await;

    let req = test::TestRequest::post()
        .uri(&format!("/ads/{}/delete", Uuid::now_v7()))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 404);
    assert_eq!(ad_count(&ctx).await, 1);
}

#[actix_web::test]
async fn malformed_id_is_not_found() {
    let ctx = TestContext::new().await;
    let app = ctx.app().await;

    let req = test::TestRequest::get().uri("/ads/not-a-uuid").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}
