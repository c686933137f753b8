mod common;

use std::time::Duration;

use assert_matches::assert_matches;
use upbreed_client::{ApiError, AuthGuard, AUTH_COOKIE};
use upbreed_core::models::{BlogFilter, BlogKind, CoursePatch, NewInstructor, PublishedFilter};
use upbreed_core::pagination::PageRequest;
use upbreed_core::validation::upload::LocalFile;
use upbreed_mock_api::{ADMIN_EMAIL, ADMIN_PASSWORD};

#[tokio::test]
async fn login_returns_a_token_the_guard_accepts() {
    let ctx = common::start().await;

    let response = ctx.api.login(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();
    ctx.jar.set(AUTH_COOKIE, response.token);

    let session = AuthGuard::check(&ctx.jar).unwrap();
    let claims = session.claims.expect("mock issues JWTs");
    assert_eq!(claims.email, ADMIN_EMAIL);
    assert_eq!(claims.device_signature, ctx.jar.device_signature());
}

#[tokio::test]
async fn wrong_password_is_a_401() {
    let ctx = common::start().await;
    let err = ctx.api.login(ADMIN_EMAIL, "nope-nope").await.unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn requests_carry_the_session_as_bearer() {
    let ctx = common::start().await;
    ctx.jar.set(AUTH_COOKIE, "abc123");

    ctx.api.list_categories(PageRequest::default()).await.unwrap();

    let requests = ctx.server.state().requests();
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer abc123"));
}

#[tokio::test]
async fn second_course_page_has_items_ten_to_eighteen() {
    let ctx = common::start().await;

    let page = ctx.api.list_courses(PageRequest::new(2, 9), None).await.unwrap();

    let ids: Vec<i64> = page.data.iter().map(|c| c.id).collect();
    assert_eq!(ids, (10..=18).collect::<Vec<_>>());
    assert_eq!(page.metadata.last_page, 3);
}

#[tokio::test]
async fn search_uses_the_search_endpoint() {
    let ctx = common::start().await;

    let found = ctx
        .api
        .list_instructors(PageRequest::default(), Some("  monica "))
        .await
        .unwrap();

    assert!(!found.data.is_empty());
    assert!(found.data.iter().all(|i| i.fname == "Monica"));
    let request = &ctx.server.state().requests()[0];
    assert_eq!(request.path, "/instructor/search");
    assert_eq!(request.query_param("query").as_deref(), Some("monica"));
}

#[tokio::test]
async fn deleted_instructor_leaves_the_list() {
    let ctx = common::start().await;

    ctx.api.delete_instructor(42).await.unwrap();

    let page = ctx
        .api
        .list_instructors(PageRequest::new(1, 50), None)
        .await
        .unwrap();
    assert!(page.data.iter().all(|i| i.id != 42));
}

#[tokio::test]
async fn unknown_course_is_a_404_status() {
    let ctx = common::start().await;
    let err = ctx.api.get_course(9999).await.unwrap_err();
    assert_matches!(err, ApiError::Status { status: 404, .. });
}

#[tokio::test]
async fn edit_course_sends_only_changed_fields() {
    let ctx = common::start().await;
    let patch = CoursePatch {
        title: Some("Renamed".into()),
        ..CoursePatch::default()
    };

    let course = ctx.api.edit_course(3, &patch).await.unwrap();

    assert_eq!(course.title, "Renamed");
    assert_eq!(course.description, "Everything about topic number 3.");
}

#[tokio::test]
async fn create_instructor_uploads_multipart() {
    let ctx = common::start().await;
    let png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
    let input = NewInstructor {
        fname: "Gunther".into(),
        lname: "Central".into(),
        email: "gunther@upbreed.com".into(),
        about: "Runs the coffee house.".into(),
        profile_picture: Some(LocalFile::from_bytes("gunther.png", png)),
    };

    let created = ctx.api.create_instructor(&input).await.unwrap();

    let details = ctx.api.get_instructor(created.id).await.unwrap();
    assert_eq!(details.fname, "Gunther");
    assert_eq!(
        details.instructor_profile.profile_picture_url.as_deref(),
        Some("/uploads/gunther.png")
    );
}

#[tokio::test]
async fn blog_filters_reach_the_query_string() {
    let ctx = common::start().await;
    let filter = BlogFilter {
        kind: BlogKind::Press,
        published: PublishedFilter::Published,
        ..BlogFilter::default()
    };

    let blogs = ctx.api.list_blogs(&filter).await.unwrap();

    assert!(blogs.data.iter().all(|b| b.kind == BlogKind::Press && b.is_published));
    let request = &ctx.server.state().requests()[0];
    assert_eq!(request.query_param("type").as_deref(), Some("press"));
    assert_eq!(request.query_param("isPublished").as_deref(), Some("true"));
    assert_eq!(request.query_param("categoryId"), None);
}

#[tokio::test]
async fn videos_are_replaced_in_order() {
    let ctx = common::start().await;
    let mut videos: Vec<_> = ctx
        .api
        .get_videos(1)
        .await
        .unwrap()
        .into_iter()
        .map(Into::into)
        .collect();
    videos.reverse();

    let saved = ctx.api.edit_videos(1, &videos).await.unwrap();

    let titles: Vec<_> = saved.iter().map(|v| v.title.as_str()).collect();
    assert_eq!(titles, ["Lesson 3", "Lesson 2", "Lesson 1"]);
}

#[tokio::test]
async fn dashboard_and_transactions_load() {
    let ctx = common::start().await;

    let dashboard = ctx.api.dashboard().await.unwrap();
    assert_eq!(dashboard.total_users, 5_000);

    let tx = ctx.api.list_transactions(PageRequest::new(1, 5)).await.unwrap();
    assert_eq!(tx.data.len(), 5);
    assert_eq!(tx.metadata.last_page, 3);
}

#[tokio::test]
async fn hung_request_settles_as_timeout() {
    let ctx = common::start_with_timeout(Duration::from_millis(200)).await;
    ctx.server
        .state()
        .delay_next("GET", "/dashboard", Duration::from_secs(5), 1);

    let err = ctx.api.dashboard().await.unwrap_err();
    assert!(err.is_timeout());
}

#[tokio::test]
async fn injected_server_error_surfaces_status_and_body() {
    let ctx = common::start().await;
    ctx.server.state().fail_next("DELETE", "/course/2", 500, 1);

    let err = ctx.api.delete_course(2).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_matches!(err, ApiError::Status { body, .. } if body.contains("INJECTED"));
}
