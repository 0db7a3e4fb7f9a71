mod common;

use std::io::Cursor;

use axum::body::Body;
use axum::http::{header, StatusCode};
use common::{body_text, location, request, TestApp, ADMIN_TOKEN, USER_TOKEN};

const BOUNDARY: &str = "folio-test-boundary";

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 150, 90]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn multipart(fields: &[(&str, &str)], image: Option<(&str, &str, Vec<u8>)>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, mime, bytes)) = image {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, file_name, mime
            )
            .as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

async fn upload(app: &TestApp, token: &str, body: Vec<u8>) -> axum::response::Response {
    let request = request("POST", "/admin/add-photo", Some(token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();
    app.send(request).await
}

#[tokio::test]
async fn admin_sees_edit_and_delete_controls() {
    let app = TestApp::start().await;

    let html = body_text(app.get("/photo/p1?edit=1", Some(ADMIN_TOKEN)).await).await;
    assert!(html.contains("Edit Photo"));
    assert!(html.contains(r#"name="tags" value="bolivia, desert""#));

    let html = body_text(app.get("/photo/p1?confirm=delete", Some(ADMIN_TOKEN)).await).await;
    assert!(html.contains("Are you sure you want to delete this photo?"));

    // Members asking for edit mode get the plain page
    let html = body_text(app.get("/photo/p1?edit=1", Some(USER_TOKEN)).await).await;
    assert!(!html.contains("Edit Photo"));
}

#[tokio::test]
async fn admin_deletes_photo() {
    let app = TestApp::start().await;

    let response = app.post_form("/photo/p1/delete", Some(ADMIN_TOKEN), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/gallery");
    assert!(app.log.contains("DELETE /api/photos/p1"));
}

#[tokio::test]
async fn members_cannot_delete_photos() {
    let app = TestApp::start().await;

    let response = app.post_form("/photo/p1/delete", Some(USER_TOKEN), "").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(!app.log.contains("DELETE /api/photos/p1"));
}

#[tokio::test]
async fn photo_edit_rejects_blank_title() {
    let app = TestApp::start().await;

    let response = app
        .post_form("/photo/p1", Some(ADMIN_TOKEN), "title=++&description=&tags=sea")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Edit Photo"));
    assert!(html.contains(r#"name="tags" value="sea""#));
}

#[tokio::test]
async fn upload_sends_image_and_metadata() {
    let app = TestApp::start().await;

    let body = multipart(
        &[("title", "Dunes"), ("location", "Namib")],
        Some(("dunes.png", "image/png", png(20, 10))),
    );
    let response = upload(&app, ADMIN_TOKEN, body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Photo uploaded successfully."));
    assert!(html.contains("p-new"));

    assert!(
        app.log.contains("POST /api/photos image,title,metadata"),
        "{:?}",
        app.log.calls()
    );
}

#[tokio::test]
async fn upload_requires_image_and_title() {
    let app = TestApp::start().await;

    let response = upload(&app, ADMIN_TOKEN, multipart(&[("title", "")], None)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Please select an image"));
    assert!(html.contains("Please enter a title"));
    assert!(app.log.calls().iter().all(|c| !c.starts_with("POST /api/photos")));
}

#[tokio::test]
async fn upload_rejects_non_images() {
    let app = TestApp::start().await;

    let body = multipart(
        &[("title", "Notes")],
        Some(("notes.txt", "text/plain", b"hello".to_vec())),
    );
    let response = upload(&app, ADMIN_TOKEN, body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(app.log.calls().iter().all(|c| !c.starts_with("POST /api/photos")));
}

#[tokio::test]
async fn add_album_page_offers_photo_picker() {
    let app = TestApp::start().await;

    let html = body_text(app.get("/admin/add-album", Some(ADMIN_TOKEN)).await).await;
    assert!(html.contains("Create Album"));
    assert!(html.contains(r#"name="photos" value="p1""#));

    let html = body_text(
        app.get("/admin/add-album?photo_search=harbour", Some(ADMIN_TOKEN))
            .await,
    )
    .await;
    assert!(html.contains(r#"value="p2""#));
    assert!(!html.contains(r#"value="p1""#));
}

#[tokio::test]
async fn add_album_needs_cover_or_photos() {
    let app = TestApp::start().await;

    let response = app
        .post_form("/admin/add-album", Some(ADMIN_TOKEN), "title=Night&description=")
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Please provide a cover image URL or select photos"));
    assert!(html.contains(r#"value="Night""#));
    assert!(
        app.log.calls().iter().all(|c| !c.starts_with("POST /api/albums")),
        "{:?}",
        app.log.calls()
    );
}

#[tokio::test]
async fn add_album_creates_with_selected_photos_in_order() {
    let app = TestApp::start().await;

    let response = app
        .post_form(
            "/admin/add-album",
            Some(ADMIN_TOKEN),
            "title=Harbour&description=&offered=p1&offered=p2&photos=p2&photos=p1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Album created successfully."));
    assert!(html.contains("a-new"));

    // No cover given: the first selected photo's image is used
    let calls = app.log.calls();
    assert!(
        app.log.contains(r#"POST /api/albums cover="https://cdn.example/p2.jpg""#),
        "{:?}",
        calls
    );
    assert!(app.log.contains(r#"POST /api/albums photos=["p2","p1"]"#), "{:?}", calls);
}

#[tokio::test]
async fn album_edit_keeps_photos_the_picker_did_not_show() {
    let app = TestApp::start().await;

    let html = body_text(app.get("/album/a1?edit=1", Some(ADMIN_TOKEN)).await).await;
    assert!(html.contains(r#"name="offered" value="p1""#));
    assert!(html.contains(r#"name="offered" value="p2""#));
    // "missing" belongs to the album but is not in the picker listing
    assert!(!html.contains(r#"value="missing""#));

    let form = "title=Night+Walks&cover_image_url=https%3A%2F%2Fcdn.example%2Fcover.jpg\
                &offered=p1&offered=p2";
    let response = app
        .post_form("/album/a1", Some(ADMIN_TOKEN), &format!("{}&photos=p1", form))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/album/a1");
    assert!(
        app.log.contains(r#"PUT /api/albums/a1 photos=["p1","missing"]"#),
        "{:?}",
        app.log.calls()
    );

    let response = app
        .post_form("/album/a1", Some(ADMIN_TOKEN), &format!("{}&photos=p2", form))
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(
        app.log.contains(r#"PUT /api/albums/a1 photos=["missing","p2"]"#),
        "{:?}",
        app.log.calls()
    );
}

#[tokio::test]
async fn album_edit_without_picker_keeps_every_photo() {
    let app = TestApp::start().await;

    let response = app
        .post_form(
            "/album/a1",
            Some(ADMIN_TOKEN),
            "title=Night+Walks&cover_image_url=https%3A%2F%2Fcdn.example%2Fcover.jpg",
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(app.log.contains(r#"PUT /api/albums/a1 photos=["p1","missing"]"#));
}

#[tokio::test]
async fn album_admin_view_allows_removing_photos() {
    let app = TestApp::start().await;

    let html = body_text(app.get("/album/a1", Some(ADMIN_TOKEN)).await).await;
    assert!(html.contains("Remove Selected"));
    assert!(html.contains("Edit Album"));

    // Nothing selected: straight back to the album
    let response = app
        .post_form("/album/a1/photos/remove", Some(ADMIN_TOKEN), "")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/album/a1");
    assert!(app.log.calls().iter().all(|c| !c.starts_with("PUT /api/albums")));

    let response = app
        .post_form("/album/a1/photos/remove", Some(ADMIN_TOKEN), "photos=p1")
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/album/a1");
    assert!(
        app.log.contains(r#"PUT /api/albums/a1 photos=["missing"]"#),
        "{:?}",
        app.log.calls()
    );
}
