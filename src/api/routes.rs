use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::AppState;

/// Room for multipart boundaries, part headers and the description field on
/// top of the file itself. The handler enforces the file size limit.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_limit =
        (state.config.max_upload_size as usize).saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        // Upload
        .route(
            "/",
            get(handlers::upload_form)
                .post(handlers::upload_record)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        // Records
        .route("/files", get(handlers::list_records))
        .route(
            "/edit/:id",
            get(handlers::edit_form).post(handlers::update_record),
        )
        .route("/delete/:id", post(handlers::delete_record))
        // Downloads and conversions
        .route("/view_raw/:id", get(handlers::view_raw))
        .route("/download_csv/:id", get(handlers::download_csv))
        .route("/convert_to_parquet/:id", get(handlers::convert_to_parquet))
        .route("/view_parquet/:id", get(handlers::view_parquet))
        // Internal
        .route("/_internal/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Int64Array;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use tower::ServiceExt;

    use crate::convert;
    use crate::testutil::test_state;

    const BOUNDARY: &str = "csv-store-test-boundary";

    fn multipart_body(
        filename: Option<&str>,
        content: &[u8],
        description: Option<&str>,
    ) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(filename) = filename {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: text/csv\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        if let Some(description) = description {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\n{description}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_bytes(resp: Response) -> bytes::Bytes {
        axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_upload_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));
        let csv = b"a,b\n1,2\n3,4\n";

        let resp = app
            .clone()
            .oneshot(upload_request(multipart_body(Some("t.csv"), csv, None)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(resp.headers()[header::LOCATION], "/files");

        let records = state.db.list_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].filename, "t.csv");
        assert_eq!(records[0].description, "No description provided");
        let id = records[0].id;

        let resp = app.clone().oneshot(get_request("/files")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let page = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
        assert!(page.contains("t.csv"));
        assert!(page.contains("No description provided"));

        let resp = app
            .clone()
            .oneshot(get_request(&format!("/download_csv/{id}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/csv");
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"t.csv\""
        );
        assert_eq!(body_bytes(resp).await.as_ref(), csv);

        let resp = app
            .clone()
            .oneshot(get_request(&format!("/convert_to_parquet/{id}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"t.parquet\""
        );
        let table = convert::read_columnar(body_bytes(resp).await).unwrap();
        assert_eq!(table.column_names(), vec!["a", "b"]);
        assert_eq!(table.num_rows(), 2);
        let batch = &table.batches[0];
        let a = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        let b = batch
            .column(1)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(a.values().to_vec(), vec![1, 3]);
        assert_eq!(b.values().to_vec(), vec![2, 4]);
    }

    #[tokio::test]
    async fn test_upload_with_description() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));

        let resp = app
            .oneshot(upload_request(multipart_body(
                Some("sales.csv"),
                b"x\n1\n",
                Some("Q1 sales"),
            )))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let records = state.db.list_records().unwrap();
        assert_eq!(records[0].description, "Q1 sales");
    }

    #[tokio::test]
    async fn test_upload_at_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));
        let content = vec![b'a'; state.config.max_upload_size as usize];

        let resp = app
            .oneshot(upload_request(multipart_body(
                Some("big.csv"),
                &content,
                Some("right at the limit"),
            )))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let records = state.db.list_records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(state.db.get_record(records[0].id).unwrap().raw_bytes, content);
    }

    #[tokio::test]
    async fn test_upload_over_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));
        let content = vec![b'a'; state.config.max_upload_size as usize + 1];

        let resp = app
            .oneshot(upload_request(multipart_body(Some("big.csv"), &content, None)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(state.db.list_records().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_body_over_router_limit() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));
        let content = vec![b'a'; state.config.max_upload_size as usize * 2];

        let resp = app
            .oneshot(upload_request(multipart_body(Some("huge.csv"), &content, None)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(state.db.list_records().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_missing_file_part() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));

        let resp = app
            .oneshot(upload_request(multipart_body(None, b"", Some("orphan"))))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(resp).await.as_ref(), b"No file part");
        assert!(state.db.list_records().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_empty_filename() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));

        let resp = app
            .oneshot(upload_request(multipart_body(Some(""), b"", None)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_bytes(resp).await.as_ref(), b"No selected file");
    }

    #[tokio::test]
    async fn test_upload_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));

        let resp = app
            .oneshot(upload_request(multipart_body(
                Some("bad.csv"),
                &[0x61, 0xff, 0xfe, 0x0a],
                None,
            )))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(state.db.list_records().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edit_unknown_record() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let resp = app.oneshot(get_request("/edit/999")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let resp = app.oneshot(get_request("/view_raw/abc")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_edit_description() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));
        let id = state
            .db
            .create_record("e.csv", None, b"a\n1\n")
            .unwrap();

        let resp = app
            .clone()
            .oneshot(get_request(&format!("/edit/{id}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let req = Request::builder()
            .method("POST")
            .uri(format!("/edit/{id}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("description=Updated+text"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);

        let record = state.db.get_record(id).unwrap();
        assert_eq!(record.description, "Updated text");
        assert_eq!(record.raw_text, "a\n1\n");
    }

    #[tokio::test]
    async fn test_update_unknown_record() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let req = Request::builder()
            .method("POST")
            .uri("/edit/42")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("description=nope"))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_record() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));
        let id = state.db.create_record("d.csv", None, b"a\n1\n").unwrap();

        let delete = |id: u64| {
            Request::builder()
                .method("POST")
                .uri(format!("/delete/{id}"))
                .body(Body::empty())
                .unwrap()
        };

        let resp = app.clone().oneshot(delete(id)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert!(state.db.list_records().unwrap().is_empty());

        let resp = app.oneshot(delete(id)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_view_raw() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));
        let id = state
            .db
            .create_record("r.csv", None, "name\nJosé\n".as_bytes())
            .unwrap();

        let resp = app
            .oneshot(get_request(&format!("/view_raw/{id}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_bytes(resp).await.as_ref(), "name\nJosé\n".as_bytes());
    }

    #[tokio::test]
    async fn test_view_parquet_renders_table() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));
        let id = state
            .db
            .create_record("v.csv", None, b"city,pop\nOslo,700000\n")
            .unwrap();

        let resp = app
            .oneshot(get_request(&format!("/view_parquet/{id}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let page = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
        assert!(page.contains("class=\"dataframe table table-striped\""));
        assert!(page.contains("<th>city</th>"));
        assert!(page.contains("<td>Oslo</td>"));
        assert!(page.contains("<td>700000</td>"));
    }

    #[tokio::test]
    async fn test_conversion_of_malformed_csv() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let app = create_router(Arc::clone(&state));
        let id = state
            .db
            .create_record("m.csv", None, b"a,b\n1,2\n3,4,5\n")
            .unwrap();

        let resp = app
            .clone()
            .oneshot(get_request(&format!("/convert_to_parquet/{id}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = app
            .oneshot(get_request(&format!("/view_parquet/{id}")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_conversions_of_unknown_record() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        for uri in [
            "/view_raw/7",
            "/download_csv/7",
            "/convert_to_parquet/7",
            "/view_parquet/7",
        ] {
            let resp = app.clone().oneshot(get_request(uri)).await.unwrap();
            assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let resp = app.oneshot(get_request("/_internal/health")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(body["status"], "ok");
    }
}
