//! Minimal web front end: a landing page and a form echo endpoint.

use axum::{
    response::Html,
    routing::{get, post},
    Form, Router,
};
use tower_http::trace::TraceLayer;
use tracing::debug;

const INDEX_HTML: &str = include_str!("../assets/index.html");

/// Routes: `GET /` and `POST /post`.
pub fn router() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/post", post(echo_form))
        .layer(TraceLayer::new_for_http())
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn echo_form(Form(fields): Form<Vec<(String, String)>>) -> String {
    debug!("Received {} form fields", fields.len());
    format!("received: {}", format_fields(&fields))
}

/// Render fields as `{k: v, ...}` in submission order.
fn format_fields(fields: &[(String, String)]) -> String {
    let body = fields
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{{{}}}", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn spawn() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router()).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_format_fields() {
        assert_eq!(format_fields(&[]), "{}");
        assert_eq!(
            format_fields(&[("b".into(), "2".into()), ("a".into(), "1".into())]),
            "{b: 2, a: 1}"
        );
    }

    #[tokio::test]
    async fn test_landing_page() {
        let base = spawn().await;
        let response = reqwest::get(format!("{}/", base)).await.unwrap();

        assert!(response.status().is_success());
        assert!(response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert!(response.text().await.unwrap().contains("action=\"/post\""));
    }

    #[tokio::test]
    async fn test_post_echoes_form_in_order() {
        let base = spawn().await;
        let response = reqwest::Client::new()
            .post(format!("{}/post", base))
            .form(&[("name", "Ada Lovelace"), ("city", "London")])
            .send()
            .await
            .unwrap();

        assert!(response.status().is_success());
        assert!(response
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        assert_eq!(
            response.text().await.unwrap(),
            "received: {name: Ada Lovelace, city: London}"
        );
    }

    #[tokio::test]
    async fn test_get_on_post_route_is_rejected() {
        let base = spawn().await;
        let response = reqwest::get(format!("{}/post", base)).await.unwrap();
        assert_eq!(response.status().as_u16(), 405);
    }
}
