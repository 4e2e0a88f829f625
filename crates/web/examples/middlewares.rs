use bytes::Bytes;
use http::{HeaderName, HeaderValue, StatusCode};
use lite_gateway::memory;
use lite_web::interceptor::{DateHeader, PreFlow, SetHeader, post_fn, pre_fn};
use lite_web::router::get;
use lite_web::{App, Arguments, Html, Request, Response, Router, handler_fn};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

async fn require_token(request: Request) -> PreFlow {
    match request.header("authorization") {
        Some("Bearer lite") => PreFlow::Continue(request),
        _ => {
            warn!(path = request.path(), "rejected request without a valid token");
            PreFlow::Respond(Response::plain("missing or invalid token").with_status(StatusCode::UNAUTHORIZED))
        }
    }
}

async fn mark_admin(response: Response) -> Response {
    response.with_header(HeaderName::from_static("x-area"), HeaderValue::from_static("admin"))
}

async fn dashboard(_args: Arguments) -> Html<&'static str> {
    Html("<h1>dashboard</h1>")
}

async fn report(_args: Arguments) -> Vec<Bytes> {
    vec![Bytes::from_static(b"id,total\n"), Bytes::from_static(b"1,10\n"), Bytes::from_static(b"2,32\n")]
}

async fn status(_args: Arguments) -> &'static str {
    "up"
}

#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let admin = Router::new("/admin")
        .tag("admin")
        .pre(pre_fn(require_token))
        .post(post_fn(mark_admin))
        .route("/dashboard", get(handler_fn(dashboard)))
        .route("/report.csv", get(handler_fn(report)).content_type(mime::TEXT_CSV));

    let app = App::builder()
        .route("/status", get(handler_fn(status)).content_type(mime::TEXT_PLAIN))
        .mount(&admin)
        .post(SetHeader::allow_origin("*"))
        .post(DateHeader::new())
        .build();

    let requests = [
        http::Request::get("/status").body(Bytes::new()),
        http::Request::get("/admin/dashboard").body(Bytes::new()),
        http::Request::get("/admin/dashboard").header("authorization", "Bearer lite").body(Bytes::new()),
        http::Request::get("/admin/report.csv").header("authorization", "Bearer lite").body(Bytes::new()),
    ];

    for request in requests {
        let request = request.expect("requests above are well formed");
        let uri = request.uri().clone();
        let recorded = memory::call(&app, request).await.expect("in-memory gateway never disconnects");
        info!(
            %uri,
            status = %recorded.status(),
            content_type = recorded.header("content-type"),
            area = recorded.header("x-area"),
            date = recorded.header("date"),
            messages = recorded.body_chunks().len(),
            body = recorded.text(),
            "served"
        );
    }
}
