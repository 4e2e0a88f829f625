use bytes::Bytes;
use http::StatusCode;
use lite_gateway::memory;
use lite_web::router::{delete, get, post};
use lite_web::{App, Arguments, HandlerError, ModelSchema, Param, ParamType, Router, handler_fn};
use serde::Deserialize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Deserialize, Debug)]
pub struct User {
    name: String,
    zip: String,
}

async fn hello(args: Arguments) -> Result<String, HandlerError> {
    let name: Option<String> = args.get_as("name")?;
    Ok(format!("hello {}", name.as_deref().unwrap_or("world")))
}

async fn find_user(args: Arguments) -> Result<String, HandlerError> {
    let id: i64 = args.get_as("user_id")?;
    Ok(format!("user #{id}"))
}

async fn create_user(args: Arguments) -> Result<(String, StatusCode), HandlerError> {
    let user: User = args.model("user")?;
    Ok((format!("created {} living at {}", user.name, user.zip), StatusCode::CREATED))
}

async fn delete_user(_args: Arguments) {}

fn user_schema() -> ModelSchema {
    ModelSchema::new("User").field(Param::required("name", ParamType::Str)).field(Param::required("zip", ParamType::Str))
}

async fn show(app: &App, request: http::Request<Bytes>) {
    let (method, uri) = (request.method().clone(), request.uri().clone());
    match memory::call(app, request).await {
        Ok(recorded) => info!(%method, %uri, status = %recorded.status(), body = recorded.text(), "served"),
        Err(e) => info!(%method, %uri, cause = %e, "gateway failure"),
    }
}

// a run prints one line per request; no socket is opened, the in-memory gateway plays the server
#[tokio::main]
async fn main() {
    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let users = Router::new("/users")
        .tag("users")
        .route("/{user_id}", get(handler_fn(find_user)).param(Param::required("user_id", ParamType::Int)))
        .route("/{user_id}", delete(handler_fn(delete_user)).status(StatusCode::NO_CONTENT))
        .route("", post(handler_fn(create_user)).param(Param::required("user", ParamType::model(user_schema()))));

    let app = App::builder()
        .route("/", get(handler_fn(hello)).param(Param::optional("name", ParamType::Str)).content_type(mime::TEXT_PLAIN))
        .mount(&users)
        .build();

    for (pattern, method, endpoint) in app.routes().iter() {
        info!(%method, pattern, tags = ?endpoint.tags(), "route registered");
    }

    show(&app, http::Request::get("/?name=lite").body(Bytes::new()).unwrap()).await;
    show(&app, http::Request::get("/users/7").body(Bytes::new()).unwrap()).await;
    show(&app, http::Request::get("/users/seven").body(Bytes::new()).unwrap()).await;
    show(
        &app,
        http::Request::post("/users")
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(Bytes::from_static(br#"{"name": "hello", "zip": "world"}"#))
            .unwrap(),
    )
    .await;
    show(&app, http::Request::delete("/users/7").body(Bytes::new()).unwrap()).await;
    show(&app, http::Request::get("/nowhere").body(Bytes::new()).unwrap()).await;
}
