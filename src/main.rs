mod auth;
mod catalog;
mod config;
mod db;
mod error;
mod models;
mod query;
mod validation;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    handlers as auth_handlers, AuthResponse, AuthService, CredentialStore, LoginRequest,
    MessageResponse, PgCredentialStore, PgSessionStore, RefreshResponse, SessionStore,
    SignupRequest, TokenService,
};
use catalog::{
    handlers::{self as catalog_handlers, list_comments},
    routes, Collection, Comment, Movie, PgCollection, Theater, UpdateComment, UpdateMovie,
    UpdateTheater,
};
use config::Config;

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth_handlers::signup_handler,
        auth_handlers::login_handler,
        auth_handlers::refresh_handler,
        auth_handlers::logout_handler,
        routes::list_movies,
        routes::create_movie,
        routes::get_movie,
        routes::update_movie,
        routes::delete_movie,
        catalog_handlers::list_comments,
        routes::create_comment,
        routes::get_comment,
        routes::update_comment,
        routes::delete_comment,
        routes::list_theaters,
        routes::create_theater,
        routes::get_theater,
        routes::update_theater,
        routes::delete_theater,
    ),
    components(
        schemas(
            SignupRequest, LoginRequest, AuthResponse, RefreshResponse, MessageResponse,
            Movie, UpdateMovie, Comment, UpdateComment, Theater, UpdateTheater
        )
    ),
    tags(
        (name = "auth", description = "Cookie-based authentication endpoints"),
        (name = "movies", description = "Movie catalog"),
        (name = "comments", description = "Comments on movies"),
        (name = "theaters", description = "Theaters")
    ),
    info(
        title = "Movie Catalog API",
        version = "1.0.0",
        description = "RESTful API for movies, comments and theaters with cookie-based sessions"
    )
)]
struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub tokens: Arc<TokenService>,
    pub movies: Collection<Movie>,
    pub comments: Collection<Comment>,
    pub theaters: Collection<Theater>,
}

impl AppState {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        tokens: Arc<TokenService>,
        movies: Collection<Movie>,
        comments: Collection<Comment>,
        theaters: Collection<Theater>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(credentials, sessions, Arc::clone(&tokens)));
        Self {
            auth,
            tokens,
            movies,
            comments,
            theaters,
        }
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.auth)
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.tokens)
    }
}

impl FromRef<AppState> for Collection<Movie> {
    fn from_ref(state: &AppState) -> Self {
        state.movies.clone()
    }
}

impl FromRef<AppState> for Collection<Comment> {
    fn from_ref(state: &AppState) -> Self {
        state.comments.clone()
    }
}

impl FromRef<AppState> for Collection<Theater> {
    fn from_ref(state: &AppState) -> Self {
        state.theaters.clone()
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Auth routes
        .route("/auth/signup", post(auth_handlers::signup_handler))
        .route("/auth/login", post(auth_handlers::login_handler))
        .route("/auth/refresh", get(auth_handlers::refresh_handler))
        .route("/auth/logout", post(auth_handlers::logout_handler))
        // Comment routes are registered beside /api/movies/:id; static segments win
        .route(
            "/api/movies/comments",
            get(list_comments).post(routes::create_comment),
        )
        .route(
            "/api/movies/comments/:id",
            get(routes::get_comment)
                .put(routes::update_comment)
                .delete(routes::delete_comment),
        )
        .route(
            "/api/movies",
            get(routes::list_movies).post(routes::create_movie),
        )
        .route(
            "/api/movies/:id",
            get(routes::get_movie)
                .put(routes::update_movie)
                .delete(routes::delete_movie),
        )
        .route(
            "/api/theaters",
            get(routes::list_theaters).post(routes::create_theater),
        )
        .route(
            "/api/theaters/:id",
            get(routes::get_theater)
                .put(routes::update_theater)
                .delete(routes::delete_theater),
        )
        .layer(cors)
        .with_state(state)
}

async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&db_pool).await?;

    let tokens = Arc::new(TokenService::new(&config.jwt_secret, &config.refresh_secret));
    let credentials: Arc<dyn CredentialStore> = Arc::new(PgCredentialStore::new(db_pool.clone()));
    let sessions: Arc<dyn SessionStore> = Arc::new(PgSessionStore::new(db_pool.clone()));

    auth::reaper::spawn_session_reaper(Arc::clone(&sessions), config.session_reap_interval);

    let state = AppState::new(
        credentials,
        sessions,
        tokens,
        Collection::new(Arc::new(PgCollection::<Movie>::new(db_pool.clone()))),
        Collection::new(Arc::new(PgCollection::<Comment>::new(db_pool.clone()))),
        Collection::new(Arc::new(PgCollection::<Theater>::new(db_pool))),
    );
    let app = create_router(state);

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Movie Catalog API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Movie Catalog API - Starting...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    tracing::debug!("Loaded {:?}", config);
    config.warn_on_weak_secrets();

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
