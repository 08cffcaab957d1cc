use actix_cors::Cors;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde::Deserialize;
use serde_json::json;
use skinmatch_core::{browse, Product, ProductQuery, SkinType, UserProfile};
use skinmatch_similarity::{RecommendOptions, Recommender, SimilarityCache};
use skinmatch_storage::CatalogStore;
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::error::ApiError;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Shared state handed to every worker
pub struct AppState {
    pub store: Arc<CatalogStore>,
    pub recommender: Recommender,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(store: Arc<CatalogStore>, config: ServerConfig) -> Self {
        let mut recommender = Recommender::new();
        if config.cache_capacity > 0 {
            recommender = recommender.with_cache(Arc::new(SimilarityCache::new(config.cache_capacity)));
        }
        Self {
            store,
            recommender,
            config,
        }
    }
}

#[derive(Deserialize)]
struct RecommendRequest {
    product_id: Option<String>,
    count: Option<usize>,
    #[serde(default)]
    filter_skin_type: bool,
    #[serde(default)]
    filter_allergies: bool,
    filter_keyword: Option<String>,
    skin_type: Option<SkinType>,
    #[serde(default)]
    allergies: Vec<String>,
}

#[derive(Deserialize)]
struct ForUserQuery {
    skin_type: Option<String>,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(state: Arc<AppState>) -> std::io::Result<()> {
        let port = state.config.http_port;
        tracing::info!(port, "Starting REST API");

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(state.clone()))
                .configure(Self::configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }

    /// Route table, shared by the server and the tests
    pub fn configure(cfg: &mut web::ServiceConfig) {
        // Extractor failures answer with the same error body as the handlers
        cfg.app_data(
            web::JsonConfig::default()
                .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
        )
        .app_data(
            web::QueryConfig::default()
                .error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into()),
        )
        .route("/health", web::get().to(health))
        .route("/products", web::get().to(list_products))
        .route("/products/{id}", web::get().to(get_product))
        .route("/categories", web::get().to(list_categories))
        .route("/recommendations", web::post().to(recommend))
        .route("/recommendations/for-user", web::get().to(recommend_for_user))
        .route("/catalog/reload", web::post().to(reload_catalog));
    }
}

fn request_id(req: &HttpRequest) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

async fn health(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let info = state.store.info();
    let mut body = json!({
        "status": "ok",
        "products": info.products,
        "catalog_version": info.version,
    });
    if let Some(cache) = state.recommender.cache() {
        body["cache"] = json!(cache.stats());
    }
    HttpResponse::Ok().json(body)
}

async fn reload_catalog(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, ApiError> {
    let store = state.store.clone();
    let catalog = web::block(move || store.reload())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    if let Some(cache) = state.recommender.cache() {
        cache.retain_version(catalog.version());
    }
    tracing::info!(version = catalog.version(), products = catalog.len(), "Catalog reloaded");

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "catalog_version": catalog.version(),
        "products": catalog.len(),
    })))
}

async fn list_products(
    state: web::Data<Arc<AppState>>,
    query: web::Query<ProductQuery>,
) -> HttpResponse {
    let catalog = state.store.snapshot();
    let page = browse::list_products(&catalog, &query);
    HttpResponse::Ok().json(json!({
        "success": true,
        "products": page.products,
        "total": page.total,
        "limit": page.limit,
        "offset": page.offset,
    }))
}

async fn list_categories(state: web::Data<Arc<AppState>>) -> HttpResponse {
    let catalog = state.store.snapshot();
    HttpResponse::Ok().json(json!({
        "success": true,
        "categories": browse::categories(&catalog),
    }))
}

/// Popular products for a skin type; used when there is no reference product
async fn recommend_for_user(
    state: web::Data<Arc<AppState>>,
    query: web::Query<ForUserQuery>,
) -> Result<HttpResponse, ApiError> {
    let skin_type = query
        .skin_type
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<SkinType>)
        .transpose()?;

    let catalog = state.store.snapshot();
    let products = browse::popular_for(&catalog, skin_type, browse::POPULAR_LIMIT);
    tracing::debug!(skin_type = ?skin_type, returned = products.len(), "Served popular products");

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user_profile": { "skin_type": skin_type },
        "recommendations": products,
    })))
}

async fn get_product(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let request_id = request_id(&req);
    let id = path.into_inner();
    let catalog = state.store.snapshot();

    match catalog.get(&id) {
        Some(product) => Ok(HttpResponse::Ok()
            .insert_header((REQUEST_ID_HEADER, request_id))
            .json(product)),
        None => {
            tracing::debug!(%request_id, product = %id, "Product not found");
            Err(skinmatch_core::Error::ProductNotFound(id).into())
        }
    }
}

async fn recommend(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
    body: web::Json<RecommendRequest>,
) -> Result<HttpResponse, ApiError> {
    let request_id = request_id(&req);
    let body = body.into_inner();

    let product_id = body
        .product_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("product_id is required".to_string()))?;
    let count = body.count.unwrap_or(state.config.default_count);
    let options = RecommendOptions {
        filter_by_skin_type: body.filter_skin_type,
        filter_by_allergies: body.filter_allergies,
        keyword: body.filter_keyword,
    };
    let profile = UserProfile::new(body.skin_type, body.allergies);

    let catalog = state.store.snapshot();
    let recommender = state.recommender.clone();
    let job_catalog = catalog.clone();
    let job_reference = product_id.clone();
    let job = web::block(move || {
        recommender.recommend_detailed(&job_catalog, &job_reference, count, &options, &profile)
    });

    let result = match actix_web::rt::time::timeout(state.config.request_timeout, job).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => return Err(ApiError::Internal(e.to_string())),
        Err(_) => {
            tracing::warn!(%request_id, product = %product_id, "Recommendation timed out");
            return Err(ApiError::Timeout);
        }
    };

    let recommendation = match result {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!(%request_id, product = %product_id, error = %e, "Recommendation rejected");
            return Err(e.into());
        }
    };

    let reference = catalog.get(&product_id);
    let products: Vec<&Product> = recommendation
        .ids
        .iter()
        .filter_map(|id| catalog.get(id.as_str()))
        .collect();

    tracing::info!(
        %request_id,
        product = %product_id,
        returned = products.len(),
        candidates = recommendation.candidates,
        "Served recommendations"
    );

    Ok(HttpResponse::Ok()
        .insert_header((REQUEST_ID_HEADER, request_id))
        .json(json!({
            "success": true,
            "reference_product": reference,
            "recommendations": products,
            "filters_applied": recommendation.applied,
            "candidates": recommendation.candidates,
        })))
}
