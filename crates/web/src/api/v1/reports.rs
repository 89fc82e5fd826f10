use std::sync::Arc;

use axum::{
    extract::{OriginalUri, Path, Query, State},
    http::{Method, StatusCode},
    routing::{get, on},
    Extension, Json, Router,
};
use model::{
    report::{Report, ReportDraft, NEARBY_EPSILON_DEGREES},
    WithDistance, WithId,
};
use road_reports::ReportError;
use serde::Deserialize;
use utility::{geo::BoundingBox, id::Id, let_also::LetAlso};

use crate::{
    common::{
        route_not_found, schema, HateoasResult, RouteErrorResponse, RouteResult, VecResponse,
        METHOD_FILTER_ALL,
    },
    hateoas,
    middleware::base_url::{base_url_middleware, BaseUrl},
    WebState,
};

macro_rules! resource {
    ($($arg:tt)*) => {
        crate::api::v1::resource!("/reports{}", format_args!($($arg)*))
    };
}

pub(crate) fn routes(state: WebState) -> Router {
    Router::new()
        .route("/schema", get(schema::<Report>))
        .route("/nearby", get(nearby))
        .route("/:id", get(get_report))
        .route("/", get(get_reports).post(create_report))
        .layer(axum::middleware::from_fn(base_url_middleware))
        .with_state(state)
        .fallback_service(on(METHOD_FILTER_ALL, route_not_found))
}

async fn create_report(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { report_client }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
    Json(draft): Json<ReportDraft>,
) -> RouteResult<(StatusCode, Json<hateoas::Response<WithId<Report>>>)> {
    let error = |why: ReportError| {
        RouteErrorResponse::from(why)
            .with_method(&Method::POST)
            .with_uri(original_uri.path())
    };
    let id = report_client.save_report(draft).await.map_err(error)?;
    report_client
        .get_report(id)
        .await
        .map(|report| (StatusCode::CREATED, report_hateoas(report, base_url).json()))
        .map_err(error)
}

async fn get_reports(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { report_client }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithId<Report>>>> {
    report_client
        .get_reports()
        .await
        .map(|reports| {
            reports
                .into_iter()
                .map(|report| report_hateoas(report, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| VecResponse::new(data).hateoas().json())
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

async fn get_report(
    OriginalUri(original_uri): OriginalUri,
    Path(id): Path<i64>,
    State(WebState { report_client }): State<WebState>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<WithId<Report>> {
    report_client
        .get_report(Id::new(id))
        .await
        .map(|report| report_hateoas(report, base_url).json())
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

#[derive(Deserialize)]
struct NearbyQuery {
    latitude: f64,
    longitude: f64,
}

async fn nearby(
    OriginalUri(original_uri): OriginalUri,
    State(WebState { report_client }): State<WebState>,
    Query(params): Query<NearbyQuery>,
    Extension(base_url): Extension<Arc<BaseUrl>>,
) -> HateoasResult<VecResponse<hateoas::Response<WithDistance<WithId<Report>>>>> {
    let NearbyQuery {
        latitude,
        longitude,
    } = params;
    report_client
        .find_nearby(latitude, longitude)
        .await
        .map(|reports| {
            reports
                .into_iter()
                .map(|report| report_with_distance_hateoas(report, base_url.clone()))
                .collect::<Vec<_>>()
                .let_owned(|data| {
                    hateoas::Response::builder(VecResponse::new(data), base_url)
                        .link(
                            "self",
                            resource!("/nearby?latitude={}&longitude={}", latitude, longitude),
                        )
                        .debug_info(
                            "boundingBox",
                            BoundingBox::around(latitude, longitude, NEARBY_EPSILON_DEGREES)
                                .corners(),
                        )
                        .build()
                        .json()
                })
        })
        .map_err(|why| {
            RouteErrorResponse::from(why)
                .with_method(&Method::GET)
                .with_uri(original_uri.path())
        })
}

fn report_hateoas(
    report: WithId<Report>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithId<Report>> {
    let id = report.id;
    let location = report.content.location;
    hateoas::Response::builder(report, base_url)
        .link("self", resource!("/{}", id.raw()))
        .link(
            "nearby",
            resource!(
                "/nearby?latitude={}&longitude={}",
                location.latitude(),
                location.longitude()
            ),
        )
        .build()
}

fn report_with_distance_hateoas(
    report: WithDistance<WithId<Report>>,
    base_url: Arc<BaseUrl>,
) -> hateoas::Response<WithDistance<WithId<Report>>> {
    let id = report.content.id;
    hateoas::Response::builder(report, base_url)
        .link("self", resource!("/{}", id.raw()))
        .build()
}
