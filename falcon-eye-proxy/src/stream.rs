//! `StreamProxy(camera_id)`: relays the camera's `multipart/x-mixed-replace`
//! feed to the client with no buffering, preserving content type and
//! closing the upstream connection the moment the client disconnects.

use falcon_eye_cluster::ClusterClient;
use falcon_eye_types::{labels, Camera};
use futures_util::StreamExt;
use k8s_openapi::api::core::v1::Service;
use uuid::Uuid;

use crate::error::Error;

pub struct UpstreamStream {
    pub content_type: Option<String>,
    pub body: reqwest::Response,
}

pub async fn stream_proxy(
    cluster: &ClusterClient,
    db: &deadpool_postgres::Pool,
    http: &reqwest::Client,
    camera_id: Uuid,
) -> Result<UpstreamStream, Error> {
    let camera: Camera = falcon_eye_db::cameras::get_camera(db, camera_id).await?;

    let selector = labels::selector(labels::CAMERA_ID, &camera_id.to_string());
    let services = cluster.list_workloads_by_label::<Service>(&selector).await?;
    if services.is_empty() {
        return Err(Error::NoService);
    }

    let url = falcon_eye_manifest::stream_url(&camera, cluster.namespace());
    let response = http
        .get(&url)
        .send()
        .await
        .map_err(|_| Error::UpstreamUnavailable)?;
    if !response.status().is_success() {
        return Err(Error::UpstreamUnavailable);
    }
    let content_type = response
        .headers()
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    Ok(UpstreamStream { content_type, body: response })
}

/// Adapts the upstream `reqwest::Response` into the byte stream `axum::body::Body::from_stream`
/// expects, with no intermediate buffering.
pub fn into_body_stream(response: reqwest::Response) -> impl futures_util::Stream<Item = Result<bytes::Bytes, std::io::Error>> {
    response.bytes_stream().map(|r| r.map_err(std::io::Error::other))
}
