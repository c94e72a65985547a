//! Typed calls against the per-entity collection resources.

use serde_json::Value;

use super::{ApiRequest, CrmApi};
use crate::entity::Entity;
use crate::error::ApiError;
use crate::models::Task;

pub fn collection_path<E: Entity>() -> String {
    format!("/{}", E::RESOURCE)
}

pub fn record_path<E: Entity>(id: i64) -> String {
    format!("/{}/{}", E::RESOURCE, id)
}

/// `GET /E`, scoped by the entity's list query.
pub async fn list<E: Entity>(api: &dyn CrmApi, scope: &E::Scope) -> Result<Vec<E>, ApiError> {
    let mut request = ApiRequest::get(collection_path::<E>());
    for (name, value) in E::list_query(scope) {
        request = request.with_query(name, value);
    }
    api.call(request).await
}

pub async fn fetch<E: Entity>(api: &dyn CrmApi, id: i64) -> Result<E, ApiError> {
    api.call(ApiRequest::get(record_path::<E>(id))).await
}

/// `POST /E`. The created record, if the API echoes it back.
pub async fn create<E: Entity>(api: &dyn CrmApi, record: &E) -> Result<Option<E>, ApiError> {
    let body = serde_json::to_value(record)?;
    api.call(ApiRequest::post(collection_path::<E>(), body)).await
}

pub async fn update<E: Entity>(api: &dyn CrmApi, id: i64, record: &E) -> Result<Option<E>, ApiError> {
    let body = serde_json::to_value(record)?;
    api.call(ApiRequest::put(record_path::<E>(id), body)).await
}

pub async fn delete<E: Entity>(api: &dyn CrmApi, id: i64) -> Result<(), ApiError> {
    api.send(ApiRequest::delete(record_path::<E>(id))).await.map(|_: Option<Value>| ())
}

/// `PATCH /tasks/{id}?done=..`. The store only touches `done` here, never `status`.
pub async fn set_task_done(api: &dyn CrmApi, id: i64, done: bool) -> Result<Option<Task>, ApiError> {
    let request = ApiRequest::patch(record_path::<Task>(id)).with_query("done", done.to_string());
    api.call(request).await
}
