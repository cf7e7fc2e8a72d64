//! Post submission and feed handlers.

use actix_web::{HttpResponse, web};
use serde::Serialize;

use quill_core::Draft;
use quill_shared::ApiResponse;
use quill_shared::dto::{FeedEntry, PostResponse, SubmitPostRequest};

use crate::controller::SUCCESS_MESSAGE;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/posts
pub async fn submit(
    state: web::Data<AppState>,
    body: web::Json<SubmitPostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let draft = Draft {
        content: req.content,
        scheduled_time: req.scheduled_time,
    };

    let post = state.controller.submit(draft).await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        PostResponse::from(&post),
        SUCCESS_MESSAGE,
    )))
}

/// GET /api/posts - every post in storage order, newest submission first
pub async fn list(state: web::Data<AppState>) -> HttpResponse {
    let posts = state.controller.posts().await;
    let body: Vec<PostResponse> = posts.iter().map(PostResponse::from).collect();
    HttpResponse::Ok().json(ApiResponse::ok(body))
}

/// GET /api/feed - published posts, most recently due first
pub async fn feed(state: web::Data<AppState>) -> HttpResponse {
    let feed = state.controller.feed().await;
    let body: Vec<FeedEntry> = feed.iter().map(FeedEntry::from).collect();
    HttpResponse::Ok().json(ApiResponse::ok(body))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub submitting: bool,
    pub scheduled: usize,
    pub published: usize,
}

/// GET /api/status
pub async fn status(state: web::Data<AppState>) -> HttpResponse {
    let posts = state.controller.posts().await;
    let published = posts.iter().filter(|p| p.is_published()).count();

    HttpResponse::Ok().json(StatusResponse {
        submitting: state.controller.is_submitting(),
        scheduled: posts.len() - published,
        published,
    })
}
