use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::comments::CommentService;
use crate::app::invalidation::PageInvalidator;
use crate::app::likes::LikeService;
use crate::app::notifications::NotificationService;
use crate::app::posts::PostService;
use crate::app::profiles::ProfileService;
use crate::domain::engagement::CommentView;
use crate::domain::notification::NotificationView;
use crate::domain::post::{PostSummary, PostView};
use crate::domain::user::Profile;
use crate::http::envelope::{Empty, Envelope};
use crate::http::extract::{JsonBody, PathParam};
use crate::http::{Actor, AppError};
use crate::AppState;

type Reply<T> = Result<Json<Envelope<T>>, AppError>;

fn post_service(state: &AppState) -> PostService {
    PostService::new(state.db.clone(), PageInvalidator::new(state.cache.clone()))
}

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db = state.db.ping().await.is_ok();
    let redis = state.cache.ping().await.is_ok();
    let status = if db && redis { "ok" } else { "degraded" };

    Json(HealthResponse { status })
}

#[derive(Serialize)]
pub struct PostsPayload {
    pub posts: Vec<PostView>,
}

pub async fn list_posts(State(state): State<AppState>) -> Reply<PostsPayload> {
    let posts = post_service(&state).get_posts().await?;
    Ok(Envelope::ok(PostsPayload { posts }))
}

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub content: String,
    pub image: Option<String>,
}

#[derive(Serialize)]
pub struct PostPayload {
    pub post: PostSummary,
}

pub async fn create_post(
    Actor(actor): Actor,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreatePostRequest>,
) -> Reply<PostPayload> {
    let post = post_service(&state)
        .create_post(actor, payload.content, payload.image)
        .await?;
    Ok(Envelope::ok(PostPayload { post }))
}

pub async fn delete_post(
    PathParam(id): PathParam<Uuid>,
    Actor(actor): Actor,
    State(state): State<AppState>,
) -> Reply<Empty> {
    post_service(&state).delete_post(actor, id).await?;
    Ok(Envelope::ok(Empty {}))
}

#[derive(Serialize)]
pub struct LikePayload {
    pub liked: bool,
}

pub async fn toggle_like(
    PathParam(id): PathParam<Uuid>,
    Actor(actor): Actor,
    State(state): State<AppState>,
) -> Reply<LikePayload> {
    let service = LikeService::new(state.db.clone(), PageInvalidator::new(state.cache.clone()));
    let toggled = service.toggle_like(actor, id).await?;
    Ok(Envelope::ok(LikePayload {
        liked: toggled.is_liked(),
    }))
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize)]
pub struct CommentPayload {
    pub comment: CommentView,
}

pub async fn create_comment(
    PathParam(id): PathParam<Uuid>,
    Actor(actor): Actor,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CreateCommentRequest>,
) -> Reply<CommentPayload> {
    let service = CommentService::new(state.db.clone(), PageInvalidator::new(state.cache.clone()));
    let comment = service.create_comment(actor, id, payload.content).await?;
    Ok(Envelope::ok(CommentPayload { comment }))
}

#[derive(Serialize)]
pub struct ProfilePayload {
    pub profile: Profile,
}

pub async fn get_profile(
    PathParam(username): PathParam<String>,
    State(state): State<AppState>,
) -> Reply<ProfilePayload> {
    let service = ProfileService::new(state.db.clone());
    let profile = service.get_profile_by_username(&username).await?;
    Ok(Envelope::ok(ProfilePayload { profile }))
}

pub async fn list_user_posts(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Reply<PostsPayload> {
    let service = ProfileService::new(state.db.clone());
    let posts = service.get_user_posts(id).await?;
    Ok(Envelope::ok(PostsPayload { posts }))
}

pub async fn list_liked_posts(
    PathParam(id): PathParam<Uuid>,
    State(state): State<AppState>,
) -> Reply<PostsPayload> {
    let service = ProfileService::new(state.db.clone());
    let posts = service.get_user_liked_posts(id).await?;
    Ok(Envelope::ok(PostsPayload { posts }))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowingPayload {
    pub is_following: bool,
}

pub async fn following_status(
    PathParam(id): PathParam<Uuid>,
    Actor(actor): Actor,
    State(state): State<AppState>,
) -> Reply<FollowingPayload> {
    let service = ProfileService::new(state.db.clone());
    let is_following = service.is_following(actor, id).await?;
    Ok(Envelope::ok(FollowingPayload { is_following }))
}

#[derive(Serialize)]
pub struct NotificationsPayload {
    pub notifications: Vec<NotificationView>,
}

pub async fn list_notifications(
    Actor(actor): Actor,
    State(state): State<AppState>,
) -> Reply<NotificationsPayload> {
    let service = NotificationService::new(state.db.clone());
    let notifications = service.list_notifications(actor).await?;
    Ok(Envelope::ok(NotificationsPayload { notifications }))
}

#[derive(Deserialize)]
pub struct MarkReadRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Serialize)]
pub struct MarkReadPayload {
    pub updated: u64,
}

pub async fn mark_notifications_read(
    Actor(actor): Actor,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<MarkReadRequest>,
) -> Reply<MarkReadPayload> {
    let service = NotificationService::new(state.db.clone());
    let updated = service.mark_notifications_read(actor, &payload.ids).await?;
    Ok(Envelope::ok(MarkReadPayload { updated }))
}
