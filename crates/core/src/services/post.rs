//! Posts feed: posts, likes, comments and bookmarks.

use chrono::Utc;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tutorhub_common::{AppError, AppResult, IdGenerator};
use tutorhub_db::{
    entities::{notification::NotificationType, post, post_bookmark, post_comment, post_like},
    repositories::{
        PostBookmarkRepository, PostCommentRepository, PostLikeRepository, PostRepository,
    },
};
use validator::Validate;

use super::notification::{Notice, NotificationService};

/// Input for creating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 5000))]
    pub content: String,

    #[serde(default)]
    #[validate(length(max = 10))]
    pub image_urls: Vec<String>,
}

/// Input for a comment or reply.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CommentInput {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// Result of toggling a like.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i32,
}

/// Result of toggling a bookmark.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkState {
    pub bookmarked: bool,
}

/// Post service.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    like_repo: PostLikeRepository,
    comment_repo: PostCommentRepository,
    bookmark_repo: PostBookmarkRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub const fn new(
        post_repo: PostRepository,
        like_repo: PostLikeRepository,
        comment_repo: PostCommentRepository,
        bookmark_repo: PostBookmarkRepository,
        notifications: NotificationService,
    ) -> Self {
        Self {
            post_repo,
            like_repo,
            comment_repo,
            bookmark_repo,
            notifications,
            id_gen: IdGenerator::new(),
        }
    }

    /// Publish a post.
    pub async fn create(&self, author_id: &str, input: CreatePostInput) -> AppResult<post::Model> {
        input.validate()?;
        if input.content.trim().is_empty() {
            return Err(AppError::Validation("Post content is empty".to_string()));
        }

        self.post_repo
            .create(post::ActiveModel {
                id: Set(self.id_gen.generate()),
                author_id: Set(author_id.to_string()),
                content: Set(input.content),
                image_urls: Set(serde_json::json!(input.image_urls)),
                like_count: Set(0),
                comment_count: Set(0),
                created_at: Set(Utc::now().into()),
                updated_at: Set(None),
            })
            .await
    }

    /// Feed page, newest first.
    pub async fn list(&self, limit: u64, until_id: Option<&str>) -> AppResult<Vec<post::Model>> {
        self.post_repo.list(limit, until_id).await
    }

    /// Get a post.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Delete a post. Only its author or an admin may do so.
    pub async fn delete(&self, id: &str, caller_id: &str, is_admin: bool) -> AppResult<()> {
        let post = self.post_repo.get_by_id(id).await?;
        if !is_admin && post.author_id != caller_id {
            return Err(AppError::Forbidden("Not the author of this post".to_string()));
        }
        self.post_repo.delete(id).await
    }

    /// Like a post, or remove the like if already present.
    pub async fn toggle_like(&self, post_id: &str, account_id: &str) -> AppResult<LikeState> {
        let post = self.post_repo.get_by_id(post_id).await?;

        if let Some(existing) = self.like_repo.find(post_id, account_id).await? {
            // A concurrent unlike may have removed the row first.
            if !self.like_repo.delete(&existing.id).await? {
                return Ok(LikeState {
                    liked: false,
                    like_count: post.like_count,
                });
            }
            self.post_repo.decrement_like_count(post_id).await?;
            return Ok(LikeState {
                liked: false,
                like_count: (post.like_count - 1).max(0),
            });
        }

        self.like_repo
            .create(post_like::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                account_id: Set(account_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;
        self.post_repo.increment_like_count(post_id).await?;

        if post.author_id != account_id {
            self.notifications
                .deliver(vec![
                    Notice::new(
                        post.author_id.clone(),
                        NotificationType::PostLiked,
                        "New like",
                        "Someone liked your post",
                    )
                    .related_to(post.id.clone()),
                ])
                .await;
        }

        Ok(LikeState {
            liked: true,
            like_count: post.like_count + 1,
        })
    }

    /// Comment on a post.
    pub async fn comment(
        &self,
        post_id: &str,
        author_id: &str,
        input: CommentInput,
    ) -> AppResult<post_comment::Model> {
        input.validate()?;
        let post = self.post_repo.get_by_id(post_id).await?;

        let comment = self.store_comment(&post.id, author_id, None, input.content).await?;

        if post.author_id != author_id {
            self.notifications
                .deliver(vec![
                    Notice::new(
                        post.author_id.clone(),
                        NotificationType::PostCommented,
                        "New comment",
                        "Someone commented on your post",
                    )
                    .related_to(post.id.clone()),
                ])
                .await;
        }

        Ok(comment)
    }

    /// Reply to a comment. The reply belongs to the same post.
    pub async fn reply(
        &self,
        comment_id: &str,
        author_id: &str,
        input: CommentInput,
    ) -> AppResult<post_comment::Model> {
        input.validate()?;
        let parent = self.comment_repo.get_by_id(comment_id).await?;

        let reply = self
            .store_comment(&parent.post_id, author_id, Some(parent.id.clone()), input.content)
            .await?;

        if parent.author_id != author_id {
            self.notifications
                .deliver(vec![
                    Notice::new(
                        parent.author_id.clone(),
                        NotificationType::CommentReplied,
                        "New reply",
                        "Someone replied to your comment",
                    )
                    .related_to(parent.post_id.clone()),
                ])
                .await;
        }

        Ok(reply)
    }

    async fn store_comment(
        &self,
        post_id: &str,
        author_id: &str,
        parent_id: Option<String>,
        content: String,
    ) -> AppResult<post_comment::Model> {
        if content.trim().is_empty() {
            return Err(AppError::Validation("Comment is empty".to_string()));
        }

        let comment = self
            .comment_repo
            .create(post_comment::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                author_id: Set(author_id.to_string()),
                parent_id: Set(parent_id),
                content: Set(content),
                created_at: Set(Utc::now().into()),
            })
            .await?;
        self.post_repo.increment_comment_count(post_id).await?;

        Ok(comment)
    }

    /// Comments and replies on a post.
    pub async fn list_comments(
        &self,
        post_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<post_comment::Model>> {
        self.post_repo.get_by_id(post_id).await?;
        self.comment_repo.find_by_post(post_id, limit, offset).await
    }

    /// Bookmark a post, or remove the bookmark if already present.
    pub async fn toggle_bookmark(
        &self,
        post_id: &str,
        account_id: &str,
    ) -> AppResult<BookmarkState> {
        self.post_repo.get_by_id(post_id).await?;

        if let Some(existing) = self.bookmark_repo.find(post_id, account_id).await? {
            self.bookmark_repo.delete(&existing.id).await?;
            return Ok(BookmarkState { bookmarked: false });
        }

        self.bookmark_repo
            .create(post_bookmark::ActiveModel {
                id: Set(self.id_gen.generate()),
                post_id: Set(post_id.to_string()),
                account_id: Set(account_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        Ok(BookmarkState { bookmarked: true })
    }

    /// Case-insensitive search over post content.
    pub async fn search(&self, query: &str, limit: u64, offset: u64) -> AppResult<Vec<post::Model>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::BadRequest("Search query is empty".to_string()));
        }
        self.post_repo.search(query, limit, offset).await
    }

    /// Most liked posts.
    pub async fn recommended(&self, limit: u64) -> AppResult<Vec<post::Model>> {
        self.post_repo.recommended(limit).await
    }

    /// Posts the account bookmarked, most recently saved first.
    pub async fn saved(
        &self,
        account_id: &str,
        limit: u64,
        until_id: Option<&str>,
    ) -> AppResult<Vec<post::Model>> {
        let bookmarks = self
            .bookmark_repo
            .find_by_account(account_id, limit, until_id)
            .await?;
        let ids: Vec<String> = bookmarks.iter().map(|b| b.post_id.clone()).collect();

        let mut posts = self.post_repo.find_by_ids(&ids).await?;
        posts.sort_by_key(|p| ids.iter().position(|id| id == &p.id));
        Ok(posts)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;
    use tutorhub_db::{repositories::NotificationRepository, test_utils::fixtures};

    fn exec() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn empty() -> MockDatabase {
        MockDatabase::new(DatabaseBackend::Postgres)
    }

    struct Dbs {
        posts: MockDatabase,
        likes: MockDatabase,
        comments: MockDatabase,
        bookmarks: MockDatabase,
    }

    impl Default for Dbs {
        fn default() -> Self {
            Self {
                posts: empty(),
                likes: empty(),
                comments: empty(),
                bookmarks: empty(),
            }
        }
    }

    fn service(dbs: Dbs) -> PostService {
        PostService::new(
            PostRepository::new(Arc::new(dbs.posts.into_connection())),
            PostLikeRepository::new(Arc::new(dbs.likes.into_connection())),
            PostCommentRepository::new(Arc::new(dbs.comments.into_connection())),
            PostBookmarkRepository::new(Arc::new(dbs.bookmarks.into_connection())),
            NotificationService::new(NotificationRepository::new(Arc::new(
                empty().into_connection(),
            ))),
        )
    }

    #[tokio::test]
    async fn test_like_then_unlike() {
        let mut liked_post = fixtures::post("p1", "author");
        liked_post.like_count = 1;

        let posts = empty()
            .append_query_results([vec![fixtures::post("p1", "author")]])
            .append_exec_results([exec()])
            .append_query_results([vec![liked_post]])
            .append_exec_results([exec()]);
        let likes = empty()
            .append_query_results([Vec::<post_like::Model>::new()])
            .append_query_results([vec![fixtures::post_like("l1", "p1", "reader")]])
            .append_query_results([vec![fixtures::post_like("l1", "p1", "reader")]])
            .append_exec_results([exec()]);

        let service = service(Dbs {
            posts,
            likes,
            ..Dbs::default()
        });

        let first = service.toggle_like("p1", "reader").await.unwrap();
        assert_eq!(first, LikeState { liked: true, like_count: 1 });

        let second = service.toggle_like("p1", "reader").await.unwrap();
        assert_eq!(second, LikeState { liked: false, like_count: 0 });
    }

    #[tokio::test]
    async fn test_racing_unlike_does_not_decrement_twice() {
        let mut post = fixtures::post("p1", "author");
        post.like_count = 1;

        // No exec result is queued for the post counter, so a decrement would fail.
        let posts = empty().append_query_results([vec![post]]);
        let likes = empty()
            .append_query_results([vec![fixtures::post_like("l1", "p1", "reader")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]);

        let state = service(Dbs {
            posts,
            likes,
            ..Dbs::default()
        })
        .toggle_like("p1", "reader")
        .await
        .unwrap();

        assert_eq!(state, LikeState { liked: false, like_count: 1 });
    }

    #[tokio::test]
    async fn test_like_missing_post_not_found() {
        let posts = empty().append_query_results([Vec::<post::Model>::new()]);

        let result = service(Dbs {
            posts,
            ..Dbs::default()
        })
        .toggle_like("missing", "reader")
        .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_reply_attaches_to_parent_post() {
        let posts = empty().append_exec_results([exec()]);
        let comments = empty()
            .append_query_results([vec![fixtures::comment("c1", "p1", "author", None)]])
            .append_query_results([vec![fixtures::comment("c2", "p1", "reader", Some("c1"))]]);

        let reply = service(Dbs {
            posts,
            comments,
            ..Dbs::default()
        })
        .reply(
            "c1",
            "reader",
            CommentInput {
                content: "Thanks!".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(reply.post_id, "p1");
        assert_eq!(reply.parent_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_delete_by_other_account_forbidden() {
        let posts = empty().append_query_results([vec![fixtures::post("p1", "author")]]);

        let result = service(Dbs {
            posts,
            ..Dbs::default()
        })
        .delete("p1", "someone-else", false)
        .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_blank_search_rejected() {
        let result = service(Dbs::default()).search("   ", 10, 0).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_saved_keeps_bookmark_order() {
        let bookmarks = empty().append_query_results([vec![
            fixtures::post_bookmark("b2", "p1", "reader"),
            fixtures::post_bookmark("b1", "p2", "reader"),
        ]]);
        let posts = empty().append_query_results([vec![
            fixtures::post("p2", "author"),
            fixtures::post("p1", "author"),
        ]]);

        let saved = service(Dbs {
            posts,
            bookmarks,
            ..Dbs::default()
        })
        .saved("reader", 10, None)
        .await
        .unwrap();

        let ids: Vec<&str> = saved.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2"]);
    }
}
