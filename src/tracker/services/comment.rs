//! Comments attached to issues.

use super::error::{TrackerServiceError, TrackerServiceResult, found, require_actor};
use crate::tracker::{
    domain::{ActorContext, Comment, CommentId, IssueId, UserId},
    ports::{RecordRef, TrackerStore},
};
use mockable::Clock;
use std::sync::Arc;
use tracing::{info, warn};

/// Comment orchestration service.
#[derive(Clone)]
pub struct CommentService<S, C>
where
    S: TrackerStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> CommentService<S, C>
where
    S: TrackerStore,
    C: Clock + Send + Sync,
{
    /// Creates a new comment service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Adds a comment authored by the acting user.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Unauthenticated`] without an actor,
    /// [`TrackerServiceError::NotFound`] for a missing issue, or a domain
    /// error for blank text.
    pub async fn add(
        &self,
        actor: &ActorContext,
        issue_id: IssueId,
        text: impl Into<String> + Send,
    ) -> TrackerServiceResult<Comment> {
        let author = require_actor(actor, "add comment")?;
        found(
            self.store.find_issue(issue_id).await?,
            RecordRef::Issue(issue_id),
        )?;

        let comment = Comment::new(issue_id, author, text, &*self.clock)?;
        self.store.store_comment(&comment).await?;
        info!(comment_id = %comment.id(), issue_id = %issue_id, "comment added");
        Ok(comment)
    }

    /// Replaces a comment's text. Only its author may edit it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] for a missing comment,
    /// [`TrackerServiceError::NotCommentAuthor`] for anyone but the author,
    /// or a domain error for blank text.
    pub async fn edit(
        &self,
        actor: &ActorContext,
        comment_id: CommentId,
        text: impl Into<String> + Send,
    ) -> TrackerServiceResult<Comment> {
        let actor_id = require_actor(actor, "edit comment")?;
        let mut comment = self.load_authored(comment_id, actor_id).await?;
        comment.edit(text, &*self.clock)?;
        self.store.update_comment(&comment).await?;
        info!(comment_id = %comment_id, "comment edited");
        Ok(comment)
    }

    /// Deletes a comment. Only its author may delete it.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::NotFound`] for a missing comment or
    /// [`TrackerServiceError::NotCommentAuthor`] for anyone but the author.
    pub async fn delete(
        &self,
        actor: &ActorContext,
        comment_id: CommentId,
    ) -> TrackerServiceResult<()> {
        let actor_id = require_actor(actor, "delete comment")?;
        self.load_authored(comment_id, actor_id).await?;
        self.store.delete_comment(comment_id).await?;
        info!(comment_id = %comment_id, "comment deleted");
        Ok(())
    }

    /// Lists an issue's comments in creation order.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerServiceError::Repository`] when the query fails.
    pub async fn list_for_issue(&self, issue_id: IssueId) -> TrackerServiceResult<Vec<Comment>> {
        Ok(self.store.list_comments(issue_id).await?)
    }

    async fn load_authored(
        &self,
        comment_id: CommentId,
        actor_id: UserId,
    ) -> TrackerServiceResult<Comment> {
        let comment = found(
            self.store.find_comment(comment_id).await?,
            RecordRef::Comment(comment_id),
        )?;
        if comment.author() != actor_id {
            warn!(comment_id = %comment_id, actor = %actor_id, "comment change by non-author rejected");
            return Err(TrackerServiceError::NotCommentAuthor {
                comment_id,
                actor: actor_id,
            });
        }
        Ok(comment)
    }
}
