//! Comments and the reply tree shown on the book page

use serde::{Deserialize, Serialize};

/// Replies shown before "show more" is used
pub const INITIAL_VISIBLE_REPLIES: usize = 2;

/// Comment as returned by the server, replies nested to any depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "comment_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_display_name: String,
    #[serde(default)]
    pub user_avatar_url: String,
    pub content: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub likes: u32,
    #[serde(default)]
    pub created_at: Option<serde_json::Value>,
    #[serde(default)]
    pub replies: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct NewComment {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

/// A comment plus the transient display state the UI keeps for it.
/// None of the display fields are sent back to the server.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread {
    pub id: String,
    pub user_id: String,
    pub user_display_name: String,
    pub user_avatar_url: String,
    pub content: String,
    pub likes: u32,
    pub created_at: Option<serde_json::Value>,
    pub show_replies: bool,
    pub visible_replies_count: usize,
    pub has_more_replies: bool,
    pub replies: Vec<CommentThread>,
}

impl CommentThread {
    /// Annotate a comment and all of its descendants.
    pub fn assemble(comment: Comment) -> Self {
        let replies: Vec<CommentThread> = comment.replies.into_iter().map(Self::assemble).collect();
        Self {
            id: comment.id,
            user_id: comment.user_id,
            user_display_name: comment.user_display_name,
            user_avatar_url: comment.user_avatar_url,
            content: comment.content,
            likes: comment.likes,
            created_at: comment.created_at,
            show_replies: false,
            visible_replies_count: INITIAL_VISIBLE_REPLIES,
            has_more_replies: replies.len() > INITIAL_VISIBLE_REPLIES,
            replies,
        }
    }

    /// This node plus every nested reply
    pub fn count(&self) -> usize {
        1 + self.replies.iter().map(CommentThread::count).sum::<usize>()
    }

    pub fn visible_replies(&self) -> &[CommentThread] {
        if !self.show_replies {
            return &[];
        }
        let end = self.visible_replies_count.min(self.replies.len());
        &self.replies[..end]
    }

    pub fn toggle_replies(&mut self) {
        self.show_replies = !self.show_replies;
    }

    /// Reveal `step` more replies, capped at the reply count
    pub fn show_more_replies(&mut self, step: usize) {
        self.show_replies = true;
        self.visible_replies_count = (self.visible_replies_count + step).min(self.replies.len());
        self.has_more_replies = self.visible_replies_count < self.replies.len();
    }

    /// Depth-first search by id through the whole tree
    pub fn find_mut(&mut self, id: &str) -> Option<&mut CommentThread> {
        if self.id == id {
            return Some(self);
        }
        self.replies.iter_mut().find_map(|reply| reply.find_mut(id))
    }
}

/// Annotate a list of top-level comments
pub fn assemble_threads(comments: Vec<Comment>) -> Vec<CommentThread> {
    comments.into_iter().map(CommentThread::assemble).collect()
}

/// Number of comments in the forest, nested replies included
pub fn total_count(threads: &[CommentThread]) -> usize {
    threads.iter().map(CommentThread::count).sum()
}

pub fn find_thread_mut<'a>(threads: &'a mut [CommentThread], id: &str) -> Option<&'a mut CommentThread> {
    threads.iter_mut().find_map(|thread| thread.find_mut(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn comment(id: &str, replies: Vec<Comment>) -> Comment {
        Comment {
            id: id.to_string(),
            user_id: "u".to_string(),
            user_display_name: String::new(),
            user_avatar_url: String::new(),
            content: format!("comment {}", id),
            parent_id: None,
            likes: 0,
            created_at: None,
            replies,
        }
    }

    fn leaves(prefix: &str, n: usize) -> Vec<Comment> {
        (0..n).map(|i| comment(&format!("{}-{}", prefix, i), vec![])).collect()
    }

    #[test]
    fn test_total_count_includes_replies() {
        let threads = assemble_threads(vec![comment("a", leaves("a", 3)), comment("b", leaves("b", 3))]);
        assert_eq!(total_count(&threads), 8);
    }

    #[test]
    fn test_every_depth_is_annotated() {
        let deep = comment("root", vec![comment("mid", vec![comment("leaf", leaves("x", 3))])]);
        let thread = CommentThread::assemble(deep);

        assert!(!thread.has_more_replies);
        let mid = &thread.replies[0];
        let leaf = &mid.replies[0];
        assert_eq!(mid.visible_replies_count, INITIAL_VISIBLE_REPLIES);
        assert!(!leaf.show_replies);
        assert!(leaf.has_more_replies);
        assert!(!leaf.replies[0].has_more_replies);
        assert_eq!(thread.count(), 6);
    }

    #[test]
    fn test_has_more_replies_threshold() {
        assert!(!CommentThread::assemble(comment("a", leaves("a", 2))).has_more_replies);
        assert!(CommentThread::assemble(comment("a", leaves("a", 3))).has_more_replies);
    }

    #[test]
    fn test_deserialize_without_replies() {
        let parsed: Vec<Comment> = serde_json::from_value(json!([
            {"comment_id": "c1", "content": "great", "likes": 2}
        ]))
        .unwrap();
        let threads = assemble_threads(parsed);
        assert!(threads[0].replies.is_empty());
        assert_eq!(total_count(&threads), 1);
    }

    #[test]
    fn test_show_more_replies() {
        let mut thread = CommentThread::assemble(comment("a", leaves("a", 5)));
        assert!(thread.visible_replies().is_empty());

        thread.show_more_replies(2);
        assert_eq!(thread.visible_replies().len(), 4);
        assert!(thread.has_more_replies);

        thread.show_more_replies(2);
        assert_eq!(thread.visible_replies().len(), 5);
        assert!(!thread.has_more_replies);
    }

    #[test]
    fn test_find_nested() {
        let mut threads = assemble_threads(vec![comment("a", vec![comment("b", leaves("c", 1))])]);
        let found = find_thread_mut(&mut threads, "c-0").expect("nested reply");
        found.toggle_replies();
        assert!(threads[0].replies[0].replies[0].show_replies);
    }
}
