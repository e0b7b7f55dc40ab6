use crate::render::RenderedPost;

/// The rendered post list. The composer sits in front of the first entry.
#[derive(Debug, Default, Clone)]
pub struct PostList {
    posts: Vec<RenderedPost>,
}

impl PostList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a freshly published post directly after the composer.
    pub fn insert_after_editor(&mut self, post: RenderedPost) {
        self.posts.insert(0, post);
    }

    pub fn append(&mut self, post: RenderedPost) {
        self.posts.push(post);
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RenderedPost> {
        self.posts.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RenderedPost> {
        self.posts.iter()
    }

    pub fn position(&self, dom_id: &str) -> Option<usize> {
        self.posts.iter().position(|post| post.dom_id == dom_id)
    }
}
