//! Browsing over the listings fetched from `GET /posts`: text search, category
//! filter and fixed-size pages, all in memory.

use crate::common::Post;

pub const PAGE_SIZE: usize = 9;

#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    /// Case-insensitive substring of title or description. Blank matches all.
    pub search: String,
    /// Accepted categories. Empty accepts every category.
    pub categories: Vec<String>,
}

impl ListingFilter {
    pub fn matches(&self, post: &Post) -> bool {
        let needle = self.search.trim().to_lowercase();
        let text_match = needle.is_empty()
            || post.title.to_lowercase().contains(&needle)
            || post.description.to_lowercase().contains(&needle);
        let category_match =
            self.categories.is_empty() || self.categories.iter().any(|c| *c == post.category);
        text_match && category_match
    }
}

#[derive(Debug)]
pub struct ListingPage<'a> {
    pub items: Vec<&'a Post>,
    /// 1-based, clamped into `1..=total_pages`.
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

pub fn browse<'a>(posts: &'a [Post], filter: &ListingFilter, page: usize) -> ListingPage<'a> {
    let matching: Vec<&Post> = posts.iter().filter(|post| filter.matches(post)).collect();
    let total_pages = matching.len().div_ceil(PAGE_SIZE);
    let page = page.clamp(1, total_pages.max(1));

    let items = matching
        .iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .copied()
        .collect();

    ListingPage {
        items,
        page,
        total_pages,
        total_matches: matching.len(),
    }
}

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

/// One line per listing for the terminal.
pub fn summary_line(post: &Post) -> String {
    format!(
        "#{:<4} {:<32} {:>10}  {:<12} by {}",
        post.id,
        post.title,
        format_price(post.asking_price),
        post.category,
        post.owner_username().unwrap_or("Unknown")
    )
}

pub fn detail(post: &Post) -> String {
    let owner = post.owner.as_ref();
    let mut lines = vec![
        post.title.clone(),
        format_price(post.asking_price),
        format!("Category: {}", post.category),
        String::new(),
        post.description.clone(),
        String::new(),
        "Seller".to_string(),
        format!(
            "  Username: {}",
            owner.map(|o| o.username.as_str()).unwrap_or("Unknown")
        ),
        format!(
            "  Email: {}",
            owner.and_then(|o| o.email.as_deref()).unwrap_or("Not available")
        ),
        format!(
            "  College: {}",
            owner.and_then(|o| o.college.as_deref()).unwrap_or("Not specified")
        ),
    ];
    if let Some(url) = &post.image_url {
        lines.push(format!("Image: {url}"));
    }
    lines.join("\n")
}
