//! Page planning: which pages the site has and what each one shows.
//!
//! The plan borrows from the collected posts; nothing here renders HTML.

use folio_core::{Error, Page, Post, Project, Result, Route};
use std::collections::{BTreeMap, HashSet};

/// Data needed to render one output page
#[derive(Debug, Clone, PartialEq)]
pub enum PageDescriptor<'a> {
    BlogPost {
        post: &'a Post,
        prev: Option<&'a Post>,
        next: Option<&'a Post>,
    },
    /// Every distinct tag, sorted alphabetically
    TagList { tags: Vec<&'a str> },
    /// Posts carrying `name`, in sequence order
    Tag { name: &'a str, posts: Vec<&'a Post> },
    /// Every post, newest first
    BlogIndex { posts: Vec<&'a Post> },
    Projects { projects: &'a [Project] },
    Standalone { page: &'a Page },
}

/// A descriptor together with the route it is served at
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPage<'a> {
    pub route: Route,
    pub descriptor: PageDescriptor<'a>,
}

/// Posts grouped by tag.
///
/// Each tag's list keeps the order posts were encountered in; a post is
/// listed once per tag even if it declares the tag more than once.
#[derive(Debug, Default)]
pub struct TagIndex<'a> {
    tags: BTreeMap<&'a str, Vec<&'a Post>>,
}

impl<'a> TagIndex<'a> {
    pub fn build(posts: &'a [Post]) -> Self {
        let mut tags: BTreeMap<&'a str, Vec<&'a Post>> = BTreeMap::new();
        for post in posts {
            for tag in post.unique_tags() {
                tags.entry(tag).or_default().push(post);
            }
        }
        Self { tags }
    }

    /// Tag names, sorted
    pub fn names(&self) -> Vec<&'a str> {
        self.tags.keys().copied().collect()
    }

    pub fn posts(&self, tag: &str) -> &[&'a Post] {
        self.tags.get(tag).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &[&'a Post])> {
        self.tags.iter().map(|(tag, posts)| (*tag, posts.as_slice()))
    }
}

/// One `BlogPost` page per post, linked to its neighbours in `posts`.
///
/// `posts` must already be in publish order.
pub fn blog_post_pages(posts: &[Post]) -> Vec<PlannedPage<'_>> {
    posts
        .iter()
        .enumerate()
        .map(|(i, post)| PlannedPage {
            route: post.path.clone(),
            descriptor: PageDescriptor::BlogPost {
                post,
                prev: i.checked_sub(1).map(|p| &posts[p]),
                next: posts.get(i + 1),
            },
        })
        .collect()
}

/// The tag list page followed by one page per tag
pub fn tag_pages<'a>(index: &TagIndex<'a>) -> Result<Vec<PlannedPage<'a>>> {
    let mut pages = Vec::with_capacity(index.len() + 1);
    pages.push(PlannedPage {
        route: Route::parse("/tags")?,
        descriptor: PageDescriptor::TagList {
            tags: index.names(),
        },
    });

    for (name, posts) in index.iter() {
        let route = Route::tag(name)
            .map_err(|e| Error::InvalidRoute(format!("tag '{}' cannot be routed: {}", name, e)))?;
        pages.push(PlannedPage {
            route,
            descriptor: PageDescriptor::Tag {
                name,
                posts: posts.to_vec(),
            },
        });
    }

    Ok(pages)
}

/// Plan the post pages and tag pages for an ordered post sequence
pub fn plan_posts(posts: &[Post]) -> Result<Vec<PlannedPage<'_>>> {
    let mut pages = blog_post_pages(posts);
    pages.extend(tag_pages(&TagIndex::build(posts))?);
    Ok(pages)
}

/// Every page of the site
#[derive(Debug, Clone, Default)]
pub struct PagePlan<'a> {
    pub pages: Vec<PlannedPage<'a>>,
}

impl<'a> PagePlan<'a> {
    pub fn get(&self, route: &str) -> Option<&PlannedPage<'a>> {
        self.pages.iter().find(|p| p.route.as_str() == route)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Plan the whole site.
///
/// Standalone pages come first, then the blog index, the projects page (when
/// there are projects), the posts and the tag pages.
///
/// # Errors
///
/// Fails when two pages claim the same route or a tag cannot be routed.
pub fn build_plan<'a>(
    posts: &'a [Post],
    pages: &'a [Page],
    projects: &'a [Project],
) -> Result<PagePlan<'a>> {
    let mut planned: Vec<PlannedPage<'a>> = pages
        .iter()
        .map(|page| PlannedPage {
            route: page.path.clone(),
            descriptor: PageDescriptor::Standalone { page },
        })
        .collect();

    // Undated posts trail the sequence; keep them at the bottom of the index too
    let mut newest_first: Vec<&Post> = posts.iter().rev().collect();
    newest_first.sort_by_key(|post| post.date.is_none());
    planned.push(PlannedPage {
        route: Route::parse("/blog")?,
        descriptor: PageDescriptor::BlogIndex {
            posts: newest_first,
        },
    });

    if !projects.is_empty() {
        planned.push(PlannedPage {
            route: Route::parse("/projects")?,
            descriptor: PageDescriptor::Projects { projects },
        });
    }

    planned.extend(plan_posts(posts)?);

    let mut seen: HashSet<&Route> = HashSet::with_capacity(planned.len());
    for page in &planned {
        if !seen.insert(&page.route) {
            return Err(Error::DuplicateRoute(page.route.to_string()));
        }
    }

    Ok(PagePlan { pages: planned })
}
