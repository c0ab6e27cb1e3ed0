use crate::components::{
    BlogIndexView, BlogPostView, Chrome, PostLink, ProjectsView, SiteLayout, StandaloneView,
    TagListView, TagView,
};
use crate::plan::{PageDescriptor, PlannedPage};
use folio_core::Post;
use leptos::prelude::*;

fn owned(posts: &[&Post]) -> Vec<Post> {
    posts.iter().map(|post| (*post).clone()).collect()
}

/// Render one planned page to a complete HTML document
pub fn render_page(chrome: &Chrome, page: &PlannedPage<'_>) -> String {
    let date_format = chrome.date_format.clone();

    let (title, description, content) = match &page.descriptor {
        PageDescriptor::BlogPost { post, prev, next } => {
            let title = post.title.clone();
            let description = post.description.clone();
            let post = (*post).clone();
            let prev = prev.map(PostLink::from);
            let next = next.map(PostLink::from);
            let view = view! {
                <BlogPostView post=post prev=prev next=next date_format=date_format/>
            };
            (title, description, view.into_any())
        }
        PageDescriptor::TagList { tags } => {
            let tags: Vec<String> = tags.iter().map(|tag| tag.to_string()).collect();
            let view = view! { <TagListView tags=tags/> };
            (String::from("Tags"), None, view.into_any())
        }
        PageDescriptor::Tag { name, posts } => {
            let title = format!("Tag: {}", name);
            let name = name.to_string();
            let posts = owned(posts);
            let view = view! { <TagView name=name posts=posts date_format=date_format/> };
            (title, None, view.into_any())
        }
        PageDescriptor::BlogIndex { posts } => {
            let posts = owned(posts);
            let view = view! { <BlogIndexView posts=posts date_format=date_format/> };
            (String::from("Blog"), None, view.into_any())
        }
        PageDescriptor::Projects { projects } => {
            let projects = projects.to_vec();
            let view = view! { <ProjectsView projects=projects/> };
            (String::from("Projects"), None, view.into_any())
        }
        PageDescriptor::Standalone { page } => {
            let title = page.title.clone();
            let description = page.description.clone();
            let page = (*page).clone();
            let view = view! { <StandaloneView page=page/> };
            (title, description, view.into_any())
        }
    };

    let chrome = chrome.clone();
    let route = page.route.to_string();
    let html = view! {
        <SiteLayout chrome=chrome route=route title=title description=description>
            {content}
        </SiteLayout>
    }
    .to_html();

    format!("<!DOCTYPE html>{}", html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::{PagePlan, build_plan};
    use chrono::NaiveDate;
    use folio_core::{NavLink, Page, Project, Route, SocialLink, Theme};
    use std::path::PathBuf;

    fn chrome() -> Chrome {
        Chrome {
            site_title: String::from("lennythedev"),
            site_url: Some(String::from("https://example.com")),
            description: Some(String::from("dev adventures")),
            nav: NavLink::defaults(),
            social: vec![SocialLink {
                name: String::from("GitHub"),
                url: String::from("https://github.com/someone"),
                icon: None,
            }],
            theme_script: String::from("window.__theme = 1;"),
            initial_theme: Theme::Light,
            date_format: String::from("%b %d, %Y"),
            preview: false,
        }
    }

    fn post(path: &str, day: u32, tags: &[&str]) -> Post {
        Post {
            path: Route::parse(path).unwrap(),
            title: format!("Post {}", path.trim_start_matches('/')),
            date: NaiveDate::from_ymd_opt(2021, 6, day).and_then(|d| d.and_hms_opt(0, 0, 0)),
            date_updated: None,
            description: Some(String::from("A description")),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            excerpt: String::from("An excerpt"),
            html: String::from("<p>Body <strong>html</strong></p>"),
            source: PathBuf::from("post.md"),
        }
    }

    fn render(plan: &PagePlan<'_>, route: &str) -> String {
        render_page(&chrome(), plan.get(route).unwrap())
    }

    #[test]
    fn test_blog_post_page() {
        let posts = vec![post("/a", 1, &["react"]), post("/b", 10, &[]), post("/c", 11, &[])];
        let plan = build_plan(&posts, &[], &[]).unwrap();
        let html = render(&plan, "/b");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Post b | lennythedev</title>"));
        assert!(html.contains("<p>Body <strong>html</strong></p>"));
        assert!(html.contains("Jun 10, 2021"));
        assert!(html.contains("⬅ Previous post"));
        assert!(html.contains("Next post ➡"));
        assert!(html.contains(r#"href="/a""#));
        assert!(html.contains(r#"href="/c""#));
        assert!(html.contains(r#"<link rel="canonical" href="https://example.com/b""#));

        let first = render(&plan, "/a");
        assert!(!first.contains("Previous post"));
        assert!(first.contains(r#"href="/tags/react""#));
    }

    #[test]
    fn test_theme_script_runs_before_content() {
        let posts = vec![post("/a", 1, &[])];
        let plan = build_plan(&posts, &[], &[]).unwrap();
        let html = render(&plan, "/a");

        let script = html.find("window.__theme = 1;").unwrap();
        let header = html.find("site-header").unwrap();
        let main = html.find("<main").unwrap();
        assert!(html.find("<body").unwrap() < script);
        assert!(script < header);
        assert!(script < main);
        assert!(html.contains("data-theme-toggle"));
        assert!(html.contains(r#"src="/theme.js""#));
        assert!(!html.contains("/_reload"));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let mut p = post("/a", 1, &[]);
        p.title = String::from("<script>alert(1)</script>");
        let posts = vec![p];
        let plan = build_plan(&posts, &[], &[]).unwrap();
        let html = render(&plan, "/a");

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_tag_pages() {
        let posts = vec![post("/a", 1, &["x"]), post("/b", 2, &["x", "y"])];
        let plan = build_plan(&posts, &[], &[]).unwrap();

        let list = render(&plan, "/tags");
        assert!(list.contains("<h1>Tags</h1>"));
        assert!(list.contains(r#"href="/tags/x""#));
        assert!(list.contains(r#"href="/tags/y""#));

        let tag = render(&plan, "/tags/x");
        assert!(tag.contains("Browse by tag: x"));
        assert!(tag.contains("Post a"));
        assert!(tag.contains("Post b"));
        assert!(tag.contains(r#"href="/tags""#));

        let y = render(&plan, "/tags/y");
        assert!(!y.contains("Post a"));
    }

    #[test]
    fn test_tag_links_are_percent_encoded() {
        let posts = vec![post("/a", 1, &["C#", "web dev"])];
        let plan = build_plan(&posts, &[], &[]).unwrap();

        let list = render(&plan, "/tags");
        assert!(list.contains(r#"href="/tags/C%23""#));
        assert!(list.contains(r#"href="/tags/web%20dev""#));

        let article = render(&plan, "/a");
        assert!(article.contains(r#"href="/tags/C%23""#));

        let tag = render(&plan, "/tags/web dev");
        assert!(tag.contains("Browse by tag: web dev"));
        assert!(tag.contains(r#"<link rel="canonical" href="https://example.com/tags/web%20dev""#));
    }

    #[test]
    fn test_blog_index_newest_first() {
        let posts = vec![post("/a", 1, &[]), post("/b", 2, &[])];
        let plan = build_plan(&posts, &[], &[]).unwrap();
        let html = render(&plan, "/blog");

        assert!(html.contains("Browse by Tag"));
        assert!(html.find("Post b").unwrap() < html.find("Post a").unwrap());
        assert!(html.contains(r#"aria-current="page""#));
    }

    #[test]
    fn test_projects_and_standalone_pages() {
        let pages = vec![Page {
            path: Route::parse("/about").unwrap(),
            title: String::from("About me"),
            description: Some(String::from("Who I am")),
            html: String::from("<p>Hello</p>"),
            source: PathBuf::from("about.md"),
        }];
        let projects = vec![Project {
            id: String::from("shoppy"),
            name: String::from("Shoppy"),
            description: String::from("A shop"),
            tags: vec![String::from("react")],
            live_link: Some(String::from("https://shoppy.example.com")),
            github_link: None,
            image_link: None,
        }];
        let plan = build_plan(&[], &pages, &projects).unwrap();

        let about = render(&plan, "/about");
        assert!(about.contains("<title>About me | lennythedev</title>"));
        assert!(about.contains(r#"content="Who I am""#));
        assert!(about.contains("<p>Hello</p>"));

        let listing = render(&plan, "/projects");
        assert!(listing.contains("Shoppy"));
        assert!(listing.contains(r#"href="https://shoppy.example.com""#));
        assert!(!listing.contains("GitHub</a>"));
    }

    #[test]
    fn test_preview_pages_subscribe_to_reload() {
        let pages = vec![Page {
            path: Route::root(),
            title: String::from("Home"),
            description: None,
            html: String::new(),
            source: PathBuf::from("index.md"),
        }];
        let plan = build_plan(&[], &pages, &[]).unwrap();
        let mut chrome = chrome();
        chrome.preview = true;

        let html = render_page(&chrome, plan.get("/").unwrap());
        assert!(html.contains("new EventSource('/_reload')"));
        assert!(html.contains(r#"content="dev adventures""#));
    }
}
