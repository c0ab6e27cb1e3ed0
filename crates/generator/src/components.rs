//! Leptos components for every page of the site.
//!
//! Rendered server side only. Props are owned so the views can be built
//! without borrowing from the page plan.

use chrono::NaiveDateTime;
use folio_core::{NavLink, Page, Post, Project, SocialLink, Theme, format_date};
use leptos::prelude::*;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Everything the shared layout needs besides the page itself
#[derive(Debug, Clone)]
pub struct Chrome {
    pub site_title: String,
    /// Base URL without trailing slash, used for canonical links
    pub site_url: Option<String>,
    pub description: Option<String>,
    pub nav: Vec<NavLink>,
    pub social: Vec<SocialLink>,
    /// Pre-paint script inlined at the top of `<body>`
    pub theme_script: String,
    /// Theme the static markup assumes before any script runs
    pub initial_theme: Theme,
    pub date_format: String,
    /// Subscribe to the preview server's reload events
    pub preview: bool,
}

/// Title and route of a neighbouring post
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostLink {
    pub href: String,
    pub title: String,
}

impl From<&Post> for PostLink {
    fn from(post: &Post) -> Self {
        Self {
            href: route_href(post.path.as_str()),
            title: post.title.clone(),
        }
    }
}

const RELOAD_SCRIPT: &str = r#"const source = new EventSource('/_reload');
source.onmessage = () => location.reload();
source.onerror = () => source.close();"#;

/// Bytes that cannot appear raw in a URL path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-encode each segment of a route for use in an `href`
pub fn route_href(route: &str) -> String {
    route
        .split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn tag_href(tag: &str) -> String {
    format!("/tags/{}", utf8_percent_encode(tag, SEGMENT))
}

fn iso_date(date: NaiveDateTime) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[component]
pub fn SiteLayout(
    chrome: Chrome,
    route: String,
    title: String,
    description: Option<String>,
    children: Children,
) -> impl IntoView {
    let Chrome {
        site_title,
        site_url,
        description: site_description,
        nav,
        social,
        theme_script,
        initial_theme,
        preview,
        ..
    } = chrome;

    let page_title = format!("{} | {}", title, site_title);
    let canonical = site_url.map(|url| format!("{}{}", url, route_href(&route)));
    let description = description.or(site_description);
    let (toggle_icon, toggle_pressed) = match initial_theme {
        Theme::Dark => ("☀️", "true"),
        Theme::Light => ("🌙", "false"),
    };

    let nav_links = nav
        .into_iter()
        .map(|link| {
            let current = (link.path.as_str() == route).then_some("page");
            view! {
                <a href=route_href(link.path.as_str()) aria-current=current>
                    {link.name}
                </a>
            }
        })
        .collect_view();

    let social_links = social
        .into_iter()
        .map(|link| {
            let icon = link
                .icon
                .map(|src| view! { <img class="social-icon" src=src alt=""/> });
            view! {
                <li>
                    <a href=link.url rel="me noopener" target="_blank">
                        {icon}
                        <span>{link.name}</span>
                    </a>
                </li>
            }
        })
        .collect_view();

    view! {
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <title>{page_title}</title>
                {description.map(|content| view! { <meta name="description" content=content/> })}
                {canonical.map(|href| view! { <link rel="canonical" href=href/> })}
                <link rel="stylesheet" href="/style.css"/>
            </head>
            <body>
                <script inner_html=theme_script></script>
                <header class="site-header">
                    <a class="site-title" href="/">{site_title}</a>
                    <nav class="site-nav">{nav_links}</nav>
                    <button
                        type="button"
                        class="theme-toggle"
                        data-theme-toggle=""
                        aria-label="Toggle dark mode"
                        aria-pressed=toggle_pressed
                    >
                        {toggle_icon}
                    </button>
                </header>
                <main>{children()}</main>
                <footer class="site-footer">
                    <ul class="social-links">{social_links}</ul>
                </footer>
                <script src="/theme.js"></script>
                {preview.then(|| view! { <script inner_html=RELOAD_SCRIPT></script> })}
            </body>
        </html>
    }
}

/// Links to each tag's page
#[component]
pub fn TagLinks(tags: Vec<String>) -> impl IntoView {
    view! {
        <ul class="tags">
            {tags
                .into_iter()
                .map(|tag| {
                    let href = tag_href(&tag);
                    view! {
                        <li>
                            <a class="tag" href=href>{tag}</a>
                        </li>
                    }
                })
                .collect_view()}
        </ul>
    }
}

#[component]
pub fn PostDate(date: Option<NaiveDateTime>, date_format: String) -> impl IntoView {
    date.map(|date| {
        let label = format_date(Some(date), &date_format);
        view! { <time datetime=iso_date(date)>{label}</time> }
    })
}

/// Title, date and excerpt of a post, as listed on index pages
#[component]
pub fn PostPreview(post: Post, date_format: String) -> impl IntoView {
    view! {
        <article class="post-preview">
            <h2>
                <a href=route_href(post.path.as_str())>{post.title}</a>
            </h2>
            <PostDate date=post.date date_format=date_format/>
            <p class="excerpt">{post.excerpt}</p>
        </article>
    }
}

#[component]
pub fn BlogPostView(
    post: Post,
    prev: Option<PostLink>,
    next: Option<PostLink>,
    date_format: String,
) -> impl IntoView {
    let updated = post
        .date_updated
        .map(|date| format!("Updated {}", format_date(Some(date), &date_format)));
    let tags: Vec<String> = post.unique_tags().into_iter().map(String::from).collect();

    view! {
        <article class="post">
            <header class="post-header">
                <h1>{post.title}</h1>
                {post.description.map(|text| view! { <p class="post-description">{text}</p> })}
                <PostDate date=post.date date_format=date_format/>
                {updated.map(|text| view! { <p class="post-updated">{text}</p> })}
                <TagLinks tags=tags/>
            </header>
            <div class="post-body" inner_html=post.html></div>
            <nav class="post-nav">
                {prev
                    .map(|link| {
                        view! {
                            <a class="prev" href=link.href rel="prev" title=link.title>
                                "⬅ Previous post"
                            </a>
                        }
                    })}
                {next
                    .map(|link| {
                        view! {
                            <a class="next" href=link.href rel="next" title=link.title>
                                "Next post ➡"
                            </a>
                        }
                    })}
            </nav>
        </article>
    }
}

#[component]
pub fn TagListView(tags: Vec<String>) -> impl IntoView {
    view! {
        <section class="tag-list">
            <h1>"Tags"</h1>
            <TagLinks tags=tags/>
        </section>
    }
}

#[component]
pub fn TagView(name: String, posts: Vec<Post>, date_format: String) -> impl IntoView {
    let heading = format!("Browse by tag: {}", name);

    view! {
        <section class="tag-page">
            <h1>{heading}</h1>
            {posts
                .into_iter()
                .map(|post| view! { <PostPreview post=post date_format=date_format.clone()/> })
                .collect_view()}
            <a class="all-tags" href="/tags">"All tags"</a>
        </section>
    }
}

#[component]
pub fn BlogIndexView(posts: Vec<Post>, date_format: String) -> impl IntoView {
    view! {
        <section class="blog-index">
            <h1>"Blog"</h1>
            <a class="all-tags" href="/tags">"Browse by Tag"</a>
            {posts
                .into_iter()
                .map(|post| view! { <PostPreview post=post date_format=date_format.clone()/> })
                .collect_view()}
        </section>
    }
}

#[component]
pub fn ProjectCard(project: Project) -> impl IntoView {
    let image = project.image_link.map(|src| {
        let alt = project.name.clone();
        view! { <img class="project-image" src=src alt=alt/> }
    });
    let live = project
        .live_link
        .map(|href| view! { <a class="project-live" href=href>"Live"</a> });
    let github = project
        .github_link
        .map(|href| view! { <a class="project-github" href=href>"GitHub"</a> });

    view! {
        <article class="project-card" id=project.id>
            {image}
            <h2>{project.name}</h2>
            <p>{project.description}</p>
            <ul class="tags">
                {project
                    .tags
                    .into_iter()
                    .map(|tag| view! { <li class="tag">{tag}</li> })
                    .collect_view()}
            </ul>
            <div class="project-links">{live} {github}</div>
        </article>
    }
}

#[component]
pub fn ProjectsView(projects: Vec<Project>) -> impl IntoView {
    view! {
        <section class="projects">
            <h1>"Projects"</h1>
            <div class="project-grid">
                {projects
                    .into_iter()
                    .map(|project| view! { <ProjectCard project=project/> })
                    .collect_view()}
            </div>
        </section>
    }
}

#[component]
pub fn StandaloneView(page: Page) -> impl IntoView {
    view! {
        <article class="page">
            <h1>{page.title}</h1>
            <div class="page-body" inner_html=page.html></div>
        </article>
    }
}
