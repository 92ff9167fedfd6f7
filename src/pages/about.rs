use std::rc::Rc;

use log::error;
use yew::prelude::*;
use yew_router::components::Link;

use crate::config::TrackerConfig;
use crate::content::{AboutContent, ContentItem, Layout, Prose, Section};
use crate::viewport::hook::use_viewport;
use crate::viewport::tracker::ViewportState;
use crate::Route;

pub const REVEAL_ACTIVE: &str = "reveal-active";
pub const REVEAL_PENDING: &str = "reveal";

pub fn reveal_class(visible: bool) -> &'static str {
    if visible {
        REVEAL_ACTIVE
    } else {
        REVEAL_PENDING
    }
}

fn container_class(layout: Layout) -> Option<&'static str> {
    match layout {
        Layout::Steps => Some("workflow"),
        Layout::Cards => Some("benefits-grid"),
        Layout::Stacked => None,
        Layout::List => Some("features-list"),
    }
}

fn item_class(layout: Layout) -> &'static str {
    match layout {
        Layout::Steps => "step",
        Layout::Cards => "benefit-card",
        Layout::Stacked => "use-case",
        Layout::List => "feature",
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ItemView<'a> {
    pub class: &'static str,
    /// Only set for numbered layouts; counts from 1.
    pub number: Option<usize>,
    pub title: &'a str,
    pub description: Option<&'a str>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SectionView<'a> {
    pub id: &'a str,
    pub class: &'static str,
    pub heading: &'a str,
    pub intro: Option<&'a str>,
    pub container: Option<&'static str>,
    pub items: Vec<ItemView<'a>>,
    pub outro: Option<&'a str>,
}

fn item_view(layout: Layout, position: usize, item: &ContentItem) -> ItemView<'_> {
    ItemView {
        class: item_class(layout),
        number: (layout == Layout::Steps).then_some(position + 1),
        title: &item.title,
        description: item.description.as_deref(),
    }
}

fn section_view<'a>(section: &'a Section, state: &ViewportState) -> SectionView<'a> {
    SectionView {
        id: &section.id,
        class: reveal_class(state.is_visible(&section.id)),
        heading: &section.heading,
        intro: section.intro.as_deref(),
        container: container_class(section.layout),
        items: section
            .items
            .iter()
            .enumerate()
            .map(|(position, item)| item_view(section.layout, position, item))
            .collect(),
        outro: section.outro.as_deref(),
    }
}

/// Maps the static sections and the current viewport state to what gets drawn.
pub fn section_views<'a>(content: &'a AboutContent, state: &ViewportState) -> Vec<SectionView<'a>> {
    content
        .sections
        .iter()
        .map(|section| section_view(section, state))
        .collect()
}

fn render_item(item: &ItemView) -> Html {
    html! {
        <div class={item.class}>
            {
                match item.number {
                    Some(number) => html! { <div class="step-number">{number.to_string()}</div> },
                    None => html! {},
                }
            }
            <h3>{item.title}</h3>
            {
                match item.description {
                    Some(description) => html! { <p>{description}</p> },
                    None => html! {},
                }
            }
        </div>
    }
}

fn render_section(view: &SectionView) -> Html {
    let items: Html = view.items.iter().map(render_item).collect();

    let body = match view.container {
        Some(container) => html! { <div class={container}>{items}</div> },
        None => items,
    };

    html! {
        <section data-section={view.id.to_string()} class={view.class}>
            <h2>{view.heading}</h2>
            {
                match view.intro {
                    Some(intro) => html! { <p class="section-intro">{intro}</p> },
                    None => html! {},
                }
            }
            {body}
            {
                match view.outro {
                    Some(outro) => html! { <p class="workflow-desc">{outro}</p> },
                    None => html! {},
                }
            }
        </section>
    }
}

fn render_prose(prose: &Prose) -> Html {
    html! {
        <section class={prose.class.clone()}>
            <h2>{prose.heading.as_str()}</h2>
            { for prose.paragraphs.iter().map(|p| html! { <p>{p.as_str()}</p> }) }
        </section>
    }
}

fn render_hero(content: &AboutContent) -> Html {
    let hero = &content.hero;
    let mut paragraphs = hero.paragraphs.iter();
    let lead = paragraphs.next();

    // Observed like the tracked sections, but never animated.
    html! {
        <section data-section={hero.id.clone()} class="hero-main">
            <h2 class="hero-subtitle">{hero.heading.as_str()}</h2>
            {
                match lead {
                    Some(lead) => html! { <p class="lead">{lead.as_str()}</p> },
                    None => html! {},
                }
            }
            { for paragraphs.map(|p| html! { <p>{p.as_str()}</p> }) }
            <div class="trust-badges">
                { for hero.badges.iter().map(|badge| html! { <div class="badge">{badge.as_str()}</div> }) }
            </div>
        </section>
    }
}

#[function_component(AboutPage)]
pub fn about_page() -> Html {
    let content = use_context::<Rc<AboutContent>>();
    let viewport = use_viewport(TrackerConfig::default());

    let Some(content) = content else {
        error!("About page rendered without content");
        return html! {};
    };

    let views = section_views(&content, &viewport);

    html! {
        <div class="about-page fade-in">
            <nav class={classes!("top-nav", viewport.scrolled().then(|| "scrolled"))}>
                <div class="nav-content">
                    <Link<Route> to={Route::Home} classes="nav-logo">
                        {content.title.as_str()}
                    </Link<Route>>
                </div>
            </nav>
            <div class="container">
                <h1 class="gradient-title">{content.title.as_str()}</h1>
                <p class="tagline">{content.tagline.as_str()}</p>

                { render_hero(&content) }

                <main>
                    { for views.iter().map(render_section) }
                    { for content.closing.iter().map(render_prose) }
                </main>

                <footer class="copyright subtle-footer">{content.footer.as_str()}</footer>
            </div>
            <style>
                {r#"
                .about-page {
                    min-height: 100vh;
                    color: #2b1d14;
                    background: linear-gradient(180deg, #fbf6f0 0%, #f3e7da 100%);
                    padding-top: 74px;
                }
                .fade-in {
                    animation: fadeIn 0.6s ease-out;
                }
                @keyframes fadeIn {
                    from { opacity: 0; }
                    to { opacity: 1; }
                }
                .top-nav {
                    position: fixed;
                    top: 0;
                    left: 0;
                    width: 100%;
                    z-index: 10;
                    padding: 1.25rem 0;
                    background: transparent;
                    transition: background 0.3s ease, padding 0.3s ease, box-shadow 0.3s ease;
                }
                .top-nav.scrolled {
                    padding: 0.6rem 0;
                    background: rgba(251, 246, 240, 0.95);
                    backdrop-filter: blur(8px);
                    box-shadow: 0 2px 12px rgba(43, 29, 20, 0.08);
                }
                .nav-content {
                    max-width: 1100px;
                    margin: 0 auto;
                    padding: 0 1.5rem;
                }
                .nav-logo {
                    font-weight: 700;
                    font-size: 1.2rem;
                    color: #6b3e26;
                    text-decoration: none;
                }
                .container {
                    max-width: 1100px;
                    margin: 0 auto;
                    padding: 2rem 1.5rem 4rem;
                }
                .gradient-title {
                    font-size: 3rem;
                    margin-bottom: 0.25rem;
                    background: linear-gradient(90deg, #6b3e26, #c27c4e);
                    -webkit-background-clip: text;
                    background-clip: text;
                    color: transparent;
                }
                .tagline {
                    font-size: 1.15rem;
                    opacity: 0.8;
                    margin-bottom: 2rem;
                }
                .hero-main {
                    background: #ffffff;
                    border-radius: 16px;
                    padding: 2rem;
                    box-shadow: 0 8px 24px rgba(43, 29, 20, 0.08);
                    margin-bottom: 3rem;
                }
                .lead {
                    font-size: 1.1rem;
                }
                .trust-badges {
                    display: flex;
                    flex-wrap: wrap;
                    gap: 0.75rem;
                    margin-top: 1.5rem;
                }
                .badge {
                    padding: 0.4rem 0.9rem;
                    border-radius: 999px;
                    background: #f3e7da;
                    font-size: 0.9rem;
                }
                main section {
                    margin-bottom: 3.5rem;
                }
                .reveal {
                    opacity: 0;
                    transform: translateY(24px);
                    transition: opacity 0.7s ease, transform 0.7s ease;
                }
                .reveal-active {
                    opacity: 1;
                    transform: translateY(0);
                    transition: opacity 0.7s ease, transform 0.7s ease;
                }
                .workflow {
                    display: grid;
                    grid-template-columns: repeat(4, 1fr);
                    gap: 1rem;
                }
                .step {
                    text-align: center;
                    padding: 1.25rem;
                    border-radius: 12px;
                    background: #ffffff;
                }
                .step-number {
                    width: 2.5rem;
                    height: 2.5rem;
                    margin: 0 auto 0.5rem;
                    border-radius: 50%;
                    display: flex;
                    align-items: center;
                    justify-content: center;
                    background: #6b3e26;
                    color: #ffffff;
                    font-weight: 700;
                }
                .benefits-grid {
                    display: grid;
                    grid-template-columns: repeat(auto-fit, minmax(240px, 1fr));
                    gap: 1rem;
                }
                .benefit-card, .use-case, .feature {
                    background: #ffffff;
                    border-radius: 12px;
                    padding: 1.25rem;
                    margin-bottom: 1rem;
                }
                .features-list {
                    display: flex;
                    flex-direction: column;
                }
                .subtle-footer {
                    margin-top: 3rem;
                    text-align: center;
                    font-size: 0.85rem;
                    opacity: 0.6;
                }
                @media (max-width: 768px) {
                    .workflow {
                        grid-template-columns: repeat(2, 1fr);
                    }
                    .gradient-title {
                        font-size: 2.2rem;
                    }
                }
                "#}
            </style>
        </div>
    }
}
