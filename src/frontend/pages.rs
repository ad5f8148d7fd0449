use std::rc::Rc;
use yew::prelude::*;
use yew_router::prelude::*;

use super::components::{Media, PreviewCard, ProjectPreviewCard};
use super::Route;
use crate::catalog::Catalog;

#[derive(Properties, PartialEq)]
pub struct PageProps {
    pub catalog: Rc<Catalog>,
}

fn bio_paragraphs(catalog: &Catalog) -> Html {
    catalog
        .bio
        .iter()
        .map(|paragraph| html! { <p class="bio">{paragraph.clone()}</p> })
        .collect()
}

#[function_component(HomePage)]
pub fn home_page(props: &PageProps) -> Html {
    html! {
        <section aria-labelledby="home-heading" class="section-block">
            <h1 id="home-heading" class="page-title">{"Welcome!"}</h1>
            <div class="panel">{bio_paragraphs(&props.catalog)}</div>
            <p class="page-links">
                <Link<Route> to={Route::Scripts} classes="link">{"Browse scripts"}</Link<Route>>
                {" · "}
                <Link<Route> to={Route::Animations} classes="link">{"Watch animations"}</Link<Route>>
            </p>
        </section>
    }
}

#[function_component(ScriptsPage)]
pub fn scripts_page(props: &PageProps) -> Html {
    html! {
        <section aria-labelledby="scripts-heading" class="section-block">
            <h1 id="scripts-heading" class="page-title">{"Scripts"}</h1>
            <p class="page-lede">{"These are some scripts I've made, feel free to look at the code!"}</p>
            { for props.catalog.scripts.iter().map(|script| html! {
                <PreviewCard key={script.name.clone()} script={script.clone()} />
            }) }
        </section>
    }
}

#[function_component(ProjectsPage)]
pub fn projects_page(props: &PageProps) -> Html {
    html! {
        <section aria-labelledby="projects-heading" class="section-block">
            <h1 id="projects-heading" class="page-title">{"Projects"}</h1>
            { for props.catalog.projects.iter().map(|project| html! {
                <ProjectPreviewCard key={project.name.clone()} project={project.clone()} />
            }) }
        </section>
    }
}

#[function_component(AnimationsPage)]
pub fn animations_page(props: &PageProps) -> Html {
    html! {
        <section aria-labelledby="animations-heading" class="section-block">
            <h1 id="animations-heading" class="page-title">{"Animations"}</h1>
            <p class="page-lede">{props.catalog.animation_intro.clone()}</p>
            <div class="media-grid">
                { for props.catalog.animations.iter().map(|clip| html! {
                    <Media
                        key={clip.media.clone()}
                        src={clip.media_url()}
                        alt={clip.caption.clone()}
                        class="grid-media"
                        caption={AttrValue::from(clip.caption.clone())}
                    />
                }) }
            </div>
        </section>
    }
}

#[function_component(AboutPage)]
pub fn about_page(props: &PageProps) -> Html {
    html! {
        <section aria-labelledby="about-heading" class="section-block about">
            <h1 id="about-heading" class="sr-only">{format!("About {}", props.catalog.owner)}</h1>
            <div class="panel panel-large">{bio_paragraphs(&props.catalog)}</div>
        </section>
    }
}

#[function_component(NotFoundPage)]
pub fn not_found_page() -> Html {
    html! {
        <section class="section-block">
            <h1 class="page-title">{"Page not found"}</h1>
            <p>
                <Link<Route> to={Route::Home} classes="link">{"Back home"}</Link<Route>>
            </p>
        </section>
    }
}
