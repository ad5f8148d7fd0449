mod components;
mod pages;

use std::rc::Rc;
use wasm_bindgen::JsValue;
use web_sys::{console, window, Storage};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::catalog::{self, Catalog};
use crate::telemetry::{event_record, LogLevel};

use pages::{AboutPage, AnimationsPage, HomePage, NotFoundPage, ProjectsPage, ScriptsPage};

const LOG_LEVEL_KEY: &str = "portfolio-log-level";
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

thread_local! {
    static LOG_THRESHOLD: LogLevel = read_stored_log_level().unwrap_or(DEFAULT_LOG_LEVEL);
}

fn local_storage() -> Option<Storage> {
    window()?.local_storage().ok().flatten()
}

fn read_stored_log_level() -> Option<LogLevel> {
    let value = local_storage()?.get_item(LOG_LEVEL_KEY).ok().flatten()?;
    LogLevel::parse(&value)
}

pub(crate) fn log_event(level: LogLevel, event: &str, fields: serde_json::Value) {
    if level < LOG_THRESHOLD.with(|threshold| *threshold) {
        return;
    }

    let line = JsValue::from_str(&event_record(level, event, fields).to_string());
    match level {
        LogLevel::Error => console::error_1(&line),
        LogLevel::Warn => console::warn_1(&line),
        LogLevel::Debug | LogLevel::Info => console::log_1(&line),
    }
}

fn prefers_reduced_motion() -> bool {
    window()
        .and_then(|w| {
            w.match_media("(prefers-reduced-motion: reduce)")
                .ok()
                .flatten()
        })
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

#[derive(Clone, Routable, PartialEq)]
enum Route {
    #[at("/")]
    Home,
    #[at("/scripts")]
    Scripts,
    #[at("/projects")]
    Projects,
    #[at("/animations")]
    Animations,
    #[at("/about")]
    About,
    #[not_found]
    #[at("/404")]
    NotFound,
}

impl Route {
    const NAV: [(Route, &'static str); 5] = [
        (Route::Home, "Home"),
        (Route::Scripts, "Scripts"),
        (Route::Projects, "Projects"),
        (Route::Animations, "Animations"),
        (Route::About, "About"),
    ];
}

fn switch(route: Route, catalog: &Rc<Catalog>) -> Html {
    let page = match route {
        Route::Home => html! { <HomePage catalog={catalog.clone()} /> },
        Route::Scripts => html! { <ScriptsPage catalog={catalog.clone()} /> },
        Route::Projects => html! { <ProjectsPage catalog={catalog.clone()} /> },
        Route::Animations => html! { <AnimationsPage catalog={catalog.clone()} /> },
        Route::About => html! { <AboutPage catalog={catalog.clone()} /> },
        Route::NotFound => html! { <NotFoundPage /> },
    };

    // Re-keying the wrapper restarts the enter animation on every navigation.
    html! {
        <div
            key={route.to_path()}
            class={classes!("page", (!prefers_reduced_motion()).then_some("page-enter"))}
        >
            {page}
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct NavBarProps {
    source_url: AttrValue,
}

#[function_component(NavBar)]
fn nav_bar(props: &NavBarProps) -> Html {
    let current = use_route::<Route>();

    html! {
        <nav class="site-nav" aria-label="Primary">
            { for Route::NAV.into_iter().map(|(route, label)| {
                let active = current.as_ref() == Some(&route);
                html! {
                    <Link<Route>
                        to={route}
                        classes={classes!("nav-link", active.then_some("is-active"))}
                    >
                        {label}
                    </Link<Route>>
                }
            }) }
            <a
                class="nav-link"
                href={props.source_url.clone()}
                target="_blank"
                rel="noopener noreferrer"
            >
                {"Source"}
            </a>
        </nav>
    }
}

#[derive(Properties, PartialEq)]
struct AppProps {
    catalog: Rc<Catalog>,
}

#[function_component(App)]
fn app(props: &AppProps) -> Html {
    let catalog = props.catalog.clone();
    let render = move |route: Route| switch(route, &catalog);

    html! {
        <HashRouter>
            <a class="skip-link" href="#content">{"Skip to main content"}</a>
            <div class="page-shell">
                <NavBar source_url={props.catalog.source_url.clone()} />
                <main id="content">
                    <Switch<Route> render={render} />
                </main>
                <footer class="site-footer">
                    {format!("© {}", props.catalog.owner)}
                </footer>
            </div>
        </HashRouter>
    }
}

#[derive(Properties, PartialEq)]
struct ConfigurationErrorProps {
    message: AttrValue,
}

/// Shown instead of the app when the embedded catalog does not validate.
#[function_component(ConfigurationError)]
fn configuration_error(props: &ConfigurationErrorProps) -> Html {
    html! {
        <main class="config-error" role="alert">
            <h1>{"This portfolio is misconfigured"}</h1>
            <p>{props.message.clone()}</p>
        </main>
    }
}

pub fn run() {
    let root = window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("app"))
        .expect("missing #app mount point");

    match catalog::load() {
        Ok(catalog) => {
            log_event(
                LogLevel::Debug,
                "catalog_loaded",
                serde_json::json!({
                    "scripts": catalog.scripts.len(),
                    "projects": catalog.projects.len(),
                    "animations": catalog.animations.len(),
                }),
            );
            yew::Renderer::<App>::with_root_and_props(
                root,
                AppProps {
                    catalog: Rc::new(catalog),
                },
            )
            .render();
        }
        Err(error) => {
            let message = error.to_string();
            log_event(
                LogLevel::Error,
                "catalog_invalid",
                serde_json::json!({ "error": message.as_str() }),
            );
            yew::Renderer::<ConfigurationError>::with_root_and_props(
                root,
                ConfigurationErrorProps {
                    message: AttrValue::from(message),
                },
            )
            .render();
        }
    }
}
