use std::rc::Rc;
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::{window, HtmlMediaElement, KeyboardEvent, MouseEvent, Window};
use yew::prelude::*;

use super::log_event;
use crate::catalog::{ProjectPreview, ScriptPreview};
use crate::fetch::{fetch_script, FetchError, FetchState};
use crate::highlight::{highlight, TokenKind};
use crate::media::{classify, unsupported_message, MediaKind};
use crate::scroll_lock::lock_body_scroll_while;
use crate::telemetry::LogLevel;
use crate::viewer::{FetchTicket, Resolution, ScriptFileSet, ScriptViewer};

#[derive(Properties, PartialEq)]
pub struct MediaProps {
    pub src: AttrValue,
    #[prop_or_default]
    pub alt: AttrValue,
    #[prop_or_default]
    pub class: Classes,
    #[prop_or_default]
    pub caption: Option<AttrValue>,
}

#[function_component(Media)]
pub fn media(props: &MediaProps) -> Html {
    let video_ref = use_node_ref();

    // The `muted` attribute is not reflected onto elements created from script;
    // browsers only allow the autoplay once the property itself is set.
    {
        let video_ref = video_ref.clone();
        use_effect_with(props.src.clone(), move |_| {
            if let Some(video) = video_ref.cast::<HtmlMediaElement>() {
                video.set_muted(true);
                let _ = video.play();
            }
            || ()
        });
    }

    let element = match classify(&props.src) {
        Some(MediaKind::Video) => html! {
            <video
                ref={video_ref}
                src={props.src.clone()}
                class={classes!("media", "media-video", props.class.clone())}
                controls={true}
                autoplay={true}
                muted={true}
                loop={true}
                playsinline={true}
            />
        },
        Some(MediaKind::Image) => html! {
            <img
                src={props.src.clone()}
                alt={props.alt.clone()}
                class={classes!("media", "media-image", props.class.clone())}
                loading="lazy"
            />
        },
        None => html! {
            <p class="media-error" role="alert">{unsupported_message(&props.src)}</p>
        },
    };

    match props.caption.clone() {
        Some(caption) => html! {
            <figure class="media-figure">
                {element}
                <figcaption>{caption}</figcaption>
            </figure>
        },
        None => element,
    }
}

pub enum ViewerAction {
    Open,
    Close,
    Select(String),
    Retry,
    Resolve(FetchTicket, Result<String, FetchError>),
}

impl Reducible for ScriptViewer {
    type Action = ViewerAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();

        let changed = match action {
            ViewerAction::Open => next.open().is_some(),
            ViewerAction::Close => {
                let was_open = next.is_open();
                next.close();
                was_open
            }
            ViewerAction::Select(filename) => next.select(&filename).is_some(),
            ViewerAction::Retry => next.retry().is_some(),
            ViewerAction::Resolve(ticket, outcome) => {
                let error_class = outcome.as_ref().err().map(FetchError::class);
                match next.resolve(&ticket, outcome) {
                    Resolution::Applied => {
                        log_resolution(&ticket, error_class);
                        true
                    }
                    Resolution::Discarded => {
                        log_event(
                            LogLevel::Debug,
                            "script_fetch_discarded",
                            serde_json::json!({
                                "filename": ticket.filename.as_str(),
                                "generation": ticket.generation,
                            }),
                        );
                        false
                    }
                }
            }
        };

        if changed {
            Rc::new(next)
        } else {
            self
        }
    }
}

fn log_resolution(ticket: &FetchTicket, error_class: Option<&'static str>) {
    match error_class {
        None => log_event(
            LogLevel::Info,
            "script_fetch_complete",
            serde_json::json!({
                "filename": ticket.filename.as_str(),
                "generation": ticket.generation,
            }),
        ),
        Some(error_class) => log_event(
            LogLevel::Warn,
            "script_fetch_failed",
            serde_json::json!({
                "filename": ticket.filename.as_str(),
                "url": ticket.url.as_str(),
                "generation": ticket.generation,
                "error_class": error_class,
            }),
        ),
    }
}

type EscapeListener = (Window, Closure<dyn FnMut(KeyboardEvent)>);

fn listen_for_escape(on_escape: Callback<()>) -> Option<EscapeListener> {
    let window = window()?;
    let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
        if event.key() == "Escape" {
            on_escape.emit(());
        }
    });

    window
        .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())
        .ok()?;
    Some((window, closure))
}

#[derive(Properties, PartialEq)]
pub struct CodeBlockProps {
    pub source: AttrValue,
}

#[function_component(CodeBlock)]
pub fn code_block(props: &CodeBlockProps) -> Html {
    let spans = use_memo(props.source.clone(), |source| highlight(source));
    let source = props.source.as_str();

    html! {
        <pre class="code-block" data-language="luau">
            <code>
                { for spans.iter().map(|span| {
                    let text = source[span.range.clone()].to_string();
                    match span.kind {
                        TokenKind::Plain => html! { {text} },
                        kind => html! { <span class={kind.css_class()}>{text}</span> },
                    }
                }) }
            </code>
        </pre>
    }
}

#[derive(Properties, PartialEq)]
pub struct ScriptViewerModalProps {
    pub base_path: AttrValue,
    pub files: ScriptFileSet,
    #[prop_or(AttrValue::from("Show Code"))]
    pub label: AttrValue,
}

#[function_component(ScriptViewerModal)]
pub fn script_viewer_modal(props: &ScriptViewerModalProps) -> Html {
    let viewer = {
        let base_path = props.base_path.to_string();
        let files = props.files.clone();
        use_reducer(move || ScriptViewer::new(base_path, files))
    };

    {
        let dispatcher = viewer.dispatcher();
        use_effect_with(viewer.pending().cloned(), move |pending| {
            if let Some(ticket) = pending.clone() {
                log_event(
                    LogLevel::Info,
                    "script_fetch_start",
                    serde_json::json!({
                        "filename": ticket.filename.as_str(),
                        "url": ticket.url.as_str(),
                        "generation": ticket.generation,
                    }),
                );
                spawn_local(async move {
                    let outcome = fetch_script(&ticket.url, &ticket.filename).await;
                    dispatcher.dispatch(ViewerAction::Resolve(ticket, outcome));
                });
            }
            || ()
        });
    }

    // The guard lives exactly as long as the open state, and unmounting runs
    // the cleanup too.
    use_effect_with(viewer.is_open(), |open| {
        let guard = lock_body_scroll_while(*open);
        move || drop(guard)
    });

    let on_close = {
        let dispatcher = viewer.dispatcher();
        Callback::from(move |_: ()| dispatcher.dispatch(ViewerAction::Close))
    };

    {
        let on_close = on_close.clone();
        use_effect_with(viewer.is_open(), move |open| {
            let listener = if *open { listen_for_escape(on_close) } else { None };
            move || {
                if let Some((window, closure)) = listener {
                    let _ = window
                        .remove_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
                }
            }
        });
    }

    let on_open = {
        let dispatcher = viewer.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(ViewerAction::Open))
    };

    let on_retry = {
        let dispatcher = viewer.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(ViewerAction::Retry))
    };

    let trigger = html! {
        <button class="show-code" type="button" onclick={on_open}>{props.label.clone()}</button>
    };

    if !viewer.is_open() {
        return html! { <div class="script-viewer">{trigger}</div> };
    }

    let tabs = viewer.files().iter().map(|file| {
        let active = file == viewer.active_file();
        let onclick = {
            let dispatcher = viewer.dispatcher();
            let file = file.to_string();
            Callback::from(move |_: MouseEvent| dispatcher.dispatch(ViewerAction::Select(file.clone())))
        };

        html! {
            <button
                key={file.to_string()}
                type="button"
                role="tab"
                aria-selected={active.to_string()}
                class={classes!("code-tab", active.then_some("is-active"))}
                onclick={onclick}
            >
                {file.to_string()}
            </button>
        }
    });

    let body = match viewer.fetch_state() {
        FetchState::Idle | FetchState::Loading => html! {
            <p class="code-status" aria-live="polite">{"Loading code..."}</p>
        },
        FetchState::Failed(message) => html! {
            <div class="code-error" role="alert">
                <p>{format!("Error: {message}")}</p>
                <button type="button" class="code-retry" onclick={on_retry}>{"Retry"}</button>
            </div>
        },
        FetchState::Loaded(content) => html! {
            <CodeBlock source={AttrValue::from(content.clone())} />
        },
    };

    let on_backdrop = on_close.reform(|_: MouseEvent| ());
    let keep_open = Callback::from(|event: MouseEvent| event.stop_propagation());

    html! {
        <div class="script-viewer">
            {trigger}
            <div class="modal-backdrop" onclick={on_backdrop}>
                <div
                    class="modal-window"
                    role="dialog"
                    aria-modal="true"
                    aria-label="Script viewer"
                    onclick={keep_open}
                >
                    <div class="modal-header">
                        <div class="code-tabs" role="tablist">
                            { for tabs }
                        </div>
                        <button
                            type="button"
                            class="modal-close"
                            aria-label="Close"
                            onclick={on_close.reform(|_: MouseEvent| ())}
                        >
                            {"×"}
                        </button>
                    </div>
                    {body}
                </div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct PreviewCardProps {
    pub script: ScriptPreview,
}

#[function_component(PreviewCard)]
pub fn preview_card(props: &PreviewCardProps) -> Html {
    let script = &props.script;

    html! {
        <article class="card preview-card">
            <h3 class="card-title">{script.name.clone()}</h3>
            <Media
                src={script.media_url()}
                alt={script.name.clone()}
                class="card-media"
            />
            <p class="card-description">{script.description.clone()}</p>
            <ScriptViewerModal
                base_path={script.code_base_path()}
                files={script.files.clone()}
            />
        </article>
    }
}

#[derive(Properties, PartialEq)]
pub struct ProjectPreviewCardProps {
    pub project: ProjectPreview,
}

#[function_component(ProjectPreviewCard)]
pub fn project_preview_card(props: &ProjectPreviewCardProps) -> Html {
    let project = &props.project;

    html! {
        <article class="card project-card">
            <Media
                src={project.media_url()}
                alt={project.name.clone()}
                class="card-media card-media-wide"
            />
            <div class="project-copy">
                <h3 class="card-title">{project.name.clone()}</h3>
                <p class="card-description">{project.description.clone()}</p>
            </div>
        </article>
    }
}
