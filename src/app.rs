use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlInputElement;
use yew::platform::spawn_local;
use yew::prelude::*;

use crate::api::WebhookClient;
use crate::client_info::ClientInfo;
use crate::config::Config;
use crate::db::WebhookDb;
use crate::storage::{BrowserStorage, FallbackStore, LocalPersistence, MemoryStore};
use crate::types::{AudioClip, Category, ChatMessage, DEFAULT_AUDIO_MIME};

#[derive(Clone, PartialEq)]
pub enum SendState {
    Idle,
    Sending,
    Sent,
    Failed(String),
}

thread_local! {
    static SESSION_MEMORY: MemoryStore = MemoryStore::new();
}

/// Runs `f` against `localStorage`, or the session memory store when it is
/// disabled. Saves that only reach memory report `Unavailable`.
fn with_local<R>(f: impl FnOnce(&LocalPersistence<FallbackStore<'_, BrowserStorage>>) -> R) -> R {
    let primary = match BrowserStorage::local() {
        Ok(storage) => Some(storage),
        Err(e) => {
            tracing::warn!("Keeping data in memory for this session: {}", e);
            None
        }
    };
    SESSION_MEMORY.with(|memory| f(&LocalPersistence::new(FallbackStore::new(primary, memory))))
}

async fn read_audio(file: web_sys::File) -> Result<AudioClip, wasm_bindgen::JsValue> {
    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    let mime = file.type_();
    if mime.is_empty() {
        Ok(AudioClip::with_mime(bytes, DEFAULT_AUDIO_MIME))
    } else {
        Ok(AudioClip::with_mime(bytes, mime))
    }
}

#[function_component(App)]
pub fn app() -> Html {
    let webhook_url = use_state(String::new);
    let messages = use_state(Vec::<ChatMessage>::new);
    let categories = use_state(Vec::<Category>::new);
    let draft = use_state(String::new);
    let new_category = use_state(String::new);
    let audio = use_state(|| None::<web_sys::File>);
    let send_state = use_state(|| SendState::Idle);
    let settings_notice = use_state(|| None::<String>);

    // Restore settings and history on mount
    {
        let webhook_url = webhook_url.clone();
        let messages = messages.clone();
        let categories = categories.clone();
        use_effect_with((), move |_| {
            with_local(|local| {
                webhook_url.set(local.load_webhook_url());
                messages.set(local.load_messages());
                categories.set(local.load_categories());
            });
            || ()
        });
    }

    let on_url_input = {
        let webhook_url = webhook_url.clone();
        Callback::from(move |event: InputEvent| {
            let target = event.target_unchecked_into::<HtmlInputElement>();
            webhook_url.set(target.value());
        })
    };

    let on_save_url = {
        let webhook_url = webhook_url.clone();
        let settings_notice = settings_notice.clone();
        Callback::from(move |_| {
            let url = (*webhook_url).clone();
            let stored = with_local(|local| local.save_webhook_url(&url).is_stored());
            let settings_notice = settings_notice.clone();
            spawn_local(async move {
                let notice = match WebhookDb::new().save(&url).await {
                    Ok(()) if stored => "Webhook URL saved.".to_string(),
                    Ok(()) => "Saved to the database only; local storage is unavailable.".to_string(),
                    Err(e) => e.to_string(),
                };
                settings_notice.set(Some(notice));
            });
        })
    };

    let on_draft_input = {
        let draft = draft.clone();
        Callback::from(move |event: InputEvent| {
            let target = event.target_unchecked_into::<HtmlInputElement>();
            draft.set(target.value());
        })
    };

    let on_audio_change = {
        let audio = audio.clone();
        Callback::from(move |event: Event| {
            let target = event.target_unchecked_into::<HtmlInputElement>();
            audio.set(target.files().and_then(|list| list.get(0)));
        })
    };

    let on_send = {
        let webhook_url = webhook_url.clone();
        let messages = messages.clone();
        let draft = draft.clone();
        let audio = audio.clone();
        let send_state = send_state.clone();
        Callback::from(move |_| {
            let url = (*webhook_url).clone();
            let text = (*draft).clone();
            let audio_file = (*audio).clone();
            let messages = messages.clone();
            let draft = draft.clone();
            let audio = audio.clone();
            let send_state = send_state.clone();

            if text.trim().is_empty() && audio_file.is_none() {
                return;
            }
            send_state.set(SendState::Sending);

            spawn_local(async move {
                let mut message = ChatMessage::new(text, &ClientInfo::current());
                if let Some(file) = audio_file {
                    match read_audio(file).await {
                        Ok(clip) => message = message.with_audio(clip),
                        Err(e) => {
                            tracing::error!("Failed to read audio file: {:?}", e);
                            send_state.set(SendState::Failed("Could not read the audio file.".to_string()));
                            return;
                        }
                    }
                }

                match WebhookClient::new(&Config::default()).send(&url, &message).await {
                    Ok(_) => {
                        let mut history = (*messages).clone();
                        history.push(message);
                        with_local(|local| local.save_messages(&history));
                        messages.set(history);
                        draft.set(String::new());
                        audio.set(None);
                        send_state.set(SendState::Sent);
                    }
                    Err(e) => send_state.set(SendState::Failed(e.to_string())),
                }
            });
        })
    };

    let on_category_input = {
        let new_category = new_category.clone();
        Callback::from(move |event: InputEvent| {
            let target = event.target_unchecked_into::<HtmlInputElement>();
            new_category.set(target.value());
        })
    };

    let on_add_category = {
        let new_category = new_category.clone();
        let categories = categories.clone();
        Callback::from(move |_| {
            let label = new_category.trim().to_string();
            if label.is_empty() {
                return;
            }
            let updated = with_local(|local| {
                local.add_category(&label);
                local.load_categories()
            });
            categories.set(updated);
            new_category.set(String::new());
        })
    };

    let sending = matches!(*send_state, SendState::Sending);

    html! {
        <div style="display:flex; flex-direction:row; height:100vh; font-family:Arial,sans-serif;">
            <div style="width:320px; min-width:280px; padding:1.5em; background:#f8f9fa; border-right:1px solid #ddd; display:flex; flex-direction:column; gap:1em;">
                <h1 style="margin:0 0 0.5em 0; color:#333;">{ "Webhook Bot" }</h1>

                <label style="font-weight:bold; color:#555;">{ "Webhook URL:" }</label>
                <input type="url" value={(*webhook_url).clone()} oninput={on_url_input}
                    placeholder="https://example.com/webhook"
                    style="width:100%; padding:0.5em; border:1px solid #ccc; border-radius:4px;" />
                <button onclick={on_save_url} style="padding:0.5em 0;">{ "Save" }</button>
                { for (*settings_notice).as_ref().map(|notice| html! {
                    <div style="color:#555; font-size:0.9em;">{ notice }</div>
                })}

                <label style="font-weight:bold; color:#555; margin-top:1em;">{ "Categories:" }</label>
                <ul style="margin:0; padding-left:1.2em;">
                    { for categories.iter().map(|category| html! { <li>{ category }</li> }) }
                </ul>
                <div style="display:flex; gap:0.5em;">
                    <input type="text" value={(*new_category).clone()} oninput={on_category_input}
                        style="flex:1; padding:0.5em; border:1px solid #ccc; border-radius:4px;" />
                    <button onclick={on_add_category}>{ "Add" }</button>
                </div>
            </div>

            <div style="flex:1; display:flex; flex-direction:column; padding:1em; gap:1em;">
                <div style="flex:1; overflow-y:auto; display:flex; flex-direction:column; gap:0.5em;">
                    { for messages.iter().map(|message| html! {
                        <div style="align-self:flex-end; max-width:70%; padding:0.6em 0.9em; background:#007bff; color:white; border-radius:8px;">
                            <div>{ &message.text }</div>
                            <div style="font-size:0.75em; opacity:0.8;">
                                { &message.timestamp }
                                { if message.audio_attached { " · audio" } else { "" } }
                            </div>
                        </div>
                    })}
                </div>

                { match &*send_state {
                    SendState::Failed(msg) => html! {
                        <div style="padding:0.8em; background:#f8d7da; border:1px solid #f5c6cb; border-radius:4px; color:#721c24;">
                            { msg }
                        </div>
                    },
                    _ => html! {}
                }}

                <div style="display:flex; gap:0.5em; align-items:center;">
                    <input type="text" value={(*draft).clone()} oninput={on_draft_input}
                        placeholder="Type a message..."
                        style="flex:1; padding:0.6em; border:1px solid #ccc; border-radius:4px;" />
                    <input type="file" accept="audio/*" onchange={on_audio_change} />
                    <button onclick={on_send} disabled={sending}
                        style={if sending { "padding:0.6em 1.2em; background:#ccc; cursor:not-allowed;" } else { "padding:0.6em 1.2em; background:#007bff; color:white; cursor:pointer;" }}>
                        { if sending { "Sending..." } else { "Send" } }
                    </button>
                </div>
            </div>
        </div>
    }
}
