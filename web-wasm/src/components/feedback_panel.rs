//! 診断フィードバック（役に立ったか）

use crate::app::use_app;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[derive(Clone, Debug, PartialEq)]
enum FeedbackState {
    Idle,
    Sending,
    Sent,
    Failed(String),
}

#[component]
pub fn FeedbackPanel(diagnosis_id: String) -> impl IntoView {
    let app = use_app();
    let state = RwSignal::new(FeedbackState::Idle);
    let diagnosis_id = StoredValue::new(diagnosis_id);

    let send = move |helpful: bool| {
        if state.get_untracked() == FeedbackState::Sending {
            return;
        }
        state.set(FeedbackState::Sending);
        let client = app.client();
        let id = diagnosis_id.get_value();
        spawn_local(async move {
            match client.submit_feedback(&id, helpful, None).await {
                Ok(true) => state.set(FeedbackState::Sent),
                Ok(false) => state.set(FeedbackState::Failed(app.t("common.retry"))),
                Err(e) => state.set(FeedbackState::Failed(e.to_string())),
            }
        });
    };

    view! {
        <section class="card feedback">
            {move || match state.get() {
                FeedbackState::Sent => view! {
                    <p class="feedback-thanks">{app.t("result.thankYou")}</p>
                }
                .into_any(),
                current => {
                    let sending = current == FeedbackState::Sending;
                    let error = match current {
                        FeedbackState::Failed(message) => Some(message),
                        _ => None,
                    };
                    view! {
                        <p>{app.t("result.feedback")}</p>
                        <div class="feedback-actions">
                            <button class="btn btn-secondary" disabled=sending on:click=move |_| send(true)>
                                "👍 " {app.t("result.yes")}
                            </button>
                            <button class="btn btn-secondary" disabled=sending on:click=move |_| send(false)>
                                "👎 " {app.t("result.no")}
                            </button>
                        </div>
                        {error.map(|message| view! { <p class="text-error">{message}</p> })}
                    }
                    .into_any()
                }
            }}
        </section>
    }
}
