//! 画像アップロード・診断ページ

use crate::app::{use_app, Page};
use crate::components::loader::{ErrorMessage, Loader};
use crate::components::upload_area::UploadArea;
use farmaid_common::{ApiError, ImageSource, PredictRequest};
use leptos::prelude::*;
use leptos::task::spawn_local;

#[component]
pub fn UploadPage() -> impl IntoView {
    let app = use_app();
    let file_name = RwSignal::new(None::<String>);

    let preview = move || app.store.with(|s| s.state().uploaded_image().map(str::to_string));
    let is_loading = Signal::derive(move || app.store.with(|s| s.state().is_loading()));
    let error = move || app.store.with(|s| s.state().error().map(str::to_string));

    let on_image = move |name: String, data_url: String| {
        file_name.set(Some(name));
        app.store.update(|s| {
            s.set_error(None);
            s.clear_diagnosis_result();
            s.set_uploaded_image(data_url);
        });
    };

    let on_invalid = move || {
        let message = app.t("upload.invalidFile");
        app.store.update(|s| s.set_error(Some(message)));
    };

    let on_remove = move |_| {
        file_name.set(None);
        app.store.update(|s| {
            s.clear_uploaded_image();
            s.set_error(None);
        });
    };

    let analyze = move |_| {
        if is_loading.get_untracked() {
            return;
        }
        let Some(data_url) = app.store.with_untracked(|s| s.state().uploaded_image().map(str::to_string)) else {
            return;
        };
        let name = file_name.get_untracked().unwrap_or_else(|| "image.jpg".to_string());
        let source = match ImageSource::from_data_url(&name, &data_url) {
            Ok(source) => source,
            Err(e) => {
                app.store.update(|s| s.set_error(Some(e.to_string())));
                return;
            }
        };

        let language = app.store.with_untracked(|s| s.state().language().to_string());
        let client = app.client();
        app.store.update(|s| s.begin_diagnosis());

        spawn_local(async move {
            let outcome = client.predict(PredictRequest::new(source).with_language(language)).await;
            if matches!(outcome, Err(ApiError::Busy { .. })) {
                return;
            }
            let succeeded = outcome.is_ok();
            app.store.update(|s| s.finish_diagnosis(outcome));
            if succeeded {
                app.navigate(Page::Result);
            }
        });
    };

    view! {
        <section class="upload-page">
            <h2>{move || app.t("upload.title")}</h2>
            <p class="text-muted">{move || app.t("upload.subtitle")}</p>

            {move || match preview() {
                None => view! {
                    <UploadArea on_image=on_image on_invalid=on_invalid disabled=is_loading />
                }
                .into_any(),
                Some(src) => view! {
                    <div class="card preview">
                        <p class="text-muted">{app.t("upload.preview")}</p>
                        <img class="preview-image" src=src alt="" />
                        <p class="file-name">{move || file_name.get().unwrap_or_default()}</p>
                        <div class="preview-actions">
                            <button class="btn btn-tertiary" disabled=move || is_loading.get() on:click=on_remove>
                                {app.t("upload.remove")}
                            </button>
                            <button class="btn btn-primary" disabled=move || is_loading.get() on:click=analyze>
                                {move || if is_loading.get() {
                                    app.t("upload.analyzing")
                                } else {
                                    app.t("upload.analyze")
                                }}
                            </button>
                        </div>
                    </div>
                }
                .into_any(),
            }}

            <Show when=move || is_loading.get()>
                <Loader key="upload.analyzing" />
            </Show>

            {move || error().map(|message| view! { <ErrorMessage message=message /> })}
        </section>
    }
}
