//! アップロードエリアコンポーネント

use crate::app::use_app;
use farmaid_common::image::is_image_mime;
use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{DragEvent, File, FileList, FileReader, HtmlInputElement};

/// 画像1枚を選択させる。画像以外は `on_invalid` に回す。
///
/// `on_image` には (ファイル名, Data URL) が渡る。
#[component]
pub fn UploadArea<F, I>(
    on_image: F,
    on_invalid: I,
    #[prop(into)] disabled: Signal<bool>,
) -> impl IntoView
where
    F: Fn(String, String) + 'static + Clone,
    I: Fn() + 'static + Clone,
{
    let app = use_app();
    let (is_dragover, set_is_dragover) = signal(false);

    let handle_files = move |files: FileList| {
        let Some(file) = files.get(0) else {
            return;
        };
        if is_image_mime(&file.type_()) {
            read_file(file, on_image.clone());
        } else {
            on_invalid();
        }
    };

    let on_drop = {
        let handle_files = handle_files.clone();
        move |ev: DragEvent| {
            ev.prevent_default();
            set_is_dragover.set(false);

            if disabled.get_untracked() {
                return;
            }

            if let Some(files) = ev.data_transfer().and_then(|dt| dt.files()) {
                handle_files(files);
            }
        }
    };

    let on_dragover = move |ev: DragEvent| {
        ev.prevent_default();
        if !disabled.get_untracked() {
            set_is_dragover.set(true);
        }
    };

    let on_dragleave = move |_: DragEvent| {
        set_is_dragover.set(false);
    };

    let on_click = move |_| {
        if disabled.get_untracked() {
            return;
        }
        open_file_dialog(handle_files.clone());
    };

    view! {
        <div
            class=move || {
                let mut classes = vec!["upload-area"];
                if is_dragover.get() {
                    classes.push("dragover");
                }
                if disabled.get() {
                    classes.push("disabled");
                }
                classes.join(" ")
            }
            on:drop=on_drop
            on:dragover=on_dragover
            on:dragleave=on_dragleave
            on:click=on_click
        >
            <div class="upload-icon">"📷"</div>
            <p>{move || app.t("upload.dragDrop")}</p>
            <p class="text-muted">{move || app.t("upload.formats")}</p>
        </div>
    }
}

fn open_file_dialog<H>(handle_files: H)
where
    H: Fn(FileList) + 'static,
{
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return;
    };
    let Some(input) = document
        .create_element("input")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    else {
        return;
    };
    input.set_type("file");
    input.set_accept("image/*");

    let target = input.clone();
    let closure = Closure::wrap(Box::new(move |_: web_sys::Event| {
        if let Some(files) = target.files() {
            handle_files(files);
        }
    }) as Box<dyn FnMut(_)>);

    input.set_onchange(Some(closure.as_ref().unchecked_ref()));
    closure.forget();
    input.click();
}

fn read_file<F>(file: File, on_image: F)
where
    F: Fn(String, String) + 'static,
{
    let Ok(reader) = FileReader::new() else {
        return;
    };
    let file_name = file.name();

    let reader_clone = reader.clone();
    let closure = Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
        if let Some(data_url) = reader_clone.result().ok().and_then(|r| r.as_string()) {
            on_image(file_name.clone(), data_url);
        }
    }) as Box<dyn FnMut(_)>);

    reader.set_onload(Some(closure.as_ref().unchecked_ref()));
    closure.forget();

    if let Err(e) = reader.read_as_data_url(&file) {
        gloo::console::error!("failed to read file:", e);
    }
}
