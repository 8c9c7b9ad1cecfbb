use dioxus::prelude::*;

/// Modal confirmation; buttons are disabled while `busy`.
#[component]
pub fn ConfirmDialog(
    title: String,
    confirm_label: String,
    busy: bool,
    on_confirm: EventHandler<()>,
    on_cancel: EventHandler<()>,
    children: Element,
) -> Element {
    rsx! {
        div {
            class: "modal-backdrop",
            div {
                class: "modal",
                role: "dialog",
                h2 { class: "panel-title", "{title}" }
                {children}
                div {
                    class: "modal-actions",
                    button {
                        class: "btn",
                        disabled: busy,
                        onclick: move |_| on_cancel.call(()),
                        "Cancel"
                    }
                    button {
                        class: "btn btn-primary",
                        disabled: busy,
                        onclick: move |_| on_confirm.call(()),
                        if busy { "Submitting…" } else { "{confirm_label}" }
                    }
                }
            }
        }
    }
}
