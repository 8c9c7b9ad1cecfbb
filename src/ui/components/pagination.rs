use dioxus::prelude::*;

/// Previous/next controls over one-based pages.
#[component]
pub fn Pager(page: u32, page_count: u32, total: u64, on_change: EventHandler<u32>) -> Element {
    let page_count = page_count.max(1);
    let has_previous = page > 1;
    let has_next = page < page_count;

    rsx! {
        div {
            class: "pager",
            button {
                class: "btn btn-small",
                disabled: !has_previous,
                onclick: move |_| {
                    if has_previous {
                        on_change.call(page - 1);
                    }
                },
                "← Previous"
            }
            span { "Page {page} of {page_count} · {total} total" }
            button {
                class: "btn btn-small",
                disabled: !has_next,
                onclick: move |_| {
                    if has_next {
                        on_change.call(page + 1);
                    }
                },
                "Next →"
            }
        }
    }
}
