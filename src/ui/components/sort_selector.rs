use dioxus::prelude::*;

use crate::domain::QuoteSort;

#[component]
pub fn SortSelector(current: QuoteSort, on_change: EventHandler<QuoteSort>) -> Element {
    rsx! {
        div {
            class: "sort-selector",
            role: "radiogroup",
            for sort in QuoteSort::ALL {
                button {
                    key: "{sort.label()}",
                    class: if sort == current { "sort-option active" } else { "sort-option" },
                    onclick: move |_| on_change.call(sort),
                    "{sort.label()}"
                }
            }
        }
    }
}
