use dioxus::prelude::*;

use crate::app::Route;
use crate::domain::{AppState, UserRole};
use crate::util::version::{version_label, APP_NAME};

#[component]
pub fn Shell(children: Element) -> Element {
    let state = use_context::<Signal<AppState>>();
    let user = state.with(|s| s.current_user.clone());

    let current_route = use_route::<Route>();
    let nav = use_navigator();

    let subtitle = match &user {
        Some(user) if user.organization_name.is_empty() => {
            format!("{} · {}", user.user_name, user.role.label())
        }
        Some(user) => format!(
            "{} · {} · {}",
            user.user_name,
            user.organization_name,
            user.role.label()
        ),
        None => "Not signed in".to_string(),
    };
    let role = user.as_ref().map(|user| user.role);

    rsx! {
        div {
            header {
                class: "shell-header",
                div {
                    h1 { class: "shell-title", "{APP_NAME}" }
                    p { class: "shell-subtitle", "{subtitle}" }
                }
                nav {
                    class: "nav",
                    match role {
                        Some(UserRole::Shipper) => rsx! {
                            NavButton { active: matches!(current_route, Route::Auctions {}), onclick: move |_| { nav.push(Route::Auctions {}); }, label: "Auctions" }
                        },
                        Some(UserRole::Transporter) => rsx! {
                            NavButton { active: matches!(current_route, Route::ActiveBids {}), onclick: move |_| { nav.push(Route::ActiveBids {}); }, label: "Active Bids" }
                            NavButton { active: matches!(current_route, Route::MyQuotes {}), onclick: move |_| { nav.push(Route::MyQuotes {}); }, label: "My Quotes" }
                        },
                        None => rsx! {},
                    }
                    NavButton { active: matches!(current_route, Route::Settings {}), onclick: move |_| { nav.push(Route::Settings {}); }, label: "Settings" }
                }
            }
            main { class: "shell-main",
                if user.is_none() && !matches!(current_route, Route::Settings {}) {
                    div {
                        class: "empty-state",
                        p { "Set up your user and organization in Settings to load auctions and quotes." }
                        button {
                            class: "btn btn-primary",
                            onclick: move |_| { nav.push(Route::Settings {}); },
                            "Open Settings"
                        }
                    }
                } else {
                    {children}
                }
            }
            footer { class: "shell-footer", "{APP_NAME} {version_label()}" }
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: &'static str) -> Element {
    let class = if active { "nav-button active" } else { "nav-button" };

    rsx! {
        button {
            class: "{class}",
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
