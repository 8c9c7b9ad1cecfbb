use dioxus::prelude::*;

use crate::{
    app::persist_session,
    domain::{AppState, CurrentUser, Resource, UserRole},
    ui::components::toast::{push_toast, ToastKind, ToastMessage},
    util::{config, persistence::config_dir, version::build_label},
};

const RESOURCES: [Resource; 3] = [
    Resource::ReceivedQuotes,
    Resource::ActiveAuctions,
    Resource::MyQuotes,
];

#[component]
pub fn SettingsPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();

    let initial = state.with(|st| st.current_user.clone()).unwrap_or_default();

    let mut user_id_input = use_signal(|| id_text(initial.user_id));
    let mut user_name_input = use_signal(|| initial.user_name.clone());
    let mut org_id_input = use_signal(|| id_text(initial.org_id));
    let mut org_name_input = use_signal(|| initial.organization_name.clone());
    let mut role_input = use_signal(|| initial.role.label().to_string());

    let app_config = config::current();
    let config_path = config_dir()
        .map(|dir| dir.display().to_string())
        .unwrap_or_else(|| "unavailable".to_string());
    let fetch_entries = state.with(|st| {
        RESOURCES
            .iter()
            .map(|resource| (resource.label(), st.fetches.age_label(*resource)))
            .collect::<Vec<_>>()
    });

    let on_save = {
        let mut state = state.clone();
        move |_| {
            let parsed = parse_user(
                user_id_input(),
                user_name_input(),
                org_id_input(),
                org_name_input(),
                role_input(),
            );

            match parsed {
                Ok(user) => {
                    tracing::info!(user_id = user.user_id, org_id = user.org_id, "current user updated");
                    state.with_mut(|st| st.current_user = Some(user));
                    persist_session(&state);
                    push_toast(toasts, ToastKind::Success, "Saved user settings.");
                }
                Err(message) => {
                    push_toast(toasts, ToastKind::Error, message);
                }
            }
        }
    };

    let on_sign_out = {
        let mut state = state.clone();
        move |_| {
            state.with_mut(|st| {
                st.current_user = None;
                st.received_quotes.clear();
                st.my_quotes.clear();
                st.active_auctions.clear();
            });
            persist_session(&state);
            user_id_input.set(String::new());
            user_name_input.set(String::new());
            org_id_input.set(String::new());
            org_name_input.set(String::new());
            push_toast(toasts, ToastKind::Info, "Signed out. Session cleared.");
        }
    };

    rsx! {
        div { class: "page",
            section { class: "panel",
                h2 { class: "panel-title", "Current User" }
                div { class: "form-grid",
                    div {
                        label { class: "field-label", "User ID" }
                        input {
                            class: "field-input",
                            value: user_id_input(),
                            oninput: move |evt| user_id_input.set(evt.value()),
                        }
                    }
                    div {
                        label { class: "field-label", "User name" }
                        input {
                            class: "field-input",
                            value: user_name_input(),
                            oninput: move |evt| user_name_input.set(evt.value()),
                        }
                    }
                    div {
                        label { class: "field-label", "Organization ID" }
                        input {
                            class: "field-input",
                            value: org_id_input(),
                            oninput: move |evt| org_id_input.set(evt.value()),
                        }
                    }
                    div {
                        label { class: "field-label", "Organization name" }
                        input {
                            class: "field-input",
                            value: org_name_input(),
                            oninput: move |evt| org_name_input.set(evt.value()),
                        }
                    }
                    div {
                        label { class: "field-label", "Role" }
                        select {
                            class: "field-input",
                            value: role_input(),
                            onchange: move |evt| role_input.set(evt.value()),
                            option { value: "Shipper", "Shipper" }
                            option { value: "Transporter", "Transporter" }
                        }
                    }
                }
                div { class: "modal-actions",
                    button { class: "btn btn-danger", onclick: on_sign_out, "Sign out" }
                    button { class: "btn btn-primary", onclick: on_save, "Save" }
                }
            }

            section { class: "panel",
                h2 { class: "panel-title", "Backend" }
                table { class: "data-table",
                    tbody {
                        tr { td { "API base URL" } td { "{app_config.api_base_url}" } }
                        tr { td { "Active bids refresh" } td { "every {app_config.poll_interval.as_secs()}s" } }
                        tr { td { "Page size" } td { "{app_config.page_size}" } }
                        tr { td { "Log level" } td { "{app_config.log_level}" } }
                        tr { td { "Config directory" } td { "{config_path}" } }
                    }
                }
                p { class: "auction-meta",
                    "Edit config.json in the config directory or set FREIGHT_DESK_API_URL, FREIGHT_DESK_POLL_SECS, FREIGHT_DESK_PAGE_SIZE and FREIGHT_DESK_LOG, then restart."
                }
            }

            section { class: "panel",
                h2 { class: "panel-title", "Last Fetches" }
                ul {
                    for (label, age) in fetch_entries {
                        li { class: "auction-card",
                            span { "{label}" }
                            span { class: "auction-meta", "{age}" }
                        }
                    }
                }
            }

            p { class: "shell-footer", "Version {build_label()}" }
        }
    }
}

fn id_text(id: i64) -> String {
    if id == 0 {
        String::new()
    } else {
        id.to_string()
    }
}

fn parse_user(
    user_id: String,
    user_name: String,
    org_id: String,
    organization_name: String,
    role: String,
) -> Result<CurrentUser, String> {
    let user_id: i64 = user_id
        .trim()
        .parse()
        .map_err(|_| "User ID must be a whole number")?;
    let org_id: i64 = org_id
        .trim()
        .parse()
        .map_err(|_| "Organization ID must be a whole number")?;
    if user_id <= 0 || org_id <= 0 {
        return Err("User and organization IDs must be positive".to_string());
    }
    let user_name = user_name.trim().to_string();
    if user_name.is_empty() {
        return Err("User name is required".to_string());
    }
    let role = match role.trim() {
        "Transporter" => UserRole::Transporter,
        _ => UserRole::Shipper,
    };

    Ok(CurrentUser {
        user_id,
        user_name,
        org_id,
        organization_name: organization_name.trim().to_string(),
        role,
    })
}
