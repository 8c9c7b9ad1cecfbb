pub const APP_NAME: &str = "Freight Desk";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_TAG: Option<&str> = option_env!("GIT_TAG");
/// Short hash of the commit the binary was built from.
pub const GIT_COMMIT: Option<&str> = option_env!("FREIGHT_DESK_COMMIT");

pub fn version_label() -> String {
    if let Some(tag) = GIT_TAG {
        tag.to_string()
    } else {
        format!("v{}", APP_VERSION)
    }
}

/// Version plus build commit, for the settings page and startup log.
pub fn build_label() -> String {
    describe_build(&version_label(), GIT_COMMIT)
}

fn describe_build(version: &str, commit: Option<&str>) -> String {
    match commit {
        Some(commit) => format!("{version} ({commit})"),
        None => version.to_string(),
    }
}

/// User agent sent with every backend request.
pub fn user_agent() -> String {
    format!("freight-desk/{}", version_label().trim_start_matches('v'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_names_the_app_and_version() {
        let agent = user_agent();
        assert!(agent.starts_with("freight-desk/"));
        assert!(!agent.contains("/v"));
    }

    #[test]
    fn build_label_appends_commit_when_known() {
        assert_eq!(describe_build("v0.3.0", Some("1a2b3c4")), "v0.3.0 (1a2b3c4)");
        assert_eq!(describe_build("v0.3.0", None), "v0.3.0");
        assert!(build_label().starts_with(&version_label()));
    }
}
