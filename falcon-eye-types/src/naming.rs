//! Deterministic workload names, derived solely from entity slugs. Every
//! function here must be pure: the same slug always yields the same name.

pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_dash = false;
    for ch in name.chars().flat_map(|c| c.to_lowercase()) {
        if ch.is_ascii_alphanumeric() {
            out.push(ch);
            last_was_dash = false;
        } else if !last_was_dash && !out.is_empty() {
            out.push('-');
            last_was_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        out.push_str("entity");
    }
    out
}

pub fn camera_deployment_name(slug: &str) -> String {
    format!("cam-{slug}")
}

pub fn camera_service_name(slug: &str) -> String {
    format!("svc-{slug}")
}

pub fn recorder_deployment_name(slug: &str) -> String {
    format!("rec-{slug}")
}

pub fn recorder_service_name(slug: &str) -> String {
    format!("svc-rec-{slug}")
}

pub fn agent_deployment_name(slug: &str) -> String {
    format!("agent-{slug}")
}

pub fn agent_service_name(slug: &str) -> String {
    format!("svc-agent-{slug}")
}

pub fn cron_job_name(slug: &str, cron_uuid: &str) -> String {
    format!("cron-{slug}-{cron_uuid}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Office  Cam #1"), "office-cam-1");
        assert_eq!(slugify("Front Door"), "front-door");
        assert_eq!(slugify(""), "entity");
    }

    #[test]
    fn names_are_deterministic() {
        assert_eq!(camera_deployment_name("office"), "cam-office");
        assert_eq!(camera_service_name("office"), "svc-office");
        assert_eq!(recorder_deployment_name("office"), "rec-office");
        assert_eq!(recorder_service_name("office"), "svc-rec-office");
        assert_eq!(agent_deployment_name("main"), "agent-main");
        assert_eq!(agent_service_name("main"), "svc-agent-main");
        assert_eq!(cron_job_name("main", "abcd"), "cron-main-abcd");
    }
}
