use crate::config::web_host;
use svcinv_extract::{ArtifactCategory, CategoryInventory, InventoryReport};

/// Order sections appear in the text report.
const DISPLAY_ORDER: [ArtifactCategory; 4] = [
    ArtifactCategory::Dashboard,
    ArtifactCategory::Monitor,
    ArtifactCategory::Slo,
    ArtifactCategory::Notebook,
];

const SLO_NOTE: &str = "Note: SLOs based off of monitors will be reflected in the MONITORS \
                        section; only metric SLOs are represented here.";

fn noun(category: ArtifactCategory) -> &'static str {
    match category {
        ArtifactCategory::Dashboard => "Dashboard",
        ArtifactCategory::Monitor => "Monitor",
        ArtifactCategory::Notebook => "Notebook",
        ArtifactCategory::Slo => "SLO",
    }
}

/// Link to an artifact in the web UI.
pub fn artifact_url(site: &str, category: ArtifactCategory, id: &str) -> String {
    let host = web_host(site);
    match category {
        ArtifactCategory::Dashboard => format!("https://{host}/dashboard/{id}"),
        ArtifactCategory::Monitor => format!("https://{host}/monitors/{id}"),
        ArtifactCategory::Notebook => format!("https://{host}/notebook/{id}"),
        ArtifactCategory::Slo => format!("https://{host}/slo/manage?slo_id={id}"),
    }
}

pub fn render_text(report: &InventoryReport, site: &str) -> String {
    let mut out = String::new();
    for category in DISPLAY_ORDER {
        if let Some(section) = report.category(category) {
            render_section(&mut out, section, site);
        }
    }
    out.trim_end().to_string()
}

fn render_section(out: &mut String, section: &CategoryInventory, site: &str) {
    let banner = format!("********** {} **********", section.category.label());
    out.push_str(&banner);
    out.push('\n');
    if section.category == ArtifactCategory::Slo {
        out.push_str(SLO_NOTE);
        out.push('\n');
    }
    for (id, services) in &section.services {
        let names: Vec<&str> = services.iter().map(String::as_str).collect();
        out.push_str(&format!(
            "{}: {}\n",
            noun(section.category),
            artifact_url(site, section.category, id)
        ));
        out.push_str(&format!("\tContains services: {}\n", names.join(", ")));
    }
    out.push_str(&"*".repeat(banner.len()));
    out.push_str("\n\n");
}
