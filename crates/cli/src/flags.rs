use clap::ValueEnum;
use svcinv_extract::ArtifactCategory;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum CategoryFlag {
    Dashboards,
    Monitors,
    Notebooks,
    Slos,
}

impl CategoryFlag {
    pub(crate) const fn as_domain(self) -> ArtifactCategory {
        match self {
            CategoryFlag::Dashboards => ArtifactCategory::Dashboard,
            CategoryFlag::Monitors => ArtifactCategory::Monitor,
            CategoryFlag::Notebooks => ArtifactCategory::Notebook,
            CategoryFlag::Slos => ArtifactCategory::Slo,
        }
    }
}

/// Categories selected on the command line; none selected means all.
pub(crate) fn selected_categories(flags: &[CategoryFlag]) -> Vec<ArtifactCategory> {
    if flags.is_empty() {
        return ArtifactCategory::ALL.to_vec();
    }
    flags.iter().map(|flag| flag.as_domain()).collect()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum KindTable {
    Widgets,
    Monitors,
    DataSources,
}
