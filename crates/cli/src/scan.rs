use crate::source::ArtifactSource;
use anyhow::{Context as AnyhowContext, Result};
use svcinv_extract::{ArtifactCategory, Inventory, InventoryReport, ScanConfig};

/// Fetch and scan each requested category, then deduplicate it before moving
/// on. Categories run in [`ArtifactCategory::ALL`] order; a transport or decode
/// failure aborts the run, while bad individual documents are only skipped.
pub async fn run_scan(
    source: &dyn ArtifactSource,
    categories: &[ArtifactCategory],
    config: ScanConfig,
) -> Result<InventoryReport> {
    let mut inventory = Inventory::new(config);
    let mut report = InventoryReport::default();

    for category in ArtifactCategory::ALL
        .into_iter()
        .filter(|c| categories.contains(c))
    {
        collect(source, &mut inventory, category)
            .await
            .with_context(|| format!("Failed to fetch {}", category.label().to_lowercase()))?;

        let result = inventory.deduplicate(category);
        log::info!(
            "{}: {} artifacts scanned, {} with services, {} distinct services ({} nodes skipped, {} unsupported)",
            category.label().to_lowercase(),
            result.stats.artifacts,
            result.services.len(),
            result.distinct_services().len(),
            result.stats.skipped,
            result.stats.unsupported_total()
        );
        report.categories.push(result);
    }

    Ok(report)
}

async fn collect(
    source: &dyn ArtifactSource,
    inventory: &mut Inventory,
    category: ArtifactCategory,
) -> Result<()> {
    match category {
        ArtifactCategory::Dashboard => {
            let ids = source.list_dashboard_ids().await?;
            log::debug!("{} dashboards listed", ids.len());
            for id in ids {
                let dashboard = source.get_dashboard(&id).await?;
                inventory.ingest_dashboard(&id, &dashboard);
            }
        }
        ArtifactCategory::Monitor => {
            for monitor in source.list_monitors().await? {
                inventory.ingest_monitor(&monitor);
            }
        }
        ArtifactCategory::Notebook => {
            for notebook in source.list_notebooks().await? {
                inventory.ingest_notebook(&notebook);
            }
        }
        ArtifactCategory::Slo => {
            for slo in source.list_slos().await? {
                inventory.ingest_slo(&slo);
            }
        }
    }
    Ok(())
}
