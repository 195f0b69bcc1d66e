//! Model template discovery

use axum::Json;
use kiln_types::TemplateKind;
use serde::Serialize;

/// Template metadata view
#[derive(Debug, Serialize)]
pub struct TemplateView {
    pub kind: TemplateKind,
    pub name: &'static str,
    pub description: &'static str,
    pub series: &'static str,
}

/// List discoverable model template kinds. Hidden kinds are omitted but
/// remain addressable when named explicitly at instance creation.
pub async fn list_templates() -> Json<Vec<TemplateView>> {
    let views = TemplateKind::discoverable()
        .into_iter()
        .map(|kind| TemplateView {
            kind,
            name: kind.name(),
            description: kind.description(),
            series: kind.series(),
        })
        .collect();
    Json(views)
}
