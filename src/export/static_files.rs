//! Fixed descriptor files of a PBIP project

use serde_json::{Value, json};

const SCHEMA_ROOT: &str = "https://developer.microsoft.com/json-schemas/fabric";

pub const BASE_THEME: &str = "CY24SU10";
pub const GITIGNORE: &str = "**/.pbi/localSettings.json\n**/.pbi/cache.abf\n";

fn schema(path: &str) -> String {
    format!("{}/{}", SCHEMA_ROOT, path)
}

/// Folder names of the two PBIP items of a project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    pub project: String,
}

impl ProjectLayout {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
        }
    }

    pub fn pbip_file(&self) -> String {
        format!("{}.pbip", self.project)
    }

    pub fn report_dir(&self) -> String {
        format!("{}.Report", self.project)
    }

    pub fn model_dir(&self) -> String {
        format!("{}.SemanticModel", self.project)
    }

    pub fn page_dir(&self, page: &str) -> String {
        format!("{}/definition/pages/{}", self.report_dir(), page)
    }

    pub fn visual_file(&self, page: &str, visual: &str) -> String {
        format!("{}/visuals/{}/visual.json", self.page_dir(page), visual)
    }

    pub fn table_file(&self, table: &str) -> String {
        format!("{}/definition/tables/{}.tmdl", self.model_dir(), table)
    }

    pub fn theme_file(&self) -> String {
        format!(
            "{}/StaticResources/SharedResources/BaseThemes/{}.json",
            self.report_dir(),
            BASE_THEME
        )
    }
}

pub fn pbip(layout: &ProjectLayout) -> Value {
    json!({
        "$schema": schema("pbip/pbipProperties/1.0.0/schema.json"),
        "version": "1.0",
        "artifacts": [{ "report": { "path": layout.report_dir() } }],
        "settings": { "enableAutoRecovery": true }
    })
}

/// `definition.pbir`, binding the report to the semantic model by path
pub fn definition_pbir(layout: &ProjectLayout) -> Value {
    json!({
        "$schema": schema("item/report/definitionProperties/1.0.0/schema.json"),
        "version": "4.0",
        "datasetReference": { "byPath": { "path": format!("../{}", layout.model_dir()) } }
    })
}

pub fn definition_pbism() -> Value {
    json!({
        "$schema": schema("item/semanticModel/definitionProperties/1.0.0/schema.json"),
        "version": "4.2",
        "settings": {}
    })
}

/// `.platform` of a report or semantic model item
pub fn platform(item_type: &str, display_name: &str, logical_id: &str) -> Value {
    json!({
        "$schema": schema("gitIntegration/platformProperties/2.0.0/schema.json"),
        "metadata": { "type": item_type, "displayName": display_name },
        "config": { "version": "2.0", "logicalId": logical_id }
    })
}

pub fn version_json() -> Value {
    json!({
        "$schema": schema("item/report/definition/versionMetadata/1.0.0/schema.json"),
        "version": "2.0.0"
    })
}

pub fn report_json() -> Value {
    json!({
        "$schema": schema("item/report/definition/report/1.2.0/schema.json"),
        "themeCollection": {
            "baseTheme": {
                "name": BASE_THEME,
                "reportVersionAtImport": "5.59",
                "type": "SharedResources"
            }
        },
        "layoutOptimization": "None",
        "resourcePackages": [{
            "name": "SharedResources",
            "type": "SharedResources",
            "items": [{
                "name": BASE_THEME,
                "path": format!("BaseThemes/{}.json", BASE_THEME),
                "type": "BaseTheme"
            }]
        }],
        "settings": {
            "useStylableVisualContainerHeader": true,
            "defaultDrillFilterOtherVisuals": true,
            "allowChangeFilterTypes": true,
            "useEnhancedTooltips": true
        }
    })
}

pub fn pages_json(page: &str) -> Value {
    json!({
        "$schema": schema("item/report/definition/pagesMetadata/1.0.0/schema.json"),
        "pageOrder": [page],
        "activePageName": page
    })
}

pub fn page_json(page: &str, display_name: &str, width: f64, height: f64) -> Value {
    json!({
        "$schema": schema("item/report/definition/page/1.3.0/schema.json"),
        "name": page,
        "displayName": display_name,
        "displayOption": "FitToPage",
        "height": height,
        "width": width
    })
}

pub fn theme_json() -> Value {
    json!({
        "name": BASE_THEME,
        "dataColors": [
            "#118DFF", "#12239E", "#E66C37", "#6B007B",
            "#E044A7", "#744EC2", "#D9B300", "#D64550"
        ],
        "foreground": "#252423",
        "background": "#FFFFFF",
        "tableAccent": "#118DFF",
        "good": "#1AAB40",
        "neutral": "#D9B300",
        "bad": "#D64554",
        "textClasses": {
            "title": { "fontFace": "Segoe UI Semibold", "fontSize": 12 },
            "label": { "fontFace": "Segoe UI", "fontSize": 10 }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_paths() {
        let layout = ProjectLayout::new("Phantom");
        assert_eq!(layout.pbip_file(), "Phantom.pbip");
        assert_eq!(
            layout.visual_file("p1", "v1"),
            "Phantom.Report/definition/pages/p1/visuals/v1/visual.json"
        );
        assert_eq!(
            layout.table_file("Sales"),
            "Phantom.SemanticModel/definition/tables/Sales.tmdl"
        );
        assert_eq!(
            definition_pbir(&layout)["datasetReference"]["byPath"]["path"],
            "../Phantom.SemanticModel"
        );
    }

    #[test]
    fn test_platform() {
        let value = platform("Report", "Phantom", "id-1");
        assert_eq!(value["metadata"]["type"], "Report");
        assert_eq!(value["config"]["logicalId"], "id-1");
    }
}
