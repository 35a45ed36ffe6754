//! Request/response JSON loading for the CLI.

use anyhow::{Context, Result};
use site_model::GenerationRequest;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn load_request(path: &Path) -> Result<GenerationRequest> {
    let file = File::open(path).with_context(|| format!("opening request file {path:?}"))?;
    let reader = BufReader::new(file);
    let request: GenerationRequest =
        serde_json::from_reader(reader).with_context(|| format!("parsing request JSON {path:?}"))?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_a_minimal_request() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "country": {{
                    "country_code": "XX",
                    "boundary": {{ "ring": [] }},
                    "regions": [],
                    "major_metropolitan_areas": [],
                    "max_region_share": 0.4
                }},
                "existing_stores": [],
                "competitors": [],
                "population_cells": [],
                "anchors": [],
                "config": {{
                    "target_k": 5,
                    "min_spacing_m": 500.0,
                    "grid_resolution": 8,
                    "weights": {{ "population": 0.25, "gap": 0.35, "anchor": 0.20, "performance": 0.20, "saturation": 0.15 }},
                    "enable_ai": false,
                    "mode": null
                }}
            }}"#
        )
        .unwrap();
        let request = load_request(file.path()).unwrap();
        assert_eq!(request.config.target_k, 5);
    }
}
