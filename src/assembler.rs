//! Turns raw route sites into canonical [`RouteRecord`]s.
//!
//! Each site's documentation block is parsed once, its path normalized once, and the
//! resulting description/metadata shared by one record per declared method.

use crate::doc_tags::parse_doc_block;
use crate::extractor::{ExtractorConfig, Framework, MetadataValue, RouteRecord, RouteSite};
use crate::param_merger::merge_parameters;
use crate::path_normalizer::normalize;
use log::{debug, warn};

pub struct RouteAssembler {
    framework: Framework,
    config: ExtractorConfig,
}

impl RouteAssembler {
    pub fn new(framework: Framework, config: ExtractorConfig) -> Self {
        Self { framework, config }
    }

    /// Assembles the records for all sites, preserving site order.
    pub fn assemble(&self, sites: &[RouteSite]) -> Vec<RouteRecord> {
        sites
            .iter()
            .flat_map(|site| self.assemble_site(site))
            .collect()
    }

    /// Produces one record per method of `site`, identical except for `method`.
    pub fn assemble_site(&self, site: &RouteSite) -> Vec<RouteRecord> {
        if site.methods.is_empty() {
            warn!(
                "Route {} ({}, line {}) declares no usable HTTP methods",
                site.path, site.handler, site.line
            );
            return Vec::new();
        }

        let doc = parse_doc_block(site.doc.as_deref());
        let mut metadata = doc.metadata;
        let normalized = normalize(&site.path, self.framework, &self.config);

        let declared = match metadata.remove("param") {
            Some(MetadataValue::Params(params)) => params,
            Some(other) => {
                metadata.insert("param".to_string(), other);
                Vec::new()
            }
            None => Vec::new(),
        };
        let params = merge_parameters(&normalized.params, &declared);
        if !params.is_empty() {
            metadata.insert("param".to_string(), MetadataValue::Params(params));
        }

        debug!(
            "Assembling {} {:?} from handler {}",
            normalized.path, site.methods, site.handler
        );

        site.methods
            .iter()
            .map(|method| RouteRecord {
                method: *method,
                path: normalized.path.clone(),
                description: doc.description.clone(),
                middlewares: site.middlewares.clone(),
                metadata: metadata.clone(),
            })
            .collect()
    }
}
