//! Reconciles path parameters found in the path string with `@param` declarations.

use crate::extractor::{Parameter, ParameterLocation};
use crate::path_normalizer::ExtractedParam;
use std::collections::HashSet;

/// Merges extracted path parameters with declared parameters.
///
/// The result lists, in order:
/// 1. path parameters in the order they occur in the path, each enriched with the
///    description of a declared path parameter of the same name (or `"<name> parameter"`);
/// 2. declared path parameters that never occur in the path;
/// 3. declared non-path parameters in declaration order.
///
/// Each `(name, in)` pair appears at most once; the first occurrence wins. The extracted
/// type wins unless the path syntax carried no type token, in which case a declared type
/// refines it.
pub fn merge_parameters(extracted: &[ExtractedParam], declared: &[Parameter]) -> Vec<Parameter> {
    let mut seen: HashSet<(String, ParameterLocation)> = HashSet::new();
    let mut merged = Vec::with_capacity(extracted.len() + declared.len());

    for param in extracted {
        let name = &param.parameter.name;
        if !seen.insert((name.clone(), ParameterLocation::Path)) {
            continue;
        }

        let declared_match = declared
            .iter()
            .find(|d| d.location == ParameterLocation::Path && &d.name == name);
        merged.push(merge_one(param, declared_match));
    }

    let (declared_path, declared_other): (Vec<&Parameter>, Vec<&Parameter>) = declared
        .iter()
        .partition(|d| d.location == ParameterLocation::Path);

    for param in declared_path.into_iter().chain(declared_other) {
        if seen.insert((param.name.clone(), param.location)) {
            merged.push(param.clone());
        }
    }

    merged
}

fn merge_one(extracted: &ExtractedParam, declared: Option<&Parameter>) -> Parameter {
    let base = &extracted.parameter;

    let param_type = match declared {
        Some(d) if !extracted.typed && !d.param_type.is_empty() => d.param_type.clone(),
        _ => base.param_type.clone(),
    };
    let description = declared
        .map(|d| d.description.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} parameter", base.name));

    Parameter {
        name: base.name.clone(),
        location: ParameterLocation::Path,
        param_type,
        required: true,
        description,
        format: base.format.clone(),
    }
}
