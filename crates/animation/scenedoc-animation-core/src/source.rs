//! `<source>` elements: typed arrays plus an accessor describing their stride.

use scenedoc_api_core::convert::{floats_to_text, names_to_text, parse_floats, parse_names};
use scenedoc_api_core::Node;

/// Contents of one source element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceData {
    pub floats: Vec<f32>,
    pub names: Vec<String>,
    /// Accessor stride; at least 1.
    pub stride: usize,
    /// Accessor param names, one per stride slot (empty when unnamed).
    pub params: Vec<String>,
}

impl SourceData {
    /// Number of samples (`len / stride`), whichever array is populated.
    pub fn count(&self) -> usize {
        let len = self.floats.len().max(self.names.len());
        len / self.stride.max(1)
    }
}

/// Read the source `url` (`#id` or `id`) found under `scope`.
pub fn read_source(scope: &Node, url: &str) -> Option<SourceData> {
    let node = scope.find_by_id(url).filter(|n| n.tag == "source")?;
    let floats = node
        .child("float_array")
        .map(|a| parse_floats(a.text()))
        .unwrap_or_default();
    let names = node
        .child("Name_array")
        .or_else(|| node.child("IDREF_array"))
        .map(|a| parse_names(a.text()))
        .unwrap_or_default();
    let accessor = node.descend("technique_common/accessor");
    let stride = accessor
        .and_then(|a| a.attribute("stride"))
        .and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);
    let params = accessor
        .map(|a| {
            a.children_named("param")
                .map(|p| p.attribute("name").unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default();
    Some(SourceData {
        floats,
        names,
        stride,
        params,
    })
}

fn add_accessor<'a>(source: &'a mut Node, array_id: &str, count: usize, stride: usize) -> &'a mut Node {
    let accessor = source.add_child("technique_common").add_child("accessor");
    accessor
        .set_attribute("source", format!("#{array_id}"))
        .set_attribute("count", count)
        .set_attribute("stride", stride);
    accessor
}

/// Append a float source. `params` names the stride slots; empty names
/// produce unnamed params.
pub fn write_float_source(parent: &mut Node, id: &str, values: &[f32], params: &[&str]) {
    let stride = params.len().max(1);
    let array_id = format!("{id}-array");
    let source = parent.add_child("source");
    source.set_attribute("id", id);
    source
        .add_child_with_text("float_array", floats_to_text(values))
        .set_attribute("id", &array_id)
        .set_attribute("count", values.len());
    let accessor = add_accessor(source, &array_id, values.len() / stride, stride);
    for name in params {
        let param = accessor.add_child("param");
        if !name.is_empty() {
            param.set_attribute("name", *name);
        }
        param.set_attribute("type", "float");
    }
}

/// Append a `Name_array` source with a single param.
pub fn write_name_source(parent: &mut Node, id: &str, names: &[&str], param: &str) {
    let array_id = format!("{id}-array");
    let source = parent.add_child("source");
    source.set_attribute("id", id);
    source
        .add_child_with_text("Name_array", names_to_text(names))
        .set_attribute("id", &array_id)
        .set_attribute("count", names.len());
    add_accessor(source, &array_id, names.len(), 1)
        .add_child("param")
        .set_attribute("name", param)
        .set_attribute("type", "name");
}
