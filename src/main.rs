//! `dmmap <map.json>`: print an outline of a saved map document.

use std::path::PathBuf;
use std::process::ExitCode;

use dmmap::MapConfig;
use dmmap::format::FormatRegistry;
use dmmap::model::MapNode;
use dmmap::tree::MapTree;

fn main() -> ExitCode {
    let config = MapConfig::load_from_default_path().unwrap_or_default();
    env_logger::Builder::from_default_env()
        .filter_level(config.preferences.log_level.to_level_filter())
        .init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: dmmap <{}>", config.preferences.default_filename);
        return ExitCode::FAILURE;
    };

    match FormatRegistry::new().import_path(&path) {
        Ok(tree) => {
            print!("{}", outline(&tree));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to load {}: {}", path.display(), e);
            ExitCode::FAILURE
        }
    }
}

/// Indented listing of every node, marker and component.
fn outline(tree: &MapTree) -> String {
    let mut out = String::new();
    out.push_str(&format!("Master map{}\n", describe_image(tree.root())));
    outline_node(tree, tree.root(), 1, &mut out);
    out.push_str(&format!(
        "{} marker(s) in {} map(s)\n",
        tree.marker_count(),
        tree.node_count()
    ));
    out
}

fn outline_node(tree: &MapTree, node: &MapNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (index, marker) in node.markers.iter().enumerate() {
        out.push_str(&format!(
            "{indent}[{index}] {} at ({:.1}, {:.1})",
            marker.name, marker.x, marker.y
        ));
        if !marker.description.is_empty() {
            out.push_str(&format!(": {}", marker.description));
        }
        out.push('\n');

        for component in &marker.components {
            out.push_str(&format!("{indent}    - {}", component.name));
            if !component.link.is_empty() {
                out.push_str(&format!(" <{}>", component.link));
            }
            out.push('\n');
        }

        if let Some(sub_map) = marker.sub_map.and_then(|id| tree.node(id)) {
            out.push_str(&format!("{indent}    Sub-map{}\n", describe_image(sub_map)));
            outline_node(tree, sub_map, depth + 2, out);
        }
    }
}

fn describe_image(node: &MapNode) -> String {
    match &node.background {
        Some(image) => match image.dimensions() {
            Ok((w, h)) => format!(" ({}, {}x{})", image.mime(), w, h),
            Err(_) => format!(" ({}, {} bytes)", image.mime(), image.len()),
        },
        None => " (no image)".to_string(),
    }
}
