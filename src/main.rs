use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use reflow_core::{ComponentId, Dimension, LayoutBox, SceneNode};
use reflow_layout::LayoutTree;

#[derive(Parser)]
#[command(name = "reflow")]
#[command(about = "Lay out a JSON component scene and print the resulting boxes")]
struct Args {
    /// Path to the scene file
    scene_file: String,

    /// Width given to the root container
    #[arg(long, default_value_t = 800)]
    width: i32,

    /// Height given to the root container
    #[arg(long, default_value_t = 600)]
    height: i32,

    /// Output format (tree, json, detailed)
    #[arg(long, default_value = "tree")]
    format: String,

    /// Save output to file instead of stdout
    #[arg(long)]
    output: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

type Boxes = HashMap<ComponentId, LayoutBox>;

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays parseable
    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow::anyhow!(err))
        .context("Failed to set tracing subscriber")?;

    if !Path::new(&args.scene_file).exists() {
        anyhow::bail!("Scene file not found: {}", args.scene_file);
    }

    info!("Loading scene: {}", args.scene_file);
    let scene = reflow_core::load_scene(&args.scene_file).context("Failed to load scene")?;

    let mut tree = LayoutTree::from_scene(&scene).context("Failed to build layout tree")?;
    let bounds = Dimension::new(args.width.max(0), args.height.max(0));
    let preferred = tree.preferred_size();
    let boxes = tree.compute(bounds);
    info!("Laid out {} of {} components in {}", boxes.len(), tree.len(), bounds);

    let output_text = match args.format.as_str() {
        "tree" => generate_tree_output(&scene, &boxes),
        "json" => generate_json_output(&scene, &boxes, bounds)?,
        "detailed" => generate_detailed_output(&scene, &tree, &boxes, bounds, preferred),
        other => anyhow::bail!("Unknown format: {}. Use 'tree', 'json', or 'detailed'", other),
    };

    if let Some(output_file) = args.output {
        fs::write(&output_file, output_text)
            .with_context(|| format!("Failed to write to file: {}", output_file))?;
        info!("Output written to: {}", output_file);
    } else {
        print!("{}", output_text);
    }

    Ok(())
}

fn describe_box(placed: Option<&LayoutBox>) -> String {
    match placed {
        Some(b) => format!("pos:({},{}) size:({},{})", b.left, b.top, b.width, b.height),
        None => "unplaced".to_string(),
    }
}

fn generate_tree_output(scene: &SceneNode, boxes: &Boxes) -> String {
    let mut output = String::new();
    render_node_tree(&mut output, scene, boxes, 0, true);
    output
}

fn render_node_tree(output: &mut String, node: &SceneNode, boxes: &Boxes, depth: usize, is_last: bool) {
    let tree_char = if depth == 0 {
        ""
    } else if is_last {
        "└── "
    } else {
        "├── "
    };
    let indent = if depth == 0 {
        String::new()
    } else {
        "│   ".repeat(depth - 1) + tree_char
    };

    output.push_str(&format!("{}{} {}", indent, node.id, describe_box(boxes.get(&node.id))));
    if let Some(layout) = &node.layout {
        let keyword = layout.split(',').next().unwrap_or_default();
        output.push_str(&format!(" [{}]", keyword));
    }
    if !node.visible {
        output.push_str(" (hidden)");
    }
    output.push('\n');

    let child_count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        render_node_tree(output, child, boxes, depth + 1, i + 1 == child_count);
    }
}

fn collect_json(node: &SceneNode, boxes: &Boxes, out: &mut Vec<serde_json::Value>) {
    let placed = boxes.get(&node.id);
    out.push(serde_json::json!({
        "id": node.id,
        "placed": placed.is_some(),
        "left": placed.map(|b| b.left),
        "top": placed.map(|b| b.top),
        "width": placed.map(|b| b.width),
        "height": placed.map(|b| b.height),
    }));
    for child in &node.children {
        collect_json(child, boxes, out);
    }
}

fn generate_json_output(scene: &SceneNode, boxes: &Boxes, bounds: Dimension) -> Result<String> {
    let mut components = Vec::with_capacity(scene.node_count());
    collect_json(scene, boxes, &mut components);

    let document = serde_json::json!({
        "bounds": bounds,
        "componentCount": components.len(),
        "components": components,
    });
    let mut text = serde_json::to_string_pretty(&document).context("Failed to encode layout as JSON")?;
    text.push('\n');
    Ok(text)
}

fn generate_detailed_output(
    scene: &SceneNode,
    tree: &LayoutTree,
    boxes: &Boxes,
    bounds: Dimension,
    preferred: Dimension,
) -> String {
    let mut output = String::new();

    output.push_str("=== REFLOW LAYOUT ANALYSIS ===\n\n");

    output.push_str("SCENE:\n");
    output.push_str(&format!("  Components: {}\n", scene.node_count()));
    output.push_str(&format!("  Placed: {}\n", boxes.len()));
    output.push_str(&format!("  Bounds: {}\n", bounds));
    output.push_str(&format!("  Preferred: {}\n", preferred));
    output.push('\n');

    output.push_str("CONTAINERS:\n");
    render_containers(&mut output, scene, tree);
    output.push('\n');

    output.push_str("COMPONENT TREE:\n");
    render_node_tree(&mut output, scene, boxes, 0, true);

    output.push_str("\n=== END ANALYSIS ===\n");
    output
}

fn render_containers(output: &mut String, node: &SceneNode, tree: &LayoutTree) {
    if let Some(container) = tree.container(&node.id) {
        let kind = container
            .kind()
            .map(|k| k.keyword())
            .unwrap_or("unreadable layout");
        output.push_str(&format!("  {}: {} ({} children)\n", node.id, kind, node.children.len()));
        if let Some(descriptor) = container.descriptor() {
            output.push_str(&format!(
                "    margins: {:?} gaps: {:?}\n",
                descriptor.margins, descriptor.gaps
            ));
            if !descriptor.anchor_data.is_empty() {
                output.push_str(&format!("    anchors: {}\n", descriptor.anchor_data.join("; ")));
            }
        }
    }
    for child in &node.children {
        render_containers(output, child, tree);
    }
}
